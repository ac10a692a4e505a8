//! Field-level similarity functions
//!
//! Pure, deterministic helpers used by level tests. Text similarities return
//! a score in [0.0, 1.0] where 1.0 means identical.

use serde_json::Value;
use std::borrow::Cow;

/// Jaro-Winkler similarity between two strings
#[inline]
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

/// Levenshtein edit distance between two strings
#[inline]
pub fn levenshtein_edits(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Levenshtein similarity normalized to [0.0, 1.0]
#[inline]
pub fn normalized_levenshtein(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Absolute difference between two numbers
#[inline]
pub fn absolute_difference(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Relative difference: |a - b| / max(|a|, |b|)
///
/// Both values zero count as identical (difference 0).
pub fn relative_difference(a: f64, b: f64) -> f64 {
    let max = a.abs().max(b.abs());
    if max == 0.0 {
        0.0
    } else {
        (a - b).abs() / max
    }
}

/// Canonical text of a scalar value
///
/// Strings are borrowed; numbers and booleans are rendered. Arrays and
/// objects have no text form.
pub fn text_of(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// Numeric view of a scalar value
///
/// Numeric strings parse, so CSV-sourced columns can still use numeric
/// level tests.
pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jaro_winkler_close_names() {
        let sim = jaro_winkler("Jon Smith", "John Smith");
        assert!(sim > 0.9, "expected > 0.9, got {}", sim);
        assert!(jaro_winkler("Jon Smith", "Mary Jones") < 0.6);
    }

    #[test]
    fn test_levenshtein_edits() {
        assert_eq!(levenshtein_edits("Jon", "John"), 1);
        assert_eq!(levenshtein_edits("same", "same"), 0);
    }

    #[test]
    fn test_normalized_levenshtein_bounds() {
        assert!((normalized_levenshtein("abc", "abc") - 1.0).abs() < f64::EPSILON);
        let sim = normalized_levenshtein("abc", "xyz");
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn test_relative_difference() {
        assert_eq!(relative_difference(0.0, 0.0), 0.0);
        assert!((relative_difference(10.0, 11.0) - (1.0 / 11.0)).abs() < 1e-12);
    }

    #[test]
    fn test_text_of_scalars() {
        assert_eq!(text_of(&json!("abc")).unwrap(), "abc");
        assert_eq!(text_of(&json!(42)).unwrap(), "42");
        assert_eq!(text_of(&json!(true)).unwrap(), "true");
        assert!(text_of(&json!(["a"])).is_none());
    }

    #[test]
    fn test_number_of_parses_numeric_strings() {
        assert_eq!(number_of(&json!(1.5)), Some(1.5));
        assert_eq!(number_of(&json!(" 42 ")), Some(42.0));
        assert_eq!(number_of(&json!("n/a")), None);
    }
}
