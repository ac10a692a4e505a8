//! Comparison vectors
//!
//! Discretizes a candidate pair into per-comparison level assignments.
//! Level assignment is pure: the same pair and the same specs always
//! produce the same vector.

use crate::settings::{ComparisonSpec, LevelTest};
use crate::similarity::{
    absolute_difference, jaro_winkler, levenshtein_edits, number_of, relative_difference, text_of,
};
use reclink_core::Record;
use serde_json::Value;
use smallvec::SmallVec;

/// Level marker for a comparison where either side is missing
pub const MISSING: u8 = u8::MAX;

/// Per-comparison level assignments for one candidate pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonVector {
    levels: SmallVec<[u8; 8]>,
}

impl ComparisonVector {
    /// Assigned level of comparison `i` ([`MISSING`] when a value was absent)
    #[inline]
    pub fn level(&self, i: usize) -> u8 {
        self.levels[i]
    }

    #[inline]
    pub fn is_missing(&self, i: usize) -> bool {
        self.levels[i] == MISSING
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.levels.iter().copied()
    }
}

/// Compare two records across all comparison specs
pub fn compare_pair(specs: &[ComparisonSpec], left: &Record, right: &Record) -> ComparisonVector {
    let levels = specs
        .iter()
        .map(|spec| match (left.get(&spec.field), right.get(&spec.field)) {
            (Some(a), Some(b)) => assign_level(spec, a, b),
            _ => MISSING,
        })
        .collect();
    ComparisonVector { levels }
}

/// First level whose test passes; the trailing catch-all guarantees a hit
fn assign_level(spec: &ComparisonSpec, a: &Value, b: &Value) -> u8 {
    for (i, level) in spec.levels.iter().enumerate() {
        if level_matches(&level.test, a, b) {
            return i as u8;
        }
    }
    spec.else_index() as u8
}

fn level_matches(test: &LevelTest, a: &Value, b: &Value) -> bool {
    match test {
        LevelTest::Exact => match (a, b) {
            (Value::Number(_), Value::Number(_)) => match (number_of(a), number_of(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
            _ => match (text_of(a), text_of(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        },
        LevelTest::JaroWinkler { at_least } => match (text_of(a), text_of(b)) {
            (Some(x), Some(y)) => jaro_winkler(&x, &y) >= *at_least,
            _ => false,
        },
        LevelTest::Levenshtein { max_edits } => match (text_of(a), text_of(b)) {
            (Some(x), Some(y)) => levenshtein_edits(&x, &y) <= *max_edits,
            _ => false,
        },
        LevelTest::AbsoluteDifference { tolerance } => match (number_of(a), number_of(b)) {
            (Some(x), Some(y)) => absolute_difference(x, y) <= *tolerance,
            _ => false,
        },
        LevelTest::RelativeDifference { tolerance } => match (number_of(a), number_of(b)) {
            (Some(x), Some(y)) => relative_difference(x, y) <= *tolerance,
            _ => false,
        },
        LevelTest::Else => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ComparisonLevel;
    use reclink_core::RecordId;
    use serde_json::json;

    fn name_spec() -> ComparisonSpec {
        ComparisonSpec::new(
            "name",
            vec![
                ComparisonLevel::new("exact", LevelTest::Exact, 0.7, 0.001),
                ComparisonLevel::new("close", LevelTest::JaroWinkler { at_least: 0.9 }, 0.2, 0.005),
                ComparisonLevel::new("other", LevelTest::Else, 0.1, 0.994),
            ],
        )
    }

    fn record(id: u64, fields: Value) -> Record {
        Record::new(RecordId::Integer(id), fields)
    }

    #[test]
    fn test_first_matching_level_wins() {
        let specs = vec![name_spec()];
        let a = record(0, json!({"name": "Jon Smith"}));

        let exact = compare_pair(&specs, &a, &record(1, json!({"name": "Jon Smith"})));
        assert_eq!(exact.level(0), 0);

        let close = compare_pair(&specs, &a, &record(1, json!({"name": "John Smith"})));
        assert_eq!(close.level(0), 1);

        let other = compare_pair(&specs, &a, &record(1, json!({"name": "Mary Jones"})));
        assert_eq!(other.level(0), 2);
    }

    #[test]
    fn test_missing_value_marks_missing() {
        let specs = vec![name_spec()];
        let a = record(0, json!({"name": "Jon Smith"}));
        let b = record(1, json!({"name": null}));

        let vector = compare_pair(&specs, &a, &b);
        assert!(vector.is_missing(0));
        assert_eq!(vector.level(0), MISSING);
    }

    #[test]
    fn test_comparison_is_deterministic() {
        let specs = vec![name_spec()];
        let a = record(0, json!({"name": "Jon Smith"}));
        let b = record(1, json!({"name": "John Smith"}));

        let first = compare_pair(&specs, &a, &b);
        let second = compare_pair(&specs, &a, &b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_numeric_exact_ignores_representation() {
        let spec = ComparisonSpec::new(
            "age",
            vec![
                ComparisonLevel::new("exact", LevelTest::Exact, 0.9, 0.01),
                ComparisonLevel::new("other", LevelTest::Else, 0.1, 0.99),
            ],
        );
        let a = record(0, json!({"age": 42}));
        let b = record(1, json!({"age": 42.0}));

        let vector = compare_pair(&[spec], &a, &b);
        assert_eq!(vector.level(0), 0);
    }

    #[test]
    fn test_numeric_tolerance_levels() {
        let spec = ComparisonSpec::new(
            "height",
            vec![
                ComparisonLevel::new(
                    "within_2",
                    LevelTest::AbsoluteDifference { tolerance: 2.0 },
                    0.8,
                    0.05,
                ),
                ComparisonLevel::new("other", LevelTest::Else, 0.2, 0.95),
            ],
        );
        let specs = vec![spec];

        let a = record(0, json!({"height": 180.0}));
        let close = compare_pair(&specs, &a, &record(1, json!({"height": 181.5})));
        assert_eq!(close.level(0), 0);

        let far = compare_pair(&specs, &a, &record(1, json!({"height": 192.0})));
        assert_eq!(far.level(0), 1);
    }

    #[test]
    fn test_non_numeric_value_falls_through_numeric_test() {
        let spec = ComparisonSpec::new(
            "height",
            vec![
                ComparisonLevel::new(
                    "within_2",
                    LevelTest::AbsoluteDifference { tolerance: 2.0 },
                    0.8,
                    0.05,
                ),
                ComparisonLevel::new("other", LevelTest::Else, 0.2, 0.95),
            ],
        );
        let a = record(0, json!({"height": "unknown"}));
        let b = record(1, json!({"height": 180.0}));

        let vector = compare_pair(&[spec], &a, &b);
        assert_eq!(vector.level(0), 1);
    }
}
