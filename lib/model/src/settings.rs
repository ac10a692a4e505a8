//! Linkage settings definitions
//!
//! The settings artifact is the trained model-parameter file for a linkage
//! run: blocking rules, per-field comparisons with ordered levels, and the
//! Fellegi-Sunter m/u probabilities attached to each level. Settings are
//! loaded once, validated, and then immutable; they are passed explicitly to
//! the engine so concurrent runs can use different models.

use reclink_core::BlockingRule;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Linkage settings version 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkageSettings {
    /// Settings version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Prior probability that two random records refer to the same entity
    pub probability_two_random_records_match: f64,

    /// Rules that generate candidate pairs
    pub blocking_rules: Vec<BlockingRule>,

    /// Field comparisons, one per compared field
    pub comparisons: Vec<ComparisonSpec>,

    /// How missing field values contribute to the match weight
    #[serde(default)]
    pub missing_value_policy: MissingValuePolicy,

    /// Match probability at or above which an edge is retained
    #[serde(default = "default_threshold")]
    pub match_threshold: f64,

    /// Hard ceiling on generated candidate pairs
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,
}

fn default_version() -> u32 {
    1
}

fn default_threshold() -> f64 {
    0.9
}

fn default_max_pairs() -> usize {
    25_000_000
}

impl LinkageSettings {
    /// Create settings with defaults for policy, threshold, and pair budget
    pub fn new(
        probability_two_random_records_match: f64,
        blocking_rules: Vec<BlockingRule>,
        comparisons: Vec<ComparisonSpec>,
    ) -> Self {
        Self {
            version: 1,
            probability_two_random_records_match,
            blocking_rules,
            comparisons,
            missing_value_policy: MissingValuePolicy::default(),
            match_threshold: default_threshold(),
            max_pairs: default_max_pairs(),
        }
    }

    /// Parse settings from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON reader
    pub fn from_reader(mut reader: impl Read) -> Result<Self, SettingsError> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| SettingsError::Unreadable(e.to_string()))?;
        Self::from_json_str(&buf)
    }

    /// Validate the settings
    ///
    /// Checks every invariant the scorer relies on: probabilities strictly
    /// inside (0, 1) so weights stay finite, exactly one trailing catch-all
    /// level per comparison, and well-formed blocking rules.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let prior = self.probability_two_random_records_match;
        if !(prior > 0.0 && prior < 1.0) {
            return Err(SettingsError::InvalidPrior(prior));
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(SettingsError::InvalidThreshold(self.match_threshold));
        }
        if self.max_pairs == 0 {
            return Err(SettingsError::ZeroPairBudget);
        }

        if self.blocking_rules.is_empty() {
            return Err(SettingsError::EmptyBlockingRules);
        }
        for rule in &self.blocking_rules {
            if rule.keys.is_empty() {
                return Err(SettingsError::InvalidBlockingRule {
                    rule: rule.name.clone(),
                    reason: "rule has no keys".to_string(),
                });
            }
            for key in &rule.keys {
                if let reclink_core::BlockKey::Prefix { len, .. } = key {
                    if *len == 0 {
                        return Err(SettingsError::InvalidBlockingRule {
                            rule: rule.name.clone(),
                            reason: "prefix length must be at least 1".to_string(),
                        });
                    }
                }
            }
        }

        if self.comparisons.is_empty() {
            return Err(SettingsError::EmptyComparisons);
        }
        for (i, spec) in self.comparisons.iter().enumerate() {
            if self.comparisons[..i].iter().any(|s| s.field == spec.field) {
                return Err(SettingsError::DuplicateComparisonField(spec.field.clone()));
            }
            spec.validate()?;
        }

        Ok(())
    }

    /// Fields referenced by the comparisons, in settings order
    pub fn comparison_fields(&self) -> Vec<&str> {
        self.comparisons.iter().map(|s| s.field.as_str()).collect()
    }
}

/// Ordered comparison levels for a single field
///
/// Levels are tested most-similar-first; the first passing test assigns the
/// level. The final level must be the catch-all [`LevelTest::Else`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonSpec {
    pub field: String,
    pub levels: Vec<ComparisonLevel>,
}

impl ComparisonSpec {
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, levels: Vec<ComparisonLevel>) -> Self {
        Self {
            field: field.into(),
            levels,
        }
    }

    /// Index of the catch-all level
    #[inline]
    pub fn else_index(&self) -> usize {
        self.levels.len() - 1
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.levels.len() < 2 {
            return Err(SettingsError::TooFewLevels {
                field: self.field.clone(),
            });
        }
        // Level indices are stored as u8, with the top value reserved for
        // missing comparisons
        if self.levels.len() >= 255 {
            return Err(SettingsError::TooManyLevels {
                field: self.field.clone(),
            });
        }
        match self.levels.last() {
            Some(last) if last.test == LevelTest::Else => {}
            _ => {
                return Err(SettingsError::MissingElseLevel {
                    field: self.field.clone(),
                });
            }
        }
        for level in &self.levels[..self.levels.len() - 1] {
            if level.test == LevelTest::Else {
                return Err(SettingsError::MisplacedElseLevel {
                    field: self.field.clone(),
                });
            }
        }

        for level in &self.levels {
            for p in [level.m_probability, level.u_probability] {
                if !(p > 0.0 && p < 1.0) {
                    return Err(SettingsError::InvalidProbability {
                        field: self.field.clone(),
                        level: level.label.clone(),
                        value: p,
                    });
                }
            }
            if let Some(reason) = level.test.invalid_reason() {
                return Err(SettingsError::InvalidLevelTest {
                    field: self.field.clone(),
                    level: level.label.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

/// One discretized similarity level of a comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonLevel {
    pub label: String,
    pub test: LevelTest,
    /// Probability of observing this level given the pair is a match
    pub m_probability: f64,
    /// Probability of observing this level given the pair is a non-match
    pub u_probability: f64,
}

impl ComparisonLevel {
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, test: LevelTest, m_probability: f64, u_probability: f64) -> Self {
        Self {
            label: label.into(),
            test,
            m_probability,
            u_probability,
        }
    }
}

/// Similarity test deciding whether a pair of values reaches a level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelTest {
    /// Values identical (numeric equality for numbers, byte equality for text)
    Exact,
    /// Jaro-Winkler similarity of at least `at_least`
    JaroWinkler { at_least: f64 },
    /// Levenshtein edit distance of at most `max_edits`
    Levenshtein { max_edits: usize },
    /// Absolute numeric difference within `tolerance`
    AbsoluteDifference { tolerance: f64 },
    /// Relative numeric difference within `tolerance`
    RelativeDifference { tolerance: f64 },
    /// Catch-all, always passes
    Else,
}

impl LevelTest {
    fn invalid_reason(&self) -> Option<String> {
        match self {
            LevelTest::JaroWinkler { at_least } if !(*at_least > 0.0 && *at_least <= 1.0) => {
                Some(format!("jaro_winkler at_least {} outside (0, 1]", at_least))
            }
            LevelTest::AbsoluteDifference { tolerance } if !(*tolerance >= 0.0) => {
                Some(format!("absolute_difference tolerance {} is negative", tolerance))
            }
            LevelTest::RelativeDifference { tolerance } if !(*tolerance > 0.0) => {
                Some(format!("relative_difference tolerance {} must be positive", tolerance))
            }
            _ => None,
        }
    }
}

/// Contribution of a missing field value to the match weight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// The comparison contributes nothing (bayes factor 1)
    #[default]
    Skip,
    /// The comparison is scored as its catch-all level
    Penalize,
}

/// Errors that can occur while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings must define at least one comparison")]
    EmptyComparisons,

    #[error("settings must define at least one blocking rule")]
    EmptyBlockingRules,

    #[error("comparison field '{0}' appears more than once")]
    DuplicateComparisonField(String),

    #[error("comparison '{field}' needs at least two levels")]
    TooFewLevels { field: String },

    #[error("comparison '{field}' has more than 254 levels")]
    TooManyLevels { field: String },

    #[error("comparison '{field}' must end with a catch-all level")]
    MissingElseLevel { field: String },

    #[error("comparison '{field}' has a catch-all level before the end")]
    MisplacedElseLevel { field: String },

    #[error("comparison '{field}' level '{level}' has probability {value} outside (0, 1)")]
    InvalidProbability {
        field: String,
        level: String,
        value: f64,
    },

    #[error("comparison '{field}' level '{level}': {reason}")]
    InvalidLevelTest {
        field: String,
        level: String,
        reason: String,
    },

    #[error("blocking rule '{rule}': {reason}")]
    InvalidBlockingRule { rule: String, reason: String },

    #[error("prior match probability {0} outside (0, 1)")]
    InvalidPrior(f64),

    #[error("match threshold {0} outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("candidate pair budget must be positive")]
    ZeroPairBudget,

    #[error("settings are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings could not be read: {0}")]
    Unreadable(String),
}
