//! Candidate pair generation via blocking
//!
//! Blocking avoids the full O(n^2) comparison by only pairing records that
//! agree on at least one cheap derived key. Rules are recall-complete: every
//! pair that shares a block key under some rule is emitted, and a pair
//! emitted by several rules appears exactly once.

use crate::{Error, Record, RecordSet, Result};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between the parts of a composite block key
const KEY_SEPARATOR: char = '\u{1f}';

/// A single derived-key component of a blocking rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKey {
    /// The field value verbatim
    Field { field: String },
    /// The first `len` characters of the field value
    Prefix { field: String, len: usize },
    /// The case-folded field value
    Lowercase { field: String },
}

impl BlockKey {
    /// The record field this key reads
    pub fn field(&self) -> &str {
        match self {
            BlockKey::Field { field }
            | BlockKey::Prefix { field, .. }
            | BlockKey::Lowercase { field } => field,
        }
    }

    /// Derive this key part from a record
    ///
    /// Returns `None` when the field is missing, null, or not a scalar;
    /// such records never enter the rule's blocks.
    fn key_part(&self, record: &Record) -> Option<String> {
        let raw = scalar_text(record.get(self.field())?)?;
        match self {
            BlockKey::Field { .. } => Some(raw),
            BlockKey::Prefix { len, .. } => Some(raw.chars().take(*len).collect()),
            BlockKey::Lowercase { .. } => Some(raw.to_lowercase()),
        }
    }
}

/// Canonical text for a scalar JSON value
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A named conjunction of block keys
///
/// Two records fall in the same block under a rule when every key part
/// agrees. A record missing any key field is excluded from the rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockingRule {
    pub name: String,
    pub keys: Vec<BlockKey>,
}

impl BlockingRule {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, keys: Vec<BlockKey>) -> Self {
        Self {
            name: name.into(),
            keys,
        }
    }

    /// Convenience rule: exact equality on a single field
    #[must_use]
    pub fn on_field(field: &str) -> Self {
        Self::new(
            format!("exact_{}", field),
            vec![BlockKey::Field {
                field: field.to_string(),
            }],
        )
    }

    /// The composite block key for a record, or `None` if any part is missing
    fn block_key(&self, record: &Record) -> Option<String> {
        let mut key = String::new();
        for (i, part) in self.keys.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(&part.key_part(record)?);
        }
        Some(key)
    }
}

/// A pair of record indices proposed for detailed comparison
///
/// For deduplication both indices address the same set and `a < b`.
/// For linking, `a` addresses the left set and `b` the right set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidatePair {
    pub a: u32,
    pub b: u32,
}

#[derive(Debug, Default)]
struct BlockEntry {
    left: Vec<u32>,
    right: Vec<u32>,
}

/// Inverted index from block keys to record indices, one map per rule
#[derive(Debug)]
pub struct BlockingIndex {
    blocks: Vec<AHashMap<String, BlockEntry>>,
    linking: bool,
}

impl BlockingIndex {
    /// Build the index for a deduplication or linking job
    ///
    /// Every field referenced by a rule must exist in the column schema of
    /// each record set, otherwise the build fails fast with a configuration
    /// error naming the rule and field.
    pub fn build(
        rules: &[BlockingRule],
        left: &RecordSet,
        right: Option<&RecordSet>,
    ) -> Result<Self> {
        for rule in rules {
            if rule.keys.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "blocking rule '{}' has no keys",
                    rule.name
                )));
            }
            for key in &rule.keys {
                let field = key.field();
                let known =
                    left.has_column(field) || right.map(|r| r.has_column(field)).unwrap_or(false);
                if !known {
                    return Err(Error::UnknownBlockingField {
                        rule: rule.name.clone(),
                        field: field.to_string(),
                    });
                }
            }
        }

        let mut blocks: Vec<AHashMap<String, BlockEntry>> = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut map: AHashMap<String, BlockEntry> = AHashMap::new();
            for (i, record) in left.iter().enumerate() {
                if let Some(key) = rule.block_key(record) {
                    map.entry(key).or_default().left.push(i as u32);
                }
            }
            if let Some(right) = right {
                for (j, record) in right.iter().enumerate() {
                    if let Some(key) = rule.block_key(record) {
                        map.entry(key).or_default().right.push(j as u32);
                    }
                }
            }
            blocks.push(map);
        }

        Ok(Self {
            blocks,
            linking: right.is_some(),
        })
    }

    /// Emit the deduplicated union of candidate pairs over all rules
    ///
    /// Fails with [`Error::PairBudgetExceeded`] as soon as the deduplicated
    /// pair count passes `max_pairs`; partial results are never returned.
    pub fn candidate_pairs(&self, max_pairs: usize) -> Result<Vec<CandidatePair>> {
        let mut seen: AHashSet<CandidatePair> = AHashSet::new();

        for map in &self.blocks {
            for entry in map.values() {
                if self.linking {
                    for &a in &entry.left {
                        for &b in &entry.right {
                            seen.insert(CandidatePair { a, b });
                            if seen.len() > max_pairs {
                                return Err(Error::PairBudgetExceeded {
                                    generated: seen.len(),
                                    budget: max_pairs,
                                });
                            }
                        }
                    }
                } else {
                    for (i, &a) in entry.left.iter().enumerate() {
                        for &b in &entry.left[i + 1..] {
                            let pair = CandidatePair {
                                a: a.min(b),
                                b: a.max(b),
                            };
                            seen.insert(pair);
                            if seen.len() > max_pairs {
                                return Err(Error::PairBudgetExceeded {
                                    generated: seen.len(),
                                    budget: max_pairs,
                                });
                            }
                        }
                    }
                }
            }
        }

        let mut pairs: Vec<CandidatePair> = seen.into_iter().collect();
        pairs.sort_unstable();
        Ok(pairs)
    }

    /// Number of non-empty blocks across all rules
    pub fn block_count(&self) -> usize {
        self.blocks.iter().map(|m| m.len()).sum()
    }
}
