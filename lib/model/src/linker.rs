//! Linkage pipeline facade
//!
//! A [`Linker`] owns validated settings and the compiled scoring model and
//! runs the batch pipeline: blocking, parallel pairwise scoring, and
//! threshold-based cluster resolution. Linkers hold no mutable state, so
//! concurrent runs with different models are just separate values.

use crate::score::{CompiledModel, PairwiseScorer};
use crate::settings::{LinkageSettings, SettingsError};
use reclink_core::{
    BlockingIndex, ClusterAssignment, ClusterResolver, ClusterSet, Error as CoreError, RecordId,
    RecordSet, ScoredEdge,
};
use tracing::{debug, info};

/// Errors surfaced by the linkage pipeline
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result of a deduplication or linking run
#[derive(Debug, Clone)]
pub struct LinkageOutput {
    pub clusters: ClusterSet,
    pub assignments: Vec<ClusterAssignment>,
}

/// The record-linkage engine
#[derive(Debug, Clone)]
pub struct Linker {
    settings: LinkageSettings,
    model: CompiledModel,
}

impl Linker {
    /// Create a linker from settings, validating them once up front
    pub fn new(settings: LinkageSettings) -> Result<Self, LinkError> {
        settings.validate()?;
        let model = CompiledModel::compile(&settings);
        Ok(Self { settings, model })
    }

    #[inline]
    pub fn settings(&self) -> &LinkageSettings {
        &self.settings
    }

    /// Deduplicate one record set at the settings' match threshold
    pub fn deduplicate(&self, records: &RecordSet) -> Result<LinkageOutput, LinkError> {
        self.deduplicate_at(records, self.settings.match_threshold)
    }

    /// Deduplicate one record set at an explicit match threshold
    pub fn deduplicate_at(
        &self,
        records: &RecordSet,
        threshold: f64,
    ) -> Result<LinkageOutput, LinkError> {
        validate_threshold(threshold)?;
        let edges = self.score_pairs(records)?;
        Ok(self.resolve(records.ids(), &edges, threshold))
    }

    /// Link two record sets at the settings' match threshold
    ///
    /// Only cross-set pairs are scored; the output universe is the left set
    /// followed by the right set.
    pub fn link(&self, left: &RecordSet, right: &RecordSet) -> Result<LinkageOutput, LinkError> {
        self.link_at(left, right, self.settings.match_threshold)
    }

    /// Link two record sets at an explicit match threshold
    pub fn link_at(
        &self,
        left: &RecordSet,
        right: &RecordSet,
        threshold: f64,
    ) -> Result<LinkageOutput, LinkError> {
        validate_threshold(threshold)?;
        let edges = self.score_pairs_between(left, right)?;
        let mut universe = left.ids();
        universe.extend(right.ids());
        Ok(self.resolve(universe, &edges, threshold))
    }

    /// The scored-edge stage of a deduplication run
    pub fn score_pairs(&self, records: &RecordSet) -> Result<Vec<ScoredEdge>, LinkError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.check_comparison_fields(records, None)?;
        let index = BlockingIndex::build(&self.settings.blocking_rules, records, None)?;
        let pairs = index.candidate_pairs(self.settings.max_pairs)?;
        info!(
            records = records.len(),
            blocks = index.block_count(),
            pairs = pairs.len(),
            "generated candidate pairs"
        );

        let scorer = PairwiseScorer::new(&self.settings, &self.model);
        Ok(scorer.score_all(&pairs, records, None))
    }

    /// The scored-edge stage of a linking run
    pub fn score_pairs_between(
        &self,
        left: &RecordSet,
        right: &RecordSet,
    ) -> Result<Vec<ScoredEdge>, LinkError> {
        if left.is_empty() || right.is_empty() {
            return Ok(Vec::new());
        }
        self.check_comparison_fields(left, Some(right))?;
        let index = BlockingIndex::build(&self.settings.blocking_rules, left, Some(right))?;
        let pairs = index.candidate_pairs(self.settings.max_pairs)?;
        info!(
            left = left.len(),
            right = right.len(),
            blocks = index.block_count(),
            pairs = pairs.len(),
            "generated cross-set candidate pairs"
        );

        let scorer = PairwiseScorer::new(&self.settings, &self.model);
        Ok(scorer.score_all(&pairs, left, Some(right)))
    }

    fn resolve(
        &self,
        universe: Vec<RecordId>,
        edges: &[ScoredEdge],
        threshold: f64,
    ) -> LinkageOutput {
        let retained = edges.iter().filter(|e| e.retained_at(threshold)).count();
        debug!(
            edges = edges.len(),
            retained, threshold, "resolving clusters from scored edges"
        );

        let resolved = ClusterResolver::new(threshold).resolve(&universe, edges);
        info!(
            records = universe.len(),
            clusters = resolved.clusters.len(),
            "resolved entity clusters"
        );
        LinkageOutput {
            clusters: resolved.clusters,
            assignments: resolved.assignments,
        }
    }

    /// Every compared field must exist somewhere in the input schema,
    /// otherwise the run aborts before scoring.
    fn check_comparison_fields(
        &self,
        left: &RecordSet,
        right: Option<&RecordSet>,
    ) -> Result<(), LinkError> {
        for spec in &self.settings.comparisons {
            let known = left.has_column(&spec.field)
                || right.map(|r| r.has_column(&spec.field)).unwrap_or(false);
            if !known {
                return Err(CoreError::UnknownComparisonField(spec.field.clone()).into());
            }
        }
        Ok(())
    }
}

fn validate_threshold(threshold: f64) -> Result<(), LinkError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(SettingsError::InvalidThreshold(threshold).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ComparisonLevel, ComparisonSpec, LevelTest};
    use reclink_core::{BlockingRule, Record, RecordId};
    use serde_json::json;

    fn settings() -> LinkageSettings {
        LinkageSettings::new(
            0.01,
            vec![BlockingRule::on_field("dob")],
            vec![
                ComparisonSpec::new(
                    "name",
                    vec![
                        ComparisonLevel::new("exact", LevelTest::Exact, 0.7, 0.001),
                        ComparisonLevel::new(
                            "close",
                            LevelTest::JaroWinkler { at_least: 0.9 },
                            0.2,
                            0.005,
                        ),
                        ComparisonLevel::new("other", LevelTest::Else, 0.1, 0.994),
                    ],
                ),
                ComparisonSpec::new(
                    "dob",
                    vec![
                        ComparisonLevel::new("exact", LevelTest::Exact, 0.95, 0.01),
                        ComparisonLevel::new("other", LevelTest::Else, 0.05, 0.99),
                    ],
                ),
            ],
        )
    }

    fn record(id: u64, name: &str, dob: &str) -> Record {
        Record::new(RecordId::Integer(id), json!({"name": name, "dob": dob}))
    }

    #[test]
    fn test_linker_rejects_invalid_settings() {
        let mut bad = settings();
        bad.comparisons.clear();
        assert!(matches!(
            Linker::new(bad),
            Err(LinkError::Settings(SettingsError::EmptyComparisons))
        ));
    }

    #[test]
    fn test_deduplicate_merges_near_duplicates() {
        let linker = Linker::new(settings()).unwrap();
        let records = RecordSet::from_records(vec![
            record(0, "Jon Smith", "1990-01-01"),
            record(1, "John Smith", "1990-01-01"),
            record(2, "Mary Jones", "1984-06-12"),
        ])
        .unwrap();

        let output = linker.deduplicate_at(&records, 0.5).unwrap();
        assert_eq!(output.clusters.record_count(), 3);
        assert_eq!(
            output.clusters.cluster_of(&RecordId::Integer(0)),
            output.clusters.cluster_of(&RecordId::Integer(1))
        );
        // Mary shares no block, stays a singleton
        assert_eq!(
            output.clusters.cluster_of(&RecordId::Integer(2)),
            Some(&RecordId::Integer(2))
        );
    }

    #[test]
    fn test_unknown_comparison_field_aborts() {
        let mut bad_field = settings();
        bad_field.comparisons[0].field = "surname".to_string();
        let linker = Linker::new(bad_field).unwrap();

        let records = RecordSet::from_records(vec![
            record(0, "Jon Smith", "1990-01-01"),
            record(1, "John Smith", "1990-01-01"),
        ])
        .unwrap();

        let err = linker.deduplicate(&records).unwrap_err();
        assert!(matches!(
            err,
            LinkError::Core(CoreError::UnknownComparisonField(_))
        ));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let linker = Linker::new(settings()).unwrap();
        let records = RecordSet::from_records(vec![record(0, "a", "b")]).unwrap();
        assert!(matches!(
            linker.deduplicate_at(&records, 1.5),
            Err(LinkError::Settings(SettingsError::InvalidThreshold(_)))
        ));
    }

    #[test]
    fn test_pair_budget_surfaces_as_error() {
        let mut tight = settings();
        tight.max_pairs = 1;
        let linker = Linker::new(tight).unwrap();

        let records = RecordSet::from_records(vec![
            record(0, "a", "1990-01-01"),
            record(1, "b", "1990-01-01"),
            record(2, "c", "1990-01-01"),
        ])
        .unwrap();

        let err = linker.deduplicate(&records).unwrap_err();
        assert!(matches!(
            err,
            LinkError::Core(CoreError::PairBudgetExceeded { .. })
        ));
    }

    #[test]
    fn test_link_two_record_sets() {
        let linker = Linker::new(settings()).unwrap();
        let left =
            RecordSet::from_records(vec![record(0, "Jon Smith", "1990-01-01")]).unwrap();
        let right = RecordSet::from_records(vec![
            record(100, "John Smith", "1990-01-01"),
            record(101, "Mary Jones", "1984-06-12"),
        ])
        .unwrap();

        let output = linker.link_at(&left, &right, 0.5).unwrap();
        assert_eq!(output.clusters.record_count(), 3);
        assert_eq!(
            output.clusters.cluster_of(&RecordId::Integer(0)),
            output.clusters.cluster_of(&RecordId::Integer(100))
        );
    }

    #[test]
    fn test_empty_record_set_yields_empty_output() {
        let linker = Linker::new(settings()).unwrap();
        let output = linker.deduplicate(&RecordSet::new()).unwrap();
        assert!(output.clusters.is_empty());
        assert!(output.assignments.is_empty());
    }
}
