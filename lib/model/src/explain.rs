//! Per-comparison score breakdown
//!
//! Mirrors the scorer term by term so a single pair's match weight can be
//! reported with the contribution of every field comparison.

use crate::compare::compare_pair;
use crate::score::{prior_weight, probability_from_weight};
use crate::settings::{LinkageSettings, MissingValuePolicy};
use reclink_core::Record;
use serde::{Deserialize, Serialize};

/// Contribution of one comparison to a pair's match weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermContribution {
    pub field: String,
    /// Label of the assigned level, or "missing"
    pub level: String,
    /// m/u of the assigned level (1.0 for a skipped missing value)
    pub bayes_factor: f64,
    /// log2 of the bayes factor
    pub weight: f64,
}

/// Full breakdown of a scored pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairExplanation {
    pub prior_weight: f64,
    pub terms: Vec<TermContribution>,
    pub match_weight: f64,
    pub match_probability: f64,
}

/// Explain the match weight of a single pair
///
/// The sum of `prior_weight` and all term weights equals `match_weight`
/// exactly; this is the same arithmetic the batch scorer performs.
pub fn explain_pair(
    settings: &LinkageSettings,
    left: &Record,
    right: &Record,
) -> PairExplanation {
    let vector = compare_pair(&settings.comparisons, left, right);
    let prior = prior_weight(settings.probability_two_random_records_match);

    let mut terms = Vec::with_capacity(settings.comparisons.len());
    let mut total = prior;
    for (i, spec) in settings.comparisons.iter().enumerate() {
        let term = if vector.is_missing(i) {
            match settings.missing_value_policy {
                MissingValuePolicy::Skip => TermContribution {
                    field: spec.field.clone(),
                    level: "missing".to_string(),
                    bayes_factor: 1.0,
                    weight: 0.0,
                },
                MissingValuePolicy::Penalize => {
                    let level = &spec.levels[spec.else_index()];
                    let bayes = level.m_probability / level.u_probability;
                    TermContribution {
                        field: spec.field.clone(),
                        level: level.label.clone(),
                        bayes_factor: bayes,
                        weight: bayes.log2(),
                    }
                }
            }
        } else {
            let level = &spec.levels[vector.level(i) as usize];
            let bayes = level.m_probability / level.u_probability;
            TermContribution {
                field: spec.field.clone(),
                level: level.label.clone(),
                bayes_factor: bayes,
                weight: bayes.log2(),
            }
        };
        total += term.weight;
        terms.push(term);
    }

    PairExplanation {
        prior_weight: prior,
        terms,
        match_weight: total,
        match_probability: probability_from_weight(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{CompiledModel, PairwiseScorer};
    use crate::settings::{ComparisonLevel, ComparisonSpec, LevelTest};
    use reclink_core::{BlockingRule, RecordId};
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

    fn record(id: u64, fields: serde_json::Value) -> Record {
        Record::new(RecordId::Integer(id), fields)
    }

    #[test]
    fn test_explanation_matches_scorer() {
        let settings = settings();
        let model = CompiledModel::compile(&settings);
        let scorer = PairwiseScorer::new(&settings, &model);

        let left = record(0, json!({"name": "Jon Smith", "dob": "1990-01-01"}));
        let right = record(1, json!({"name": "John Smith", "dob": "1990-01-01"}));

        let (_, weight) = scorer.score_pair(&left, &right);
        let explanation = explain_pair(&settings, &left, &right);

        assert!((explanation.match_weight - weight).abs() < 1e-12);
        let term_sum: f64 = explanation.terms.iter().map(|t| t.weight).sum();
        assert!((explanation.prior_weight + term_sum - explanation.match_weight).abs() < 1e-12);
    }

    #[test]
    fn test_explanation_labels_levels() {
        let settings = settings();
        let left = record(0, json!({"name": "Jon Smith", "dob": "1990-01-01"}));
        let right = record(1, json!({"name": "John Smith", "dob": "1990-01-01"}));

        let explanation = explain_pair(&settings, &left, &right);
        assert_eq!(explanation.terms[0].field, "name");
        assert_eq!(explanation.terms[0].level, "close");
        assert_eq!(explanation.terms[1].level, "exact");
    }

    #[test]
    fn test_skipped_missing_term_is_neutral() {
        let settings = settings();
        let left = record(0, json!({"name": "Jon Smith", "dob": "1990-01-01"}));
        let right = record(1, json!({"dob": "1990-01-01"}));

        let explanation = explain_pair(&settings, &left, &right);
        let name_term = &explanation.terms[0];
        assert_eq!(name_term.level, "missing");
        assert_eq!(name_term.bayes_factor, 1.0);
        assert_eq!(name_term.weight, 0.0);
    }
}
