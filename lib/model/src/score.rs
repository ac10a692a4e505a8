//! Fellegi-Sunter pairwise scoring
//!
//! Combines a comparison vector with trained m/u probabilities into a match
//! weight: the prior log2-odds plus one log2(m/u) term per comparison. The
//! settings are compiled once so scoring a pair is a handful of table
//! lookups, and pairs are scored in parallel with no shared mutable state.

use crate::compare::{compare_pair, ComparisonVector};
use crate::settings::{LinkageSettings, MissingValuePolicy};
use rayon::prelude::*;
use reclink_core::{CandidatePair, Record, RecordSet, ScoredEdge};

/// Match probability for a log2-odds weight
#[inline]
pub fn probability_from_weight(weight: f64) -> f64 {
    let odds = weight.exp2();
    if odds.is_infinite() {
        1.0
    } else {
        odds / (1.0 + odds)
    }
}

/// Prior log2-odds for a prior match probability
#[inline]
pub fn prior_weight(probability: f64) -> f64 {
    (probability / (1.0 - probability)).log2()
}

/// Settings compiled into per-level weight terms
///
/// Compilation assumes validated settings: probabilities strictly inside
/// (0, 1), so every term is finite.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    prior: f64,
    /// log2(m/u) per comparison, per level
    terms: Vec<Vec<f64>>,
    /// Term of the catch-all level per comparison
    else_terms: Vec<f64>,
    policy: MissingValuePolicy,
}

impl CompiledModel {
    pub fn compile(settings: &LinkageSettings) -> Self {
        let terms: Vec<Vec<f64>> = settings
            .comparisons
            .iter()
            .map(|spec| {
                spec.levels
                    .iter()
                    .map(|level| (level.m_probability / level.u_probability).log2())
                    .collect()
            })
            .collect();
        let else_terms = settings
            .comparisons
            .iter()
            .zip(&terms)
            .map(|(spec, t)| t[spec.else_index()])
            .collect();

        Self {
            prior: prior_weight(settings.probability_two_random_records_match),
            terms,
            else_terms,
            policy: settings.missing_value_policy,
        }
    }

    #[inline]
    pub fn prior(&self) -> f64 {
        self.prior
    }

    #[inline]
    pub fn comparison_count(&self) -> usize {
        self.terms.len()
    }

    /// Match weight of a comparison vector
    pub fn match_weight(&self, vector: &ComparisonVector) -> f64 {
        let mut weight = self.prior;
        for (i, level) in vector.iter().enumerate() {
            if vector.is_missing(i) {
                if self.policy == MissingValuePolicy::Penalize {
                    weight += self.else_terms[i];
                }
            } else {
                weight += self.terms[i][level as usize];
            }
        }
        weight
    }
}

/// Applies the compiled model across candidate pairs
#[derive(Debug, Clone, Copy)]
pub struct PairwiseScorer<'a> {
    settings: &'a LinkageSettings,
    model: &'a CompiledModel,
}

impl<'a> PairwiseScorer<'a> {
    #[inline]
    #[must_use]
    pub fn new(settings: &'a LinkageSettings, model: &'a CompiledModel) -> Self {
        Self { settings, model }
    }

    /// Comparison vector and match weight for a single pair of records
    pub fn score_pair(&self, left: &Record, right: &Record) -> (ComparisonVector, f64) {
        let vector = compare_pair(&self.settings.comparisons, left, right);
        let weight = self.model.match_weight(&vector);
        (vector, weight)
    }

    /// Score every candidate pair, in parallel
    ///
    /// For a linking job (`right` present), pair `b` indices address the
    /// right set and edge endpoints for the right set are offset past the
    /// left set, matching the combined record universe. Output order follows
    /// input order, so results are deterministic.
    pub fn score_all(
        &self,
        pairs: &[CandidatePair],
        left: &RecordSet,
        right: Option<&RecordSet>,
    ) -> Vec<ScoredEdge> {
        let offset = left.len() as u32;
        pairs
            .par_iter()
            .map(|pair| {
                let (left_record, right_record, a, b) = match right {
                    Some(right_set) => (
                        &left.records()[pair.a as usize],
                        &right_set.records()[pair.b as usize],
                        pair.a,
                        offset + pair.b,
                    ),
                    None => (
                        &left.records()[pair.a as usize],
                        &left.records()[pair.b as usize],
                        pair.a,
                        pair.b,
                    ),
                };
                let (_, weight) = self.score_pair(left_record, right_record);
                ScoredEdge::new(a, b, weight, probability_from_weight(weight))
            })
            .collect()
    }
}
