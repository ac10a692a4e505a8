//! u-probability estimation by random sampling
//!
//! Random record pairs are overwhelmingly non-matches, so the relative
//! frequency of each comparison level across a random sample estimates its
//! u probability. Sampling is seeded for reproducible runs. Estimation
//! returns a new settings value; the input settings are untouched.

use crate::compare::compare_pair;
use crate::settings::LinkageSettings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reclink_core::{Error, RecordSet};
use tracing::debug;

/// Estimate u probabilities from random pairs of `records`
///
/// Draws `sample_pairs` random (distinct) record pairs, assigns comparison
/// levels, and replaces each level's u probability with its observed
/// relative frequency under additive smoothing, so no u collapses to zero.
/// Comparisons whose field was missing in every sampled pair keep their
/// original u probabilities.
pub fn estimate_u_probabilities(
    settings: &LinkageSettings,
    records: &RecordSet,
    sample_pairs: usize,
    seed: u64,
) -> Result<LinkageSettings, Error> {
    if records.len() < 2 {
        return Err(Error::InvalidConfig(
            "u estimation needs at least two records".to_string(),
        ));
    }
    if sample_pairs == 0 {
        return Err(Error::InvalidConfig(
            "u estimation needs a positive sample size".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let n = records.len();

    let mut counts: Vec<Vec<u64>> = settings
        .comparisons
        .iter()
        .map(|spec| vec![0u64; spec.levels.len()])
        .collect();
    let mut observed: Vec<u64> = vec![0; settings.comparisons.len()];

    for _ in 0..sample_pairs {
        let i = rng.random_range(0..n);
        let mut j = rng.random_range(0..n - 1);
        if j >= i {
            j += 1;
        }

        let vector = compare_pair(
            &settings.comparisons,
            &records.records()[i],
            &records.records()[j],
        );
        for (c, level) in vector.iter().enumerate() {
            if !vector.is_missing(c) {
                counts[c][level as usize] += 1;
                observed[c] += 1;
            }
        }
    }

    let mut estimated = settings.clone();
    for (c, spec) in estimated.comparisons.iter_mut().enumerate() {
        if observed[c] == 0 {
            debug!(field = %spec.field, "no observed values in sample, keeping original u");
            continue;
        }
        let denominator = observed[c] as f64 + spec.levels.len() as f64;
        for (l, level) in spec.levels.iter_mut().enumerate() {
            level.u_probability = (counts[c][l] as f64 + 1.0) / denominator;
        }
    }

    debug!(
        sample_pairs,
        comparisons = estimated.comparisons.len(),
        "estimated u probabilities from random sample"
    );
    Ok(estimated)
}
