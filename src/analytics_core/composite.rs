//! Composite ("master") index over all categories of one index type

use super::error::EngineError;
use super::indices::round_to;
use std::collections::BTreeMap;

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// One category's contribution to a composite
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScore {
    pub category: String,
    pub score: f64,
    pub weight: f64,
}

/// Pair every score with its weight without touching the caller's maps
///
/// A non-empty weight map must cover exactly as many categories as there are
/// scores; any disagreement is a configuration error naming the categories
/// involved. Scores without a weight entry use [`DEFAULT_WEIGHT`].
pub fn weighted_scores(
    scores: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
) -> Result<Vec<WeightedScore>, EngineError> {
    if !weights.is_empty() && weights.len() != scores.len() {
        let unscored: Vec<&str> = weights
            .keys()
            .filter(|k| !scores.contains_key(*k))
            .map(String::as_str)
            .collect();
        let unweighted: Vec<&str> = scores
            .keys()
            .filter(|k| !weights.contains_key(*k))
            .map(String::as_str)
            .collect();
        return Err(EngineError::configuration(format!(
            "{} scores but {} weights (without score: [{}], without weight: [{}])",
            scores.len(),
            weights.len(),
            unscored.join(", "),
            unweighted.join(", ")
        )));
    }

    Ok(scores
        .iter()
        .map(|(category, &score)| WeightedScore {
            category: category.clone(),
            score,
            weight: weights.get(category).copied().unwrap_or(DEFAULT_WEIGHT),
        })
        .collect())
}

/// Weighted geometric mean positioned between the lowest and highest score
///
/// `G = (Π score_i × weight_i)^(1/n)`, `master = (G - min) / (max - min)`.
/// Identical scores have no spread and yield 0.
pub fn master_index(entries: &[WeightedScore]) -> Result<f64, EngineError> {
    if entries.is_empty() {
        return Err(EngineError::data("no category scores to aggregate"));
    }

    let n = entries.len() as f64;
    let product: f64 = entries.iter().map(|e| e.score * e.weight).product();
    let geometric_mean = product.powf(1.0 / n);

    let min = entries.iter().map(|e| e.score).fold(f64::INFINITY, f64::min);
    let max = entries
        .iter()
        .map(|e| e.score)
        .fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return Ok(0.0);
    }

    let master = (geometric_mean - min) / (max - min);
    if !master.is_finite() {
        return Err(EngineError::data(format!(
            "composite is not finite (geometric mean {})",
            geometric_mean
        )));
    }

    Ok(round_to(master, 2))
}

/// Composite for one index type from score and weight maps
pub fn composite_index(
    scores: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
) -> Result<f64, EngineError> {
    master_index(&weighted_scores(scores, weights)?)
}
