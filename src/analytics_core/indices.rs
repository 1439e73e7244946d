//! Concentration and inequality index calculators
//!
//! Every calculator is a pure function over one value sequence. Single-element
//! and all-equal inputs describe a fully concentrated or fully equal category
//! and never fail.

use super::error::EngineError;
use super::types::{Distribution, IndexResult};
use std::collections::HashMap;

pub const DEFAULT_ATKINSON_EPSILON: f64 = 0.5;
pub const DEFAULT_SHANNON_SCALE: f64 = 10.0;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Gini coefficient via the pairwise relative mean absolute difference
///
/// `G = ΣΣ|x_i - x_j| / (2 n² μ)`, defined as 0 for `n <= 1` or `μ = 0`.
pub fn gini_coefficient(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }

    let mu = mean(values);
    if mu == 0.0 {
        return 0.0;
    }

    let mut sum = 0.0;
    for x in values {
        for y in values {
            sum += (x - y).abs();
        }
    }

    let n = n as f64;
    round_to(sum / (2.0 * n * n * mu), 2)
}

/// Herfindahl-Hirschman index on a [0, 1] scale
///
/// Shares are squared as percentages and the sum divided by 10 000.
pub fn herfindahl_hirschman_index(values: &[f64]) -> f64 {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return 0.0;
    }

    let hhi: f64 = values
        .iter()
        .map(|v| {
            let share = v / total * 100.0;
            share * share
        })
        .sum();

    round_to(hhi / 10_000.0, 2)
}

/// Atkinson index with inequality aversion `epsilon`
///
/// Returns `None` when any value is negative or the mean is zero.
pub fn atkinson_index(values: &[f64], epsilon: f64) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| *v < 0.0) {
        return None;
    }

    let n = values.len() as f64;
    let mu = mean(values);
    if mu == 0.0 {
        return None;
    }

    let index = if epsilon == 1.0 {
        let geometric_mean = values.iter().fold(1.0, |acc, v| acc * v.powf(1.0 / n));
        1.0 - geometric_mean / mu
    } else {
        let sum: f64 = values.iter().map(|v| (v / mu).powf(1.0 - epsilon)).sum();
        1.0 - (sum / n).powf(1.0 / (1.0 - epsilon))
    };

    if !index.is_finite() {
        return None;
    }

    Some(round_to(index, 2))
}

/// Shannon entropy in bits, treating each distinct value as a symbol
pub fn shannon_entropy_bits(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<u64, usize> = HashMap::new();
    for v in values {
        // +0.0 folds -0.0 into the same symbol
        *counts.entry((v + 0.0).to_bits()).or_insert(0) += 1;
    }

    let n = values.len() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Shannon entropy divided by `scale`, rounded to 2 decimals
pub fn shannon_entropy(values: &[f64], scale: f64) -> f64 {
    round_to(shannon_entropy_bits(values) / scale, 2)
}

/// Percentile of an ascending sequence using rank `p/100 × (n+1)`
///
/// Interpolates linearly between the floor and ceiling ranked values; ranks
/// outside `[1, n]` are clamped.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }

    let rank = (p / 100.0 * (n as f64 + 1.0)).clamp(1.0, n as f64);
    let lower = rank.floor();
    let upper = rank.ceil();
    let lower_value = sorted[lower as usize - 1];
    let upper_value = sorted[upper as usize - 1];

    lower_value + (rank - lower) * (upper_value - lower_value)
}

/// P90:P10 ratio reported as `floor(ratio × 100)`
///
/// Returns `None` when the 10th percentile is zero.
pub fn decile_ratio(values: &[f64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let p90 = percentile(&sorted, 90.0);
    let p10 = percentile(&sorted, 10.0);
    if p10 == 0.0 {
        return None;
    }

    let ratio = p90 / p10;
    // absorb representation error such as 8.999999999999998
    Some((ratio * 100.0 + 1e-9).floor() as i64)
}

/// Applies all five calculators with the configured parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexCalculator {
    epsilon: f64,
    shannon_scale: f64,
}

impl IndexCalculator {
    pub fn new(epsilon: f64, shannon_scale: f64) -> Result<Self, EngineError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(EngineError::configuration(format!(
                "Atkinson epsilon must be a finite value >= 0, got {}",
                epsilon
            )));
        }
        if !shannon_scale.is_finite() || shannon_scale <= 0.0 {
            return Err(EngineError::configuration(format!(
                "Shannon scale divisor must be a finite value > 0, got {}",
                shannon_scale
            )));
        }

        Ok(Self {
            epsilon,
            shannon_scale,
        })
    }

    /// Compute every index for one distribution
    ///
    /// Comparator fields are left empty; the pipeline fills them when a
    /// previous snapshot exists.
    pub fn compute(&self, distribution: &Distribution) -> Result<IndexResult, EngineError> {
        if distribution.is_empty() {
            return Err(EngineError::data("no observations to index"));
        }

        let values = distribution.values();
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(EngineError::data(
                "distribution contains negative or non-finite values",
            ));
        }

        Ok(IndexResult {
            gini: gini_coefficient(&values),
            hhi: herfindahl_hirschman_index(&values),
            atkinson: atkinson_index(&values, self.epsilon),
            shannon: shannon_entropy(&values, self.shannon_scale),
            euclidean_distance: None,
            js_divergence: None,
            decile_ratio: decile_ratio(&values),
        })
    }
}

impl Default for IndexCalculator {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_ATKINSON_EPSILON,
            shannon_scale: DEFAULT_SHANNON_SCALE,
        }
    }
}
