//! Temporal comparison of one category's current and previous distribution
//!
//! Alignment is by key, never by position: a category whose entities merely
//! changed listing order has distance 0.

use super::error::EngineError;
use super::indices::round_to;
use super::types::{Distribution, Divergence};
use std::collections::{HashMap, HashSet};

/// Key-aligned value pairs; `p` is the current side, `q` the previous side
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub keys: Vec<String>,
    pub p: Vec<f64>,
    pub q: Vec<f64>,
}

/// Shift figures between two snapshots of one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub euclidean_distance: f64,
    pub js_divergence: Divergence,
}

/// Align two distributions by key
///
/// Current keys come first in their natural order, each paired with the
/// previous value (0 when absent). Keys that only exist on the previous side
/// follow with a current value of 0, so the shorter side is zero-padded
/// instead of dropped.
pub fn align(current: &Distribution, previous: &Distribution) -> AlignedPair {
    let previous_by_key: HashMap<&str, f64> = previous
        .observations
        .iter()
        .map(|o| (o.key.as_str(), o.value))
        .collect();

    let mut keys = Vec::with_capacity(current.len().max(previous.len()));
    let mut p = Vec::with_capacity(keys.capacity());
    let mut q = Vec::with_capacity(keys.capacity());
    let mut seen: HashSet<&str> = HashSet::new();

    for obs in &current.observations {
        if !seen.insert(obs.key.as_str()) {
            continue;
        }
        keys.push(obs.key.clone());
        p.push(obs.value);
        q.push(previous_by_key.get(obs.key.as_str()).copied().unwrap_or(0.0));
    }

    for obs in &previous.observations {
        if seen.insert(obs.key.as_str()) {
            keys.push(obs.key.clone());
            p.push(0.0);
            q.push(obs.value);
        }
    }

    AlignedPair { keys, p, q }
}

/// Euclidean distance over raw aligned values, rounded to 2 decimals
///
/// Sequences of different length are a contract violation.
pub fn euclidean_distance(p: &[f64], q: &[f64]) -> Result<f64, EngineError> {
    if p.len() != q.len() {
        return Err(EngineError::data(format!(
            "aligned sequences differ in length ({} vs {})",
            p.len(),
            q.len()
        )));
    }

    let sum: f64 = p.iter().zip(q).map(|(a, b)| (a - b).powi(2)).sum();
    Ok(round_to(sum.sqrt(), 2))
}

/// Kullback-Leibler divergence `Σ p_i ln(p_i / q_i)` over `p_i != 0`
///
/// A zero `q_i` opposite a non-zero `p_i` makes the divergence infinite,
/// reported as [`Divergence::Undefined`]. Missing trailing entries count as 0.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> Divergence {
    let mut sum = 0.0;
    for (i, &pi) in p.iter().enumerate() {
        if pi == 0.0 {
            continue;
        }
        let qi = q.get(i).copied().unwrap_or(0.0);
        if qi == 0.0 {
            return Divergence::Undefined;
        }
        sum += pi * (pi / qi).ln();
    }

    if sum.is_finite() {
        Divergence::Defined(sum)
    } else {
        Divergence::Undefined
    }
}

fn to_probabilities(values: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / total).collect())
}

/// Jensen-Shannon divergence in bits, bounded to [0, 1], rounded to 7 decimals
///
/// Each side is normalized by its own total and zero-padded to equal length.
pub fn js_divergence(p: &[f64], q: &[f64]) -> Divergence {
    let (Some(mut p), Some(mut q)) = (to_probabilities(p), to_probabilities(q)) else {
        return Divergence::Undefined;
    };

    let len = p.len().max(q.len());
    p.resize(len, 0.0);
    q.resize(len, 0.0);

    let m: Vec<f64> = p.iter().zip(&q).map(|(a, b)| 0.5 * (a + b)).collect();

    match (kl_divergence(&p, &m), kl_divergence(&q, &m)) {
        (Divergence::Defined(kl_pm), Divergence::Defined(kl_qm)) => {
            let jsd = (0.5 * kl_pm + 0.5 * kl_qm) / std::f64::consts::LN_2;
            Divergence::Defined(round_to(jsd.max(0.0), 7))
        }
        _ => Divergence::Undefined,
    }
}

/// Align and compare two distributions of the same category
pub fn compare(current: &Distribution, previous: &Distribution) -> Result<Comparison, EngineError> {
    let aligned = align(current, previous);

    Ok(Comparison {
        euclidean_distance: euclidean_distance(&aligned.p, &aligned.q)?,
        js_divergence: js_divergence(&aligned.p, &aligned.q),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics_core::types::Observation;

    fn dist(pairs: &[(&str, f64)]) -> Distribution {
        Distribution {
            observations: pairs.iter().map(|(k, v)| Observation::new(*k, *v)).collect(),
        }
    }

    #[test]
    fn test_align_by_key_not_position() {
        let current = dist(&[("a", 10.0), ("b", 20.0), ("c", 30.0), ("d", 40.0)]);
        let previous = dist(&[("d", 40.0), ("c", 30.0), ("b", 20.0), ("a", 10.0)]);

        let aligned = align(&current, &previous);
        assert_eq!(aligned.keys, vec!["a", "b", "c", "d"]);
        assert_eq!(aligned.p, aligned.q);

        let cmp = compare(&current, &previous).unwrap();
        assert_eq!(cmp.euclidean_distance, 0.0);
        assert_eq!(cmp.js_divergence, Divergence::Defined(0.0));
    }

    #[test]
    fn test_align_pads_churned_keys() {
        let current = dist(&[("a", 1.0), ("new", 2.0)]);
        let previous = dist(&[("a", 3.0), ("gone", 4.0), ("also_gone", 5.0)]);

        let aligned = align(&current, &previous);
        assert_eq!(aligned.keys, vec!["a", "new", "gone", "also_gone"]);
        assert_eq!(aligned.p, vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(aligned.q, vec![3.0, 0.0, 4.0, 5.0]);
    }

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_euclidean_distance_rejects_unequal_lengths() {
        let err = euclidean_distance(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_kl_divergence_infinite_is_undefined() {
        assert_eq!(kl_divergence(&[1.0, 0.0], &[0.0, 1.0]), Divergence::Undefined);
        assert_eq!(kl_divergence(&[0.0, 1.0], &[0.5, 0.5]).value().map(|v| v > 0.0), Some(true));
    }

    #[test]
    fn test_js_divergence_identity_is_zero() {
        let p = [0.2, 0.3, 0.5];
        assert_eq!(js_divergence(&p, &p), Divergence::Defined(0.0));
    }

    #[test]
    fn test_js_divergence_disjoint_is_one() {
        let jsd = js_divergence(&[1.0, 0.0], &[0.0, 1.0]).value().unwrap();
        assert!((jsd - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_js_divergence_is_symmetric() {
        let p = [5.0, 1.0, 3.0, 0.0];
        let q = [2.0, 2.0, 1.0, 4.0];
        assert_eq!(js_divergence(&p, &q), js_divergence(&q, &p));
    }

    #[test]
    fn test_js_divergence_normalizes_each_side_by_own_total() {
        // same shape, different scale
        let p = [1.0, 2.0, 3.0];
        let q = [10.0, 20.0, 30.0];
        assert_eq!(js_divergence(&p, &q), Divergence::Defined(0.0));
    }

    #[test]
    fn test_js_divergence_pads_shorter_side() {
        let jsd = js_divergence(&[1.0, 1.0], &[1.0, 1.0, 2.0]).value().unwrap();
        assert!(jsd > 0.0 && jsd <= 1.0);
    }

    #[test]
    fn test_js_divergence_without_mass_is_undefined() {
        assert_eq!(js_divergence(&[0.0, 0.0], &[1.0, 2.0]), Divergence::Undefined);
    }
}
