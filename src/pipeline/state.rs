//! Pipeline working state carried from one snapshot to the next
//!
//! Holds the single retained previous snapshot and the rolling sums used for
//! multi-snapshot averages. Older snapshots are never kept.

use crate::analytics_core::types::{Divergence, IndexResult, NormalizedSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;

/// Running sum and count of one figure
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    pub sum: f64,
    pub count: u32,
}

impl RunningMean {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn add_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.add(v);
        }
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Rolling sums of one category across all processed snapshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySums {
    pub gini: RunningMean,
    pub hhi: RunningMean,
    pub atkinson: RunningMean,
    pub shannon: RunningMean,
    pub euclidean_distance: RunningMean,
    pub js_divergence: RunningMean,
}

impl CategorySums {
    pub fn add(&mut self, result: &IndexResult) {
        self.gini.add(result.gini);
        self.hhi.add(result.hhi);
        self.atkinson.add_opt(result.atkinson);
        self.shannon.add(result.shannon);
        self.euclidean_distance.add_opt(result.euclidean_distance);
        self.js_divergence
            .add_opt(result.js_divergence.as_ref().and_then(Divergence::value));
    }

    pub fn averages(&self) -> IndexAverages {
        IndexAverages {
            snapshots: self.gini.count,
            gini: self.gini.mean(),
            hhi: self.hhi.mean(),
            atkinson: self.atkinson.mean(),
            shannon: self.shannon.mean(),
            euclidean_distance: self.euclidean_distance.mean(),
            js_divergence: self.js_divergence.mean(),
        }
    }
}

/// Multi-snapshot averages of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexAverages {
    pub snapshots: u32,
    #[serde(rename = "Gini")]
    pub gini: Option<f64>,
    #[serde(rename = "HHI")]
    pub hhi: Option<f64>,
    #[serde(rename = "Atkinson")]
    pub atkinson: Option<f64>,
    #[serde(rename = "Shannon")]
    pub shannon: Option<f64>,
    #[serde(rename = "euclideanDistance")]
    pub euclidean_distance: Option<f64>,
    pub js_divergence: Option<f64>,
}

/// State threaded through [`super::engine::SnapshotPipeline::process`]
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    previous: Option<NormalizedSnapshot>,
    sums: BTreeMap<String, CategorySums>,
    processed: usize,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&NormalizedSnapshot> {
        self.previous.as_ref()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Record one category's results in the rolling sums
    pub fn accumulate(&mut self, category: &str, result: &IndexResult) {
        self.sums
            .entry(category.to_string())
            .or_default()
            .add(result);
    }

    /// Demote a fully processed snapshot to "previous", dropping the older one
    pub fn complete(&mut self, snapshot: NormalizedSnapshot) {
        self.previous = Some(snapshot);
        self.processed += 1;
    }

    pub fn averages(&self) -> BTreeMap<String, IndexAverages> {
        self.sums
            .iter()
            .map(|(name, sums)| (name.clone(), sums.averages()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(gini: f64, euclidean: Option<f64>, jsd: Option<Divergence>) -> IndexResult {
        IndexResult {
            gini,
            hhi: 0.5,
            atkinson: None,
            shannon: 0.1,
            euclidean_distance: euclidean,
            js_divergence: jsd,
            decile_ratio: None,
        }
    }

    #[test]
    fn test_running_mean() {
        let mut mean = RunningMean::default();
        assert_eq!(mean.mean(), None);
        mean.add(1.0);
        mean.add(3.0);
        mean.add_opt(None);
        assert_eq!(mean.mean(), Some(2.0));
        assert_eq!(mean.count, 2);
    }

    #[test]
    fn test_averages_skip_undefined_figures() {
        let mut state = PipelineState::new();
        state.accumulate("pools", &result(0.2, None, None));
        state.accumulate("pools", &result(0.4, Some(2.0), Some(Divergence::Undefined)));
        state.accumulate("pools", &result(0.6, Some(4.0), Some(Divergence::Defined(0.1))));

        let averages = state.averages();
        let pools = &averages["pools"];
        assert_eq!(pools.snapshots, 3);
        assert!((pools.gini.unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(pools.hhi, Some(0.5));
        assert_eq!(pools.atkinson, None);
        assert_eq!(pools.euclidean_distance, Some(3.0));
        assert_eq!(pools.js_divergence, Some(0.1));
    }
}
