//! Snapshot Pipeline - orchestration of the analytics core across periods
//!
//! ```text
//! Snapshot
//!     ↓
//! SnapshotPipeline::process(&mut PipelineState, &Snapshot)
//!     ↓
//! normalize → IndexCalculator → compare (vs. state.previous)
//!     ↓
//! composite per index type
//!     ↓
//! SnapshotReport   (state.previous ← this snapshot, rolling sums updated)
//! ```
//!
//! Snapshots must arrive in chronological order. A failing category is
//! reported with its name and does not stop the others.

use super::state::PipelineState;
use crate::analytics_core::comparator::compare;
use crate::analytics_core::composite::{composite_index, DEFAULT_WEIGHT};
use crate::analytics_core::error::EngineError;
use crate::analytics_core::indices::IndexCalculator;
use crate::analytics_core::normalizer::normalize;
use crate::analytics_core::types::{
    CompositeIndex, Distribution, IndexKind, IndexResult, NormalizedSnapshot, Observation,
    Outcome, Snapshot, SnapshotReport,
};
use crate::config::EngineConfig;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct SnapshotPipeline {
    config: EngineConfig,
    calculator: IndexCalculator,
}

impl SnapshotPipeline {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let calculator = IndexCalculator::new(config.atkinson_epsilon, config.shannon_scale)?;
        Ok(Self { config, calculator })
    }

    /// Process one snapshot against the state's previous snapshot
    ///
    /// On success the snapshot becomes the new previous snapshot and its
    /// results are added to the rolling sums. A snapshot dated on or before
    /// the previous one is rejected and leaves the state untouched.
    pub fn process(
        &self,
        state: &mut PipelineState,
        snapshot: &Snapshot,
    ) -> Result<SnapshotReport, EngineError> {
        if let Some(previous) = state.previous() {
            if snapshot.date <= previous.date {
                return Err(EngineError::data(format!(
                    "snapshot {} is not after previous snapshot {}",
                    snapshot.date, previous.date
                )));
            }
        }

        let mut categories = BTreeMap::new();
        let mut distributions = BTreeMap::new();
        let mut unavailable = BTreeSet::new();

        for (name, observations) in &snapshot.categories {
            let category = self.config.category(name);
            // A category absent last period compares against an empty
            // distribution; one that failed normalization is not compared.
            let previous = state.previous().and_then(|p| {
                if p.unavailable.contains(name) {
                    log::debug!(
                        "{} {}: no usable data on {}, comparison skipped",
                        snapshot.date,
                        name,
                        p.date
                    );
                    None
                } else {
                    Some(p.distributions.get(name).cloned().unwrap_or_default())
                }
            });

            let outcome = match normalize(&category, observations) {
                Ok(distribution) => {
                    let result = self.index_category(&distribution, previous.as_ref());
                    distributions.insert(name.clone(), distribution);
                    result
                }
                Err(e) => {
                    unavailable.insert(name.clone());
                    Err(e)
                }
            };

            let outcome = outcome.map_err(|e| e.in_category(name));
            match &outcome {
                Ok(result) => log::debug!(
                    "{} {}: gini={} hhi={} shannon={}",
                    snapshot.date,
                    name,
                    result.gini,
                    result.hhi,
                    result.shannon
                ),
                Err(e) => log::warn!("{} skipped: {}", snapshot.date, e),
            }

            categories.insert(name.clone(), Outcome::from(outcome));
        }

        let master_index = self.composite(&snapshot.categories, &categories);

        for (name, outcome) in &categories {
            if let Some(result) = outcome.computed() {
                state.accumulate(name, result);
            }
        }

        state.complete(NormalizedSnapshot {
            date: snapshot.date,
            distributions,
            unavailable,
        });

        Ok(SnapshotReport {
            date: snapshot.date,
            categories,
            master_index,
        })
    }

    /// Process snapshots in order, stopping before the next snapshot once
    /// `cancel` is set
    ///
    /// `on_report` sees each report as soon as it is computed. Out-of-order
    /// snapshots are skipped with a warning.
    pub fn run_until_cancelled<F>(
        &self,
        state: &mut PipelineState,
        snapshots: &[Snapshot],
        cancel: &AtomicBool,
        mut on_report: F,
    ) -> Vec<SnapshotReport>
    where
        F: FnMut(&SnapshotReport),
    {
        let mut reports = Vec::with_capacity(snapshots.len());

        for snapshot in snapshots {
            if cancel.load(Ordering::SeqCst) {
                log::info!(
                    "Cancelled before {} ({} snapshots processed)",
                    snapshot.date,
                    reports.len()
                );
                break;
            }

            match self.process(state, snapshot) {
                Ok(report) => {
                    on_report(&report);
                    reports.push(report);
                }
                Err(e) => log::warn!("Skipping snapshot {}: {}", snapshot.date, e),
            }
        }

        reports
    }

    /// Process every snapshot from a fresh state
    pub fn run(&self, snapshots: &[Snapshot]) -> (Vec<SnapshotReport>, PipelineState) {
        let mut state = PipelineState::new();
        let reports =
            self.run_until_cancelled(&mut state, snapshots, &AtomicBool::new(false), |_| {});
        (reports, state)
    }

    fn index_category(
        &self,
        distribution: &Distribution,
        previous: Option<&Distribution>,
    ) -> Result<IndexResult, EngineError> {
        let mut result = self.calculator.compute(distribution)?;

        if let Some(previous) = previous {
            let comparison = compare(distribution, previous)?;
            result.euclidean_distance = Some(comparison.euclidean_distance);
            result.js_divergence = Some(comparison.js_divergence);
        }

        Ok(result)
    }

    /// One composite per index type over every category of the snapshot
    ///
    /// Every snapshot category is weighted (configured weight or the default),
    /// but only categories with a defined score are scored, so a failed
    /// category surfaces as a cardinality error instead of a silent gap.
    fn composite(
        &self,
        snapshot_categories: &BTreeMap<String, Vec<Observation>>,
        results: &BTreeMap<String, Outcome<IndexResult>>,
    ) -> CompositeIndex {
        // The configured table must line up with the scored categories; without
        // one, every category in the snapshot weighs 1.0.
        let weights: BTreeMap<String, f64> = if self.config.categories.is_empty() {
            snapshot_categories
                .keys()
                .map(|name| (name.clone(), DEFAULT_WEIGHT))
                .collect()
        } else {
            self.config.weights()
        };

        let mut by_kind: BTreeMap<IndexKind, Outcome<f64>> = BTreeMap::new();
        for kind in IndexKind::all() {
            let scores: BTreeMap<String, f64> = results
                .iter()
                .filter_map(|(name, outcome)| {
                    outcome
                        .computed()
                        .and_then(|r| r.score(kind))
                        .map(|score| (name.clone(), score))
                })
                .collect();

            let value = composite_index(&scores, &weights);
            if let Err(e) = &value {
                log::warn!("{} composite unavailable: {}", kind.as_str(), e);
            }
            by_kind.insert(kind, value.into());
        }

        let mut take = |kind: IndexKind| {
            by_kind.remove(&kind).unwrap_or_else(|| Outcome::Failed {
                error: EngineError::data("composite not computed"),
            })
        };

        CompositeIndex {
            gini: take(IndexKind::Gini),
            hhi: take(IndexKind::Hhi),
            atkinson: take(IndexKind::Atkinson),
            shannon: take(IndexKind::Shannon),
        }
    }
}
