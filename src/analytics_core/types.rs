//! Core data structures shared by the normalizer, calculators, comparator and pipeline

use super::error::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// One (key, value) pair inside a category for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub key: String,
    pub value: f64,
}

impl Observation {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A tracked dimension and the settings the engine applies to it
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub weight: f64,
    pub cumulative: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
            cumulative: false,
        }
    }

    pub fn cumulative(mut self) -> Self {
        self.cumulative = true;
        self
    }
}

/// Raw input for one period, as delivered by a source adapter
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub categories: BTreeMap<String, Vec<Observation>>,
}

impl Snapshot {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            categories: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, name: impl Into<String>, observations: Vec<Observation>) -> Self {
        self.categories.insert(name.into(), observations);
        self
    }
}

/// Normalized observations of one category; every value is finite and >= 0
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Distribution {
    pub observations: Vec<Observation>,
}

impl Distribution {
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// A snapshot after normalization, retained as "previous" for the next period
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSnapshot {
    pub date: NaiveDate,
    pub distributions: BTreeMap<String, Distribution>,
    /// Categories present in the snapshot whose normalization failed
    pub unavailable: BTreeSet<String>,
}

/// Result of a divergence computation
///
/// `Undefined` marks a zero-probability mismatch (infinite KL divergence) or a
/// side without mass. Consumers treat it as "no comparable data".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Divergence {
    Defined(f64),
    Undefined,
}

impl Divergence {
    pub fn value(&self) -> Option<f64> {
        match self {
            Divergence::Defined(v) => Some(*v),
            Divergence::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Divergence::Undefined)
    }
}

impl Serialize for Divergence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Divergence::Defined(v) => serializer.serialize_f64(*v),
            Divergence::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

/// Per-category index values for one snapshot
///
/// Field order and names are consumed by the report writers and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexResult {
    #[serde(rename = "Gini")]
    pub gini: f64,
    #[serde(rename = "HHI")]
    pub hhi: f64,
    #[serde(rename = "Atkinson")]
    pub atkinson: Option<f64>,
    #[serde(rename = "Shannon")]
    pub shannon: f64,
    #[serde(rename = "euclideanDistance")]
    pub euclidean_distance: Option<f64>,
    pub js_divergence: Option<Divergence>,
    #[serde(rename = "decileRatio")]
    pub decile_ratio: Option<i64>,
}

impl IndexResult {
    pub fn score(&self, kind: IndexKind) -> Option<f64> {
        match kind {
            IndexKind::Gini => Some(self.gini),
            IndexKind::Hhi => Some(self.hhi),
            IndexKind::Atkinson => self.atkinson,
            IndexKind::Shannon => Some(self.shannon),
        }
    }
}

/// Index types folded into a composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexKind {
    Gini,
    Hhi,
    Atkinson,
    Shannon,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Gini => "Gini",
            IndexKind::Hhi => "HHI",
            IndexKind::Atkinson => "Atkinson",
            IndexKind::Shannon => "Shannon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Gini" => Some(IndexKind::Gini),
            "HHI" => Some(IndexKind::Hhi),
            "Atkinson" => Some(IndexKind::Atkinson),
            "Shannon" => Some(IndexKind::Shannon),
            _ => None,
        }
    }

    pub fn all() -> [IndexKind; 4] {
        [
            IndexKind::Gini,
            IndexKind::Hhi,
            IndexKind::Atkinson,
            IndexKind::Shannon,
        ]
    }
}

/// Either a computed value or the error that prevented it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Computed(T),
    Failed { error: EngineError },
}

impl<T> Outcome<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&EngineError> {
        match self {
            Outcome::Computed(_) => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

impl<T> From<Result<T, EngineError>> for Outcome<T> {
    fn from(result: Result<T, EngineError>) -> Self {
        match result {
            Ok(v) => Outcome::Computed(v),
            Err(error) => Outcome::Failed { error },
        }
    }
}

/// Master index per index type for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeIndex {
    #[serde(rename = "Gini")]
    pub gini: Outcome<f64>,
    #[serde(rename = "HHI")]
    pub hhi: Outcome<f64>,
    #[serde(rename = "Atkinson")]
    pub atkinson: Outcome<f64>,
    #[serde(rename = "Shannon")]
    pub shannon: Outcome<f64>,
}

impl CompositeIndex {
    pub fn get(&self, kind: IndexKind) -> &Outcome<f64> {
        match kind {
            IndexKind::Gini => &self.gini,
            IndexKind::Hhi => &self.hhi,
            IndexKind::Atkinson => &self.atkinson,
            IndexKind::Shannon => &self.shannon,
        }
    }
}

/// Everything the engine produces for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotReport {
    pub date: NaiveDate,
    pub categories: BTreeMap<String, Outcome<IndexResult>>,
    #[serde(rename = "masterIndex")]
    pub master_index: CompositeIndex,
}

impl SnapshotReport {
    pub fn category(&self, name: &str) -> Option<&IndexResult> {
        self.categories.get(name).and_then(|o| o.computed())
    }

    pub fn failed_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, o)| o.error().is_some())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
