//! Analytics Core - Concentration & Divergence Engine
//!
//! Turns raw per-category observations into concentration indices, period over
//! period shift figures and a weighted composite per index type.
//!
//! # Architecture
//!
//! ```text
//! Snapshot (category → observations)
//!     ↓
//! normalize (de-accumulate cumulative bands, shift negatives)
//!     ↓
//! IndexCalculator (Gini, HHI, Atkinson, Shannon, P90:P10)
//!     ↓
//! compare (key alignment, Euclidean distance, JS divergence) ← previous snapshot
//!     ↓
//! composite_index (weighted geometric mean, min/max normalized)
//! ```

pub mod comparator;
pub mod composite;
pub mod error;
pub mod indices;
pub mod normalizer;
pub mod types;

pub use comparator::{align, compare, euclidean_distance, js_divergence, kl_divergence, AlignedPair, Comparison};
pub use composite::{composite_index, master_index, weighted_scores, WeightedScore};
pub use error::EngineError;
pub use indices::IndexCalculator;
pub use normalizer::normalize;
pub use types::{
    Category, CompositeIndex, Distribution, Divergence, IndexKind, IndexResult,
    NormalizedSnapshot, Observation, Outcome, Snapshot, SnapshotReport,
};
