//! Concentration and divergence analytics over dated snapshots of categorical
//! distributions.
//!
//! ```text
//! source ──> Snapshot ──> pipeline::SnapshotPipeline ──> SnapshotReport ──> report
//!                              │
//!                              └── analytics_core (normalize, indices, compare, composite)
//! ```

pub mod analytics_core;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod source;
