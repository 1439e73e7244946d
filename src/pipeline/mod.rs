//! # Snapshot Pipeline
//!
//! Runs the analytics core over an ordered sequence of snapshots.
//!
//! - Strictly chronological, single-threaded
//! - Exactly one previous snapshot retained, passed in explicitly via
//!   [`PipelineState`] rather than held globally
//! - Rolling sums per category for multi-snapshot averages
//! - Cancellation only between snapshots
//!
//! ## Module Organization
//!
//! - `engine` - `SnapshotPipeline` orchestration
//! - `state` - `PipelineState`, rolling sums and averages
//! - `config` - analyzer runtime configuration

pub mod config;
pub mod engine;
pub mod state;

pub use config::AnalyzerConfig;
pub use engine::SnapshotPipeline;
pub use state::{IndexAverages, PipelineState};
