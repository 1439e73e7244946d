//! Source adapters delivering snapshots to the pipeline
//!
//! Only local snapshot files are read here; fetching from upstream services is
//! handled outside this crate.

pub mod snapshot_reader;

pub use snapshot_reader::{load_snapshot, parse_snapshot, snapshot_date, SnapshotDirectory, SourceError};
