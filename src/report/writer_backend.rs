//! Writer backend trait for snapshot reports
//!
//! Defines the interface for handing engine output to different report sinks.

use crate::analytics_core::types::SnapshotReport;
use async_trait::async_trait;

#[derive(Debug)]
pub enum ReportWriterError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Csv(csv::Error),
    Database(String),
}

impl From<std::io::Error> for ReportWriterError {
    fn from(err: std::io::Error) -> Self {
        ReportWriterError::Io(err)
    }
}

impl From<serde_json::Error> for ReportWriterError {
    fn from(err: serde_json::Error) -> Self {
        ReportWriterError::Serialization(err)
    }
}

impl From<csv::Error> for ReportWriterError {
    fn from(err: csv::Error) -> Self {
        ReportWriterError::Csv(err)
    }
}

impl From<rusqlite::Error> for ReportWriterError {
    fn from(err: rusqlite::Error) -> Self {
        ReportWriterError::Database(err.to_string())
    }
}

impl std::fmt::Display for ReportWriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportWriterError::Io(e) => write!(f, "IO error: {}", e),
            ReportWriterError::Serialization(e) => write!(f, "Serialization error: {}", e),
            ReportWriterError::Csv(e) => write!(f, "CSV error: {}", e),
            ReportWriterError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ReportWriterError {}

/// Backend trait for writing snapshot reports
#[async_trait]
pub trait ReportWriterBackend: Send {
    /// Write the report of a single snapshot
    async fn write_report(&mut self, report: &SnapshotReport) -> Result<(), ReportWriterError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), ReportWriterError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
