//! Unified writer interface for snapshot reports
//!
//! Routes writes to the JSONL, CSV or SQLite backend based on configuration.

use super::csv_writer::CsvReportWriter;
use super::jsonl_writer::JsonlReportWriter;
use super::sqlite_writer::SqliteReportWriter;
use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use super::BackendType;
use crate::analytics_core::types::SnapshotReport;
use std::path::PathBuf;

/// Unified writer that routes to the selected backend
pub enum ReportWriter {
    Jsonl(JsonlReportWriter),
    Csv(CsvReportWriter),
    Sqlite(SqliteReportWriter),
}

impl ReportWriter {
    /// Create a writer for `backend`
    ///
    /// `path` is an output directory for JSONL/CSV and a database file for SQLite.
    pub fn new(backend: BackendType, path: PathBuf) -> Result<Self, ReportWriterError> {
        match backend {
            BackendType::Jsonl => Ok(ReportWriter::Jsonl(JsonlReportWriter::new(path)?)),
            BackendType::Csv => Ok(ReportWriter::Csv(CsvReportWriter::new(path)?)),
            BackendType::Sqlite => Ok(ReportWriter::Sqlite(SqliteReportWriter::new(path)?)),
        }
    }

    fn backend(&mut self) -> &mut dyn ReportWriterBackend {
        match self {
            ReportWriter::Jsonl(w) => w,
            ReportWriter::Csv(w) => w,
            ReportWriter::Sqlite(w) => w,
        }
    }

    /// Write one snapshot report to the configured backend
    pub async fn write_report(&mut self, report: &SnapshotReport) -> Result<(), ReportWriterError> {
        self.backend().write_report(report).await
    }

    /// Flush pending writes to storage
    pub async fn flush(&mut self) -> Result<(), ReportWriterError> {
        self.backend().flush().await
    }

    /// Get backend type for logging
    pub fn backend_type(&self) -> &'static str {
        match self {
            ReportWriter::Jsonl(_) => "JSONL",
            ReportWriter::Csv(_) => "CSV",
            ReportWriter::Sqlite(_) => "SQLite",
        }
    }
}
