//! Report writers for engine output
//!
//! ```text
//! SnapshotReport ──> ReportWriter ──┬──> JSONL   (<output>/indices.jsonl)
//!                                   ├──> CSV     (<output>/indices.csv)
//!                                   └──> SQLite  (category_indices, composite_indices)
//! ```

pub mod csv_writer;
pub mod jsonl_writer;
pub mod rows;
pub mod sqlite_writer;
pub mod table;
pub mod writer;
pub mod writer_backend;

pub use csv_writer::CsvReportWriter;
pub use jsonl_writer::JsonlReportWriter;
pub use rows::{rows, ReportRow};
pub use sqlite_writer::SqliteReportWriter;
pub use table::render_table;
pub use writer::ReportWriter;
pub use writer_backend::{ReportWriterBackend, ReportWriterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Jsonl,
    Csv,
    Sqlite,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Jsonl => "jsonl",
            BackendType::Csv => "csv",
            BackendType::Sqlite => "sqlite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" => Some(BackendType::Jsonl),
            "csv" => Some(BackendType::Csv),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }
}
