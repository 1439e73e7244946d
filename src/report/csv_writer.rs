//! CSV writer - one row per (date, category) plus a master index row

use super::rows::{rows, COLUMNS};
use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use crate::analytics_core::types::SnapshotReport;
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const CSV_FILE_NAME: &str = "indices.csv";

pub struct CsvReportWriter {
    writer: csv::Writer<fs::File>,
    path: PathBuf,
}

impl CsvReportWriter {
    /// Append to `<dir>/indices.csv`; the header is written once for a new file
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ReportWriterError> {
        fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(CSV_FILE_NAME);

        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(COLUMNS)?;
        }

        log::info!("📝 Writing CSV reports to: {}", path.display());
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportWriterBackend for CsvReportWriter {
    async fn write_report(&mut self, report: &SnapshotReport) -> Result<(), ReportWriterError> {
        for row in rows(report) {
            self.writer.write_record(row.cells())?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ReportWriterError> {
        self.writer.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "CSV"
    }
}
