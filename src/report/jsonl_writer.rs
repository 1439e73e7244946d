//! JSONL writer - one serialized snapshot report per line

use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use crate::analytics_core::types::SnapshotReport;
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const JSONL_FILE_NAME: &str = "indices.jsonl";

pub struct JsonlReportWriter {
    writer: BufWriter<fs::File>,
    path: PathBuf,
}

impl JsonlReportWriter {
    /// Append to `<dir>/indices.jsonl`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(JSONL_FILE_NAME);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        log::info!("📝 Writing snapshot reports to: {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_report(&mut self, report: &SnapshotReport) -> Result<(), ReportWriterError> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for JsonlReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[async_trait]
impl ReportWriterBackend for JsonlReportWriter {
    async fn write_report(&mut self, report: &SnapshotReport) -> Result<(), ReportWriterError> {
        JsonlReportWriter::write_report(self, report)
    }

    async fn flush(&mut self) -> Result<(), ReportWriterError> {
        JsonlReportWriter::flush(self)?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}
