//! SQLite writer for snapshot reports
//!
//! Per-category indices land in `category_indices`, master indices in
//! `composite_indices`. Rerunning a snapshot replaces its rows.

use super::rows::{rows, MASTER_INDEX_ROW};
use super::writer_backend::{ReportWriterBackend, ReportWriterError};
use crate::analytics_core::types::{Divergence, IndexKind, SnapshotReport};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;

const BATCH_SIZE: usize = 16;

fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    Ok(())
}

pub struct SqliteReportWriter {
    conn: Connection,
    pending: Vec<SnapshotReport>,
}

impl SqliteReportWriter {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, ReportWriterError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ReportWriterError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create database directory {}: {}", parent.display(), e),
                    ))
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        apply_pragmas(&conn)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS category_indices (
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                gini REAL,
                hhi REAL,
                atkinson REAL,
                shannon REAL,
                euclidean_distance REAL,
                js_divergence REAL,
                js_undefined INTEGER NOT NULL DEFAULT 0,
                decile_ratio INTEGER,
                error TEXT,
                PRIMARY KEY (date, category)
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS composite_indices (
                date TEXT NOT NULL,
                index_type TEXT NOT NULL,
                value REAL,
                error TEXT,
                PRIMARY KEY (date, index_type)
            )",
            [],
        )?;

        log::info!("✅ SQLite report database initialized with WAL mode");

        Ok(Self {
            conn,
            pending: Vec::with_capacity(BATCH_SIZE),
        })
    }

    fn flush_batch(&mut self) -> Result<(), ReportWriterError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;

        for report in &self.pending {
            let date = report.date.to_string();

            for row in rows(report).iter().filter(|r| r.category != MASTER_INDEX_ROW) {
                let (js_value, js_undefined) = match row.js_divergence {
                    Some(Divergence::Defined(v)) => (Some(v), false),
                    Some(Divergence::Undefined) => (None, true),
                    None => (None, false),
                };

                tx.execute(
                    "INSERT INTO category_indices
                     (date, category, gini, hhi, atkinson, shannon,
                      euclidean_distance, js_divergence, js_undefined, decile_ratio, error)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                     ON CONFLICT(date, category) DO UPDATE SET
                        gini = excluded.gini,
                        hhi = excluded.hhi,
                        atkinson = excluded.atkinson,
                        shannon = excluded.shannon,
                        euclidean_distance = excluded.euclidean_distance,
                        js_divergence = excluded.js_divergence,
                        js_undefined = excluded.js_undefined,
                        decile_ratio = excluded.decile_ratio,
                        error = excluded.error",
                    params![
                        date,
                        row.category,
                        row.gini,
                        row.hhi,
                        row.atkinson,
                        row.shannon,
                        row.euclidean_distance,
                        js_value,
                        js_undefined,
                        row.decile_ratio,
                        row.error,
                    ],
                )?;
            }

            for kind in IndexKind::all() {
                let outcome = report.master_index.get(kind);
                tx.execute(
                    "INSERT INTO composite_indices (date, index_type, value, error)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(date, index_type) DO UPDATE SET
                        value = excluded.value,
                        error = excluded.error",
                    params![
                        date,
                        kind.as_str(),
                        outcome.computed().copied(),
                        outcome.error().map(|e| e.to_string()),
                    ],
                )?;
            }
        }

        tx.commit()?;

        log::debug!("✅ Flushed {} snapshot reports to SQLite", self.pending.len());
        self.pending.clear();

        Ok(())
    }
}

#[async_trait]
impl ReportWriterBackend for SqliteReportWriter {
    async fn write_report(&mut self, report: &SnapshotReport) -> Result<(), ReportWriterError> {
        self.pending.push(report.clone());

        if self.pending.len() >= BATCH_SIZE {
            self.flush_batch()?;
        }

        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ReportWriterError> {
        self.flush_batch()
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}
