//! Snapshot loading from a directory of dated JSON files
//!
//! Layout: `<dir>/data_<YYYY-MM-DD>.json`, each file mapping category name to
//! either a list of record objects or an object of `label: value` pairs. Which
//! record fields hold the key and the value is configured per category
//! ([`EngineConfig::fields`]), e.g. `{"entity": .., "amount_staked": ..}` for
//! `amountStakedByPool`. Object order is preserved (cumulative thresholds rely
//! on it) and `null` values are dropped.

use crate::analytics_core::types::{Observation, Snapshot};
use crate::config::EngineConfig;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Parse { file: PathBuf, source: serde_json::Error },
    InvalidValue { file: PathBuf, category: String, key: String },
    MissingField { file: PathBuf, category: String, field: String },
    UnexpectedShape { file: PathBuf, category: String },
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "IO error: {}", e),
            SourceError::Parse { file, source } => {
                write!(f, "Failed to parse {}: {}", file.display(), source)
            }
            SourceError::InvalidValue {
                file,
                category,
                key,
            } => write!(
                f,
                "Non-numeric value for {}/{} in {}",
                category,
                key,
                file.display()
            ),
            SourceError::MissingField {
                file,
                category,
                field,
            } => write!(
                f,
                "Record in {} without '{}' field in {}",
                category,
                field,
                file.display()
            ),
            SourceError::UnexpectedShape { file, category } => write!(
                f,
                "{} in {} is neither a list of records nor an object",
                category,
                file.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract the date from a `data_<YYYY-MM-DD>.json` file name
pub fn snapshot_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_prefix("data_")?.strip_suffix(".json")?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

/// `Some(v)` for a number, `None` for null, an error for anything else
fn numeric(
    value: &Value,
    file: &Path,
    category: &str,
    key: &str,
) -> Result<Option<f64>, SourceError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| SourceError::InvalidValue {
            file: file.to_path_buf(),
            category: category.to_string(),
            key: key.to_string(),
        }),
        _ => Err(SourceError::InvalidValue {
            file: file.to_path_buf(),
            category: category.to_string(),
            key: key.to_string(),
        }),
    }
}

fn parse_records(
    records: &[Value],
    category: &str,
    config: &EngineConfig,
    file: &Path,
) -> Result<Vec<Observation>, SourceError> {
    let (key_field, value_field) = config.fields(category);
    let mut observations = Vec::with_capacity(records.len());

    for record in records {
        let record = record.as_object().ok_or_else(|| SourceError::UnexpectedShape {
            file: file.to_path_buf(),
            category: category.to_string(),
        })?;

        let key = match record.get(key_field) {
            Some(key) if !key.is_null() => key_to_string(key),
            _ => {
                return Err(SourceError::MissingField {
                    file: file.to_path_buf(),
                    category: category.to_string(),
                    field: key_field.to_string(),
                })
            }
        };

        let value = match record.get(value_field) {
            Some(value) => numeric(value, file, category, &key)?,
            None => None,
        };
        if let Some(value) = value {
            observations.push(Observation::new(key, value));
        }
    }

    Ok(observations)
}

fn parse_labeled(
    map: &Map<String, Value>,
    category: &str,
    file: &Path,
) -> Result<Vec<Observation>, SourceError> {
    let mut observations = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(value) = numeric(value, file, category, key)? {
            observations.push(Observation::new(key.clone(), value));
        }
    }
    Ok(observations)
}

/// Parse one snapshot document
///
/// With a non-empty category table only configured categories are kept.
/// `file` is only used for error reporting.
pub fn parse_snapshot(
    date: NaiveDate,
    json: &str,
    file: &Path,
    config: &EngineConfig,
) -> Result<Snapshot, SourceError> {
    let raw: Map<String, Value> =
        serde_json::from_str(json).map_err(|source| SourceError::Parse {
            file: file.to_path_buf(),
            source,
        })?;

    let mut snapshot = Snapshot::new(date);

    for (category, entries) in &raw {
        if !config.accepts(category) {
            log::debug!("Ignoring unconfigured category {} in {}", category, file.display());
            continue;
        }

        let observations = match entries {
            Value::Array(records) => parse_records(records, category, config, file)?,
            Value::Object(map) => parse_labeled(map, category, file)?,
            Value::Null => continue,
            _ => {
                return Err(SourceError::UnexpectedShape {
                    file: file.to_path_buf(),
                    category: category.clone(),
                })
            }
        };

        snapshot.categories.insert(category.clone(), observations);
    }

    Ok(snapshot)
}

/// Load a snapshot file; the date comes from the file name
pub fn load_snapshot(path: &Path, config: &EngineConfig) -> Result<Snapshot, SourceError> {
    let date = snapshot_date(path).ok_or_else(|| {
        SourceError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not named data_<YYYY-MM-DD>.json", path.display()),
        ))
    })?;

    let json = fs::read_to_string(path)?;
    let snapshot = parse_snapshot(date, &json, path, config)?;

    log::debug!(
        "Loaded snapshot {} ({} categories) from {}",
        date,
        snapshot.categories.len(),
        path.display()
    );
    Ok(snapshot)
}

/// Directory of snapshot files, iterated in chronological order
pub struct SnapshotDirectory {
    dir: PathBuf,
}

impl SnapshotDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Dated snapshot files, oldest first; other files are skipped
    pub fn list(&self) -> Result<Vec<(NaiveDate, PathBuf)>, SourceError> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match snapshot_date(&path) {
                Some(date) => files.push((date, path)),
                None => log::warn!("Skipping unrecognized file: {}", path.display()),
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    /// Load every snapshot; unreadable files are skipped with a warning
    pub fn load_all(&self, config: &EngineConfig) -> Result<Vec<Snapshot>, SourceError> {
        let files = self.list()?;
        log::info!(
            "Found {} snapshot files in {}",
            files.len(),
            self.dir.display()
        );

        let mut snapshots = Vec::with_capacity(files.len());
        for (_, path) in &files {
            match load_snapshot(path, config) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => log::warn!("Skipping snapshot file: {}", e),
            }
        }
        Ok(snapshots)
    }
}
