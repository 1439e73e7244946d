//! Analyzer runtime configuration from environment variables

use crate::report::BackendType;
use std::env;
use std::path::PathBuf;

/// Configuration for the analyzer runtime
///
/// Loaded from environment variables with sensible defaults. Engine parameters
/// (weights, epsilon, Shannon scale) live in [`crate::config::EngineConfig`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Directory holding `data_<YYYY-MM-DD>.json` snapshot files
    pub data_dir: PathBuf,

    /// Report destination for the JSONL and CSV backends
    pub output_path: PathBuf,

    /// SQLite database file for the SQLite backend
    pub db_path: PathBuf,

    /// Selected report backend
    pub backend: BackendType,

    /// Log a console table per snapshot
    pub print_tables: bool,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `DISTMETRICS_DATA_DIR` (default: data)
    /// - `DISTMETRICS_OUTPUT_PATH` (default: reports)
    /// - `DISTMETRICS_DB_PATH` (default: data/distmetrics.db)
    /// - `DISTMETRICS_BACKEND` (default: jsonl)
    /// - `DISTMETRICS_PRINT_TABLES` (default: true)
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("DISTMETRICS_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),

            output_path: env::var("DISTMETRICS_OUTPUT_PATH")
                .unwrap_or_else(|_| "reports".to_string())
                .into(),

            db_path: env::var("DISTMETRICS_DB_PATH")
                .unwrap_or_else(|_| "data/distmetrics.db".to_string())
                .into(),

            backend: env::var("DISTMETRICS_BACKEND")
                .ok()
                .and_then(|s| BackendType::from_str(&s))
                .unwrap_or(BackendType::Jsonl),

            print_tables: env::var("DISTMETRICS_PRINT_TABLES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Apply `--backend <jsonl|csv|sqlite>` from the command line
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(idx) = args.iter().position(|x| x == "--backend") {
            match args.get(idx + 1).and_then(|s| BackendType::from_str(s)) {
                Some(backend) => self.backend = backend,
                None => log::warn!(
                    "Ignoring unknown --backend value {:?}, keeping {}",
                    args.get(idx + 1),
                    self.backend.as_str()
                ),
            }
        }
        self
    }

    /// Where the selected backend writes
    pub fn destination(&self) -> PathBuf {
        match self.backend {
            BackendType::Sqlite => self.db_path.clone(),
            BackendType::Jsonl | BackendType::Csv => self.output_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_custom_config() {
        // Both cases in one test: env vars are process-global
        env::remove_var("DISTMETRICS_DATA_DIR");
        env::remove_var("DISTMETRICS_OUTPUT_PATH");
        env::remove_var("DISTMETRICS_DB_PATH");
        env::remove_var("DISTMETRICS_BACKEND");
        env::remove_var("DISTMETRICS_PRINT_TABLES");

        let config = AnalyzerConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_path, PathBuf::from("reports"));
        assert_eq!(config.db_path, PathBuf::from("data/distmetrics.db"));
        assert_eq!(config.backend, BackendType::Jsonl);
        assert!(config.print_tables);

        env::set_var("DISTMETRICS_DATA_DIR", "/tmp/snapshots");
        env::set_var("DISTMETRICS_BACKEND", "sqlite");
        env::set_var("DISTMETRICS_PRINT_TABLES", "false");

        let config = AnalyzerConfig::from_env();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/snapshots"));
        assert_eq!(config.backend, BackendType::Sqlite);
        assert_eq!(config.destination(), PathBuf::from("data/distmetrics.db"));
        assert!(!config.print_tables);

        env::remove_var("DISTMETRICS_DATA_DIR");
        env::remove_var("DISTMETRICS_BACKEND");
        env::remove_var("DISTMETRICS_PRINT_TABLES");
    }

    #[test]
    fn test_backend_from_args() {
        let config = AnalyzerConfig {
            data_dir: "data".into(),
            output_path: "reports".into(),
            db_path: "db.sqlite".into(),
            backend: BackendType::Jsonl,
            print_tables: false,
        };

        let args = vec!["analyzer".to_string(), "--backend".to_string(), "csv".to_string()];
        let config = config.with_args(&args);
        assert_eq!(config.backend, BackendType::Csv);
        assert_eq!(config.destination(), PathBuf::from("reports"));

        let args = vec!["analyzer".to_string(), "--backend".to_string(), "parquet".to_string()];
        assert_eq!(config.with_args(&args).backend, BackendType::Csv);
    }
}
