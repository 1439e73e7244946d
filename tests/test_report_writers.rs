//! Integration tests for the report backends
//!
//! Each test runs a small two-snapshot series through the pipeline and checks
//! what lands on disk.

#[cfg(test)]
mod report_writer_tests {
    use chrono::NaiveDate;
    use distmetrics::analytics_core::types::{Observation, Snapshot, SnapshotReport};
    use distmetrics::config::EngineConfig;
    use distmetrics::pipeline::SnapshotPipeline;
    use distmetrics::report::csv_writer::CSV_FILE_NAME;
    use distmetrics::report::jsonl_writer::JSONL_FILE_NAME;
    use distmetrics::report::{BackendType, ReportWriter};
    use rusqlite::{params, Connection};
    use tempfile::tempdir;

    fn obs(pairs: &[(&str, f64)]) -> Vec<Observation> {
        pairs.iter().map(|(k, v)| Observation::new(*k, *v)).collect()
    }

    fn reports() -> Vec<SnapshotReport> {
        let day = |d| NaiveDate::from_ymd_opt(2023, 6, d).unwrap();
        let snapshots = vec![
            Snapshot::new(day(1))
                .with_category("pools", obs(&[("a", 40.0), ("b", 30.0), ("c", 20.0), ("d", 10.0)]))
                .with_category("tokens", obs(&[("x", 5.0), ("y", 5.0)])),
            Snapshot::new(day(2))
                .with_category("pools", obs(&[("a", 10.0), ("b", 20.0), ("c", 30.0), ("d", 40.0)]))
                .with_category("tokens", vec![]),
        ];

        let pipeline = SnapshotPipeline::new(EngineConfig::empty()).unwrap();
        pipeline.run(&snapshots).0
    }

    async fn write_all(writer: &mut ReportWriter, reports: &[SnapshotReport]) {
        for report in reports {
            writer.write_report(report).await.unwrap();
        }
        writer.flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_jsonl_one_report_per_line() {
        let dir = tempdir().unwrap();
        let mut writer = ReportWriter::new(BackendType::Jsonl, dir.path().to_path_buf()).unwrap();
        assert_eq!(writer.backend_type(), "JSONL");

        write_all(&mut writer, &reports()).await;

        let content = std::fs::read_to_string(dir.path().join(JSONL_FILE_NAME)).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0]["date"], "2023-06-01");
        assert_eq!(lines[0]["categories"]["pools"]["Gini"], 0.25);
        assert!(lines[0]["categories"]["pools"]["euclideanDistance"].is_null());
        assert_eq!(lines[1]["categories"]["pools"]["decileRatio"], 400);
        assert!(lines[1]["categories"]["tokens"]["error"]
            .as_str()
            .unwrap()
            .contains("tokens"));
        assert!(lines[1]["masterIndex"]["Gini"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_csv_rows_and_header() {
        let dir = tempdir().unwrap();
        let mut writer = ReportWriter::new(BackendType::Csv, dir.path().to_path_buf()).unwrap();
        write_all(&mut writer, &reports()).await;
        drop(writer);

        let mut reader = csv::Reader::from_path(dir.path().join(CSV_FILE_NAME)).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "date");
        assert_eq!(&headers[7], "js_divergence");

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        // pools, tokens, masterIndex per snapshot
        assert_eq!(records.len(), 6);

        let first_pools = &records[0];
        assert_eq!(&first_pools[1], "pools");
        assert_eq!(&first_pools[6], "");

        let failed_tokens = &records[4];
        assert_eq!(&failed_tokens[1], "tokens");
        assert_eq!(&failed_tokens[2], "");
        assert!(!failed_tokens[9].is_empty());
    }

    #[tokio::test]
    async fn test_csv_header_written_once_across_runs() {
        let dir = tempdir().unwrap();
        for _ in 0..2 {
            let mut writer = ReportWriter::new(BackendType::Csv, dir.path().to_path_buf()).unwrap();
            write_all(&mut writer, &reports()).await;
        }

        let content = std::fs::read_to_string(dir.path().join(CSV_FILE_NAME)).unwrap();
        let headers = content.lines().filter(|l| l.starts_with("date,")).count();
        assert_eq!(headers, 1);
    }

    #[tokio::test]
    async fn test_sqlite_tables_and_upsert() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reports.db");
        let reports = reports();

        for _ in 0..2 {
            let mut writer = ReportWriter::new(BackendType::Sqlite, db_path.clone()).unwrap();
            assert_eq!(writer.backend_type(), "SQLite");
            write_all(&mut writer, &reports).await;
        }

        let conn = Connection::open(&db_path).unwrap();
        let categories: i64 = conn
            .query_row("SELECT COUNT(*) FROM category_indices", [], |row| row.get(0))
            .unwrap();
        assert_eq!(categories, 4);

        let composites: i64 = conn
            .query_row("SELECT COUNT(*) FROM composite_indices", [], |row| row.get(0))
            .unwrap();
        assert_eq!(composites, 8);

        let (distance, js): (Option<f64>, Option<f64>) = conn
            .query_row(
                "SELECT euclidean_distance, js_divergence FROM category_indices
                 WHERE date = ?1 AND category = ?2",
                params!["2023-06-02", "pools"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(distance.unwrap() > 0.0);
        assert!(js.unwrap() > 0.0);

        let error: Option<String> = conn
            .query_row(
                "SELECT error FROM composite_indices WHERE date = ?1 AND index_type = ?2",
                params!["2023-06-02", "Gini"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(error.is_some());

        let first_gini: Option<f64> = conn
            .query_row(
                "SELECT value FROM composite_indices WHERE date = ?1 AND index_type = ?2",
                params!["2023-06-01", "Gini"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(first_gini.is_some());
    }
}
