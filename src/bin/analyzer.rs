//! Analyzer Binary - Concentration & Divergence Reports
//!
//! Runs the snapshot pipeline over every `data_<YYYY-MM-DD>.json` file in the
//! data directory and writes one report per snapshot.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin analyzer -- --backend sqlite
//! ```
//!
//! ## Environment Variables
//!
//! - DISTMETRICS_DATA_DIR - Snapshot directory (default: data)
//! - DISTMETRICS_OUTPUT_PATH - Report directory for jsonl/csv (default: reports)
//! - DISTMETRICS_DB_PATH - SQLite database path (default: data/distmetrics.db) - used when --backend sqlite
//! - DISTMETRICS_BACKEND - Report backend when --backend is absent (default: jsonl)
//! - DISTMETRICS_PRINT_TABLES - Log a table per snapshot (default: true)
//! - DISTMETRICS_CATEGORY_CONFIG - JSON file with category weights (optional)
//! - ATKINSON_EPSILON - Atkinson inequality aversion (default: 0.5)
//! - SHANNON_SCALE - Shannon entropy divisor (default: 10)
//! - RUST_LOG - Logging level (optional, default: info)

use distmetrics::config::EngineConfig;
use distmetrics::pipeline::{AnalyzerConfig, PipelineState, SnapshotPipeline};
use distmetrics::report::{render_table, ReportWriter};
use distmetrics::source::SnapshotDirectory;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = AnalyzerConfig::from_env().with_args(&args);
    let engine_config = EngineConfig::from_env()?;

    log::info!("🚀 Starting Distribution Analyzer");
    log::info!("   Data directory: {}", config.data_dir.display());
    log::info!("   Output: {}", config.destination().display());
    log::info!("   Categories configured: {}", engine_config.categories.len());
    log::info!(
        "   Atkinson epsilon: {}, Shannon scale: {}",
        engine_config.atkinson_epsilon,
        engine_config.shannon_scale
    );

    let snapshots = SnapshotDirectory::new(&config.data_dir).load_all(&engine_config)?;
    if snapshots.is_empty() {
        log::warn!("No snapshot files found in {}", config.data_dir.display());
        return Ok(());
    }
    log::info!("📖 Loaded {} snapshots", snapshots.len());

    let pipeline = SnapshotPipeline::new(engine_config)?;
    let mut writer = ReportWriter::new(config.backend, config.destination())?;
    log::info!("📊 Backend: {}", writer.backend_type());

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("🛑 Interrupt received, finishing current snapshot");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut state = PipelineState::new();
    let reports = pipeline.run_until_cancelled(&mut state, &snapshots, &cancel, |report| {
        if config.print_tables {
            log::info!("\n{}", render_table(report));
        }

        let failed = report.failed_categories();
        if !failed.is_empty() {
            log::warn!("⚠️  {}: failed categories {:?}", report.date, failed);
        }
    });

    for report in &reports {
        if let Err(e) = writer.write_report(report).await {
            log::error!("Failed to write report for {}: {}", report.date, e);
        }
    }

    writer.flush().await?;

    log::info!("✅ Processed {} of {} snapshots", state.processed(), snapshots.len());
    for (category, averages) in state.averages() {
        log::info!("   {}: {}", category, serde_json::to_string(&averages)?);
    }

    Ok(())
}
