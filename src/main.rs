//! Placement scan: loads a facility snapshot, runs one recommendation pass
//! and prints the report as JSON.

mod snapshot;

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use placement_core::config::AppConfig;
use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_service::{
    EventBus, MovementLedger, RecommendationService, ScanRequest, ScanRunner,
};
use placement_store::{AccessPatternStore, LocationGraph};

use crate::snapshot::FacilitySnapshot;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(kind = %e.kind, "Scan failed: {}", e.message);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
fn load_configuration() -> AppResult<AppConfig> {
    let env = std::env::var("PLACEMENT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting placement scan");

    let snapshot_path = std::env::args()
        .nth(1)
        .or_else(|| config.snapshot_path.clone())
        .ok_or_else(|| {
            AppError::configuration("No snapshot given: pass a path or set snapshot_path")
        })?;
    let snapshot = FacilitySnapshot::load(&snapshot_path)?;

    let graph = Arc::new(LocationGraph::new());
    let access = Arc::new(AccessPatternStore::new(
        Arc::clone(&graph),
        config.engine.recency_half_life_days,
    ));
    snapshot.apply(&graph, &access)?;
    tracing::info!(
        locations = graph.len(),
        documents = access.len(),
        path = %snapshot_path,
        "Facility snapshot loaded"
    );

    let events = Arc::new(EventBus::default());
    let ledger = Arc::new(MovementLedger::new(
        Arc::clone(&graph),
        Arc::clone(&access),
        Arc::clone(&events),
    ));
    let registry = Arc::new(RecommendationService::new(ledger, events));
    let runner = ScanRunner::new(
        graph,
        access,
        registry,
        config.engine.clone(),
        config.scan.clone(),
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling scan");
            on_signal.cancel();
        }
    });

    let report = runner
        .run(ScanRequest::new(snapshot.optimization(), Utc::now()), cancel)
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
