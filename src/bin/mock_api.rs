//! Mock API - token snapshot REST server
//!
//! Serves the token fixture on `GET /tokens` and a liveness check on
//! `GET /health`.
//!
//! Environment: PORT, MOCK_DATA_PATH, MIN_LATENCY_MS, MAX_LATENCY_MS, LOG_LEVEL

use anyhow::Result;
use std::net::SocketAddr;
use token_dashboard::tokenfeed::infrastructure::client::snapshot::FixtureSnapshotSource;
use token_dashboard::tokenfeed::infrastructure::mock_api::{self, MockApiState};
use token_dashboard::tokenfeed::infrastructure::MockApiConfig;
use token_dashboard::tokenfeed::{init_tracing, ShutdownManager};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = MockApiConfig::from_env()?;
    init_tracing(&config.log_level);

    let data = FixtureSnapshotSource::new(&config.snapshot_path).load()?;
    info!(
        "[Mock API] Loaded {} tokens from {}",
        data.len(),
        config.snapshot_path.display()
    );

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("[Mock API] Listening on http://{}", listener.local_addr()?);
    info!(
        "[Mock API] Latency: {}-{}ms",
        config.min_latency_ms, config.max_latency_ms
    );

    let state = MockApiState::new(data).with_latency(config.min_latency_ms, config.max_latency_ms);
    mock_api::serve(listener, state, shutdown.flag()).await?;

    info!("[Mock API] Stopped");
    Ok(())
}
