//! Mock Feed - simulated price-update WebSocket server
//!
//! Loads the token fixture and broadcasts a few random price moves every
//! interval to every connected client.
//!
//! Environment: PORT, UPDATE_INTERVAL_MS, MOCK_DATA_PATH, LOG_LEVEL

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use token_dashboard::tokenfeed::infrastructure::client::snapshot::FixtureSnapshotSource;
use token_dashboard::tokenfeed::infrastructure::mock_feed::{MockFeedServer, PriceSimulator};
use token_dashboard::tokenfeed::infrastructure::MockFeedConfig;
use token_dashboard::tokenfeed::{init_tracing, ShutdownManager};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = MockFeedConfig::from_env()?;
    init_tracing(&config.log_level);

    let data = FixtureSnapshotSource::new(&config.snapshot_path).load()?;
    let simulator = PriceSimulator::from_snapshot(&data);
    info!(
        "[Mock Feed] Loaded {} tokens from {}",
        simulator.len(),
        config.snapshot_path.display()
    );

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = MockFeedServer::bind(addr).await?;
    info!("[Mock Feed] Listening on ws://{}", server.local_addr()?);
    info!("[Mock Feed] Update interval: {}ms", config.update_interval_ms);

    server
        .run(
            simulator,
            Duration::from_millis(config.update_interval_ms),
            shutdown.flag(),
        )
        .await;

    info!("[Mock Feed] Stopped");
    Ok(())
}
