//! Feed Monitor - headless token feed follower
//!
//! Bootstraps the token snapshot, applies every price update from the feed
//! and logs a market summary on each heartbeat.
//!
//! Usage:
//!   ./feed_monitor                         # config/dashboard.yaml
//!   DASHBOARD_CONFIG_PATH=x.yaml ./feed_monitor
//!   ./feed_monitor --config x.yaml

use anyhow::Result;
use std::time::Duration;
use token_dashboard::bin_common::{resolve_config_path, BinaryRunner, RunConfig};
use token_dashboard::tokenfeed::application::chart::{format_change, format_price};
use token_dashboard::tokenfeed::infrastructure::client::feed::{
    spawn_feed_client, FeedClientConfig, FeedEvent, FeedHandle,
};
use token_dashboard::tokenfeed::infrastructure::client::snapshot::{
    FixtureSnapshotSource, HttpSnapshotSource, SnapshotSource,
};
use token_dashboard::tokenfeed::infrastructure::BeatSummary;
use token_dashboard::tokenfeed::{
    init_tracing, DashboardConfig, LiveTokenDashboard, ShutdownManager, TokenCategory,
};
use tracing::{info, warn};

struct FeedMonitor {
    run_config: RunConfig,
    config: DashboardConfig,
    dashboard: LiveTokenDashboard,
    shutdown: ShutdownManager,
    feed: Option<FeedHandle>,
    applied: u64,
}

impl FeedMonitor {
    fn new(config: DashboardConfig) -> Self {
        Self {
            run_config: RunConfig::new("Feed Monitor")
                .with_heartbeat(30)
                .with_tick_interval(Duration::from_millis(100)),
            dashboard: LiveTokenDashboard::new(config.simulation.volume_model()),
            config,
            shutdown: ShutdownManager::new(),
            feed: None,
            applied: 0,
        }
    }

    fn snapshot_source(&self) -> Result<Box<dyn SnapshotSource>> {
        Ok(match &self.config.api.fixture_path {
            Some(path) => Box::new(FixtureSnapshotSource::new(path)),
            None => Box::new(HttpSnapshotSource::new(
                self.config.api.base_url.clone(),
                Duration::from_secs(self.config.api.request_timeout_secs),
            )?),
        })
    }

    /// Apply one feed event, returning whether a price update was committed
    fn handle_event(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::PriceUpdate(update) => match self.dashboard.apply_price_update(&update) {
                Some(view) => {
                    self.applied += 1;
                    info!(
                        "[Monitor] {} {} -> {} ({:?})",
                        view.symbol,
                        format_price(view.prev_price()),
                        format_price(view.price),
                        view.price_direction()
                    );
                    true
                }
                None => false,
            },
            FeedEvent::GaveUp => {
                warn!("[Monitor] Feed gave up, stopping");
                self.shutdown.trigger();
                false
            }
            other => {
                info!("[Monitor] Feed event: {:?}", other);
                false
            }
        }
    }
}

impl BinaryRunner for FeedMonitor {
    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn shutdown(&self) -> &ShutdownManager {
        &self.shutdown
    }

    async fn start(&mut self) -> Result<()> {
        self.shutdown.spawn_signal_handler();

        let source = self.snapshot_source()?;
        let count = self.dashboard.bootstrap_from(source.as_ref()).await?;
        info!("[Monitor] Loaded {} tokens", count);

        self.feed = Some(spawn_feed_client(
            FeedClientConfig::from(&self.config.feed),
            self.shutdown.flag(),
        ));
        Ok(())
    }

    fn tick(&mut self) -> u64 {
        let events = match &self.feed {
            Some(feed) => feed.drain(),
            None => return 0,
        };
        let mut applied = 0;
        for event in events {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    fn on_heartbeat(&mut self, beat: BeatSummary) {
        if let Some(feed) = &self.feed {
            info!(
                "[Monitor] Feed {} | {:.2} updates/s | received={} dropped={} applied={} | {:?}",
                feed.status.label(),
                beat.updates_per_sec(),
                feed.status.received(),
                feed.status.dropped(),
                self.applied,
                self.dashboard.stats()
            );
        }

        for category in TokenCategory::all() {
            let rows = self.dashboard.category_view(*category);
            if let Some(top) = rows.first() {
                info!(
                    "[Monitor] {:<13} {:>3} tokens | top {} MC {} 1h {}",
                    category.title(),
                    rows.len(),
                    top.symbol,
                    format_price(top.market_cap),
                    format_change(top.change_1h)
                );
            }
        }
    }

    fn stop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.task.abort();
        }
    }

    fn summary(&self) -> Option<String> {
        Some(format!("Applied {} price updates", self.applied))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = resolve_config_path()?;
    let config = DashboardConfig::load(&config_path)?;

    init_tracing(&config.log_level);
    config.log();

    let mut monitor = FeedMonitor::new(config);
    monitor.execute().await
}
