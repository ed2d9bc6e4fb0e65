//! Binary runner utilities
//!
//! Drives a headless feed-following binary: start once, tick on a fixed
//! interval until shutdown, and report a heartbeat summary of applied
//! updates on every window.

use std::time::Duration;
use tokenfeed::infrastructure::{BeatSummary, Heartbeat};
use tokenfeed::ShutdownManager;
use tracing::info;

/// Loop settings for a runner
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    pub heartbeat_interval_secs: u64,
    pub tick_interval: Duration,
}

impl RunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            heartbeat_interval_secs: 60,
            tick_interval: Duration::from_millis(100),
        }
    }

    pub fn with_heartbeat(mut self, secs: u64) -> Self {
        self.heartbeat_interval_secs = secs;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

/// Headless binary driven by `execute`
#[allow(async_fn_in_trait)]
pub trait BinaryRunner {
    fn config(&self) -> &RunConfig;

    fn shutdown(&self) -> &ShutdownManager;

    /// One-time setup before the first tick (bootstrap, spawn clients)
    async fn start(&mut self) -> anyhow::Result<()>;

    /// Process pending work, returning the number of updates applied
    fn tick(&mut self) -> u64;

    /// Called once per heartbeat window
    fn on_heartbeat(&mut self, beat: BeatSummary);

    /// Called after the loop exits
    fn stop(&mut self) {}

    /// Summary printed in the shutdown banner
    fn summary(&self) -> Option<String> {
        None
    }

    fn print_banner(&self) {
        let config = self.config();
        info!("========================================");
        info!("Starting {}", config.name);
        info!(
            "Tick {}ms, heartbeat every {}s. Press Ctrl+C to stop",
            config.tick_interval.as_millis(),
            config.heartbeat_interval_secs
        );
        info!("========================================");
    }

    fn print_shutdown(&self) {
        info!("========================================");
        info!("{} stopped", self.config().name);
        if let Some(summary) = self.summary() {
            info!("{}", summary);
        }
        info!("========================================");
    }

    /// Start, tick until shutdown, then stop
    async fn execute(&mut self) -> anyhow::Result<()> {
        self.print_banner();
        if let Err(e) = self.start().await {
            self.print_shutdown();
            return Err(e);
        }

        let tick_interval = self.config().tick_interval;
        let mut heartbeat = Heartbeat::new(self.config().heartbeat_interval_secs);

        while self.shutdown().is_running() {
            heartbeat.record_updates(self.tick());
            if heartbeat.should_beat() {
                self.on_heartbeat(heartbeat.beat());
            }
            self.shutdown().interruptible_sleep(tick_interval).await;
        }

        self.stop();
        self.print_shutdown();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingRunner {
        config: RunConfig,
        shutdown: ShutdownManager,
        started: bool,
        ticks: u64,
        beats: Vec<BeatSummary>,
        stopped: bool,
        fail_start: bool,
    }

    impl CountingRunner {
        fn new(heartbeat_secs: u64) -> Self {
            Self {
                config: RunConfig::new("counting")
                    .with_heartbeat(heartbeat_secs)
                    .with_tick_interval(Duration::from_millis(1)),
                shutdown: ShutdownManager::new(),
                started: false,
                ticks: 0,
                beats: Vec::new(),
                stopped: false,
                fail_start: false,
            }
        }
    }

    impl BinaryRunner for CountingRunner {
        fn config(&self) -> &RunConfig {
            &self.config
        }

        fn shutdown(&self) -> &ShutdownManager {
            &self.shutdown
        }

        async fn start(&mut self) -> anyhow::Result<()> {
            if self.fail_start {
                anyhow::bail!("snapshot unavailable");
            }
            self.started = true;
            Ok(())
        }

        fn tick(&mut self) -> u64 {
            self.ticks += 1;
            if self.ticks == 5 {
                self.shutdown.trigger();
            }
            2
        }

        fn on_heartbeat(&mut self, beat: BeatSummary) {
            self.beats.push(beat);
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new("test-binary")
            .with_heartbeat(120)
            .with_tick_interval(Duration::from_millis(500));

        assert_eq!(config.name, "test-binary");
        assert_eq!(config.heartbeat_interval_secs, 120);
        assert_eq!(config.tick_interval, Duration::from_millis(500));

        let config = RunConfig::new("default");
        assert_eq!(config.heartbeat_interval_secs, 60);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_execute_ticks_until_shutdown() {
        let mut runner = CountingRunner::new(0);
        runner.execute().await.unwrap();

        assert!(runner.started);
        assert!(runner.stopped);
        assert_eq!(runner.ticks, 5);
        assert_eq!(runner.beats.len(), 5);
        assert!(runner.beats.iter().all(|beat| beat.updates == 2));
    }

    #[tokio::test]
    async fn test_long_heartbeat_never_fires() {
        let mut runner = CountingRunner::new(3_600);
        runner.execute().await.unwrap();
        assert_eq!(runner.ticks, 5);
        assert!(runner.beats.is_empty());
    }

    #[tokio::test]
    async fn test_start_failure_skips_loop() {
        let mut runner = CountingRunner::new(0);
        runner.fail_start = true;

        assert!(runner.execute().await.is_err());
        assert_eq!(runner.ticks, 0);
        assert!(!runner.stopped);
    }
}
