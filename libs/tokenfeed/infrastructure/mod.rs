//! Infrastructure Layer
//!
//! External interfaces: the feed and snapshot clients, configuration,
//! logging, process lifecycle and the mock API and feed servers.

pub mod client;
pub mod config;
pub mod heartbeat;
pub mod logging;
pub mod mock_api;
pub mod mock_feed;
pub mod shutdown;

pub use client::{
    spawn_feed_client, BootstrapError, FeedClientConfig, FeedEvent, FeedHandle, FeedStatus,
    FixtureSnapshotSource, HttpSnapshotSource, SnapshotSource,
};
pub use config::{ConfigError, DashboardConfig, MockApiConfig, MockFeedConfig};
pub use heartbeat::{BeatSummary, Heartbeat};
pub use logging::{init_file_tracing, init_tracing};
pub use shutdown::ShutdownManager;
