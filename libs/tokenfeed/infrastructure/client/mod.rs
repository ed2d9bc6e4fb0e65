//! External clients
//!
//! The price-update feed and the snapshot bootstrap sources.

pub mod feed;
pub mod snapshot;

pub use feed::{spawn_feed_client, FeedClientConfig, FeedEvent, FeedHandle, FeedStatus};
pub use snapshot::{BootstrapError, FixtureSnapshotSource, HttpSnapshotSource, SnapshotSource};
