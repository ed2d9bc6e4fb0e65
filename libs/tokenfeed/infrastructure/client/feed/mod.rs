//! Price-update feed
//!
//! Boundary parser plus the reconnecting WebSocket client.

pub mod status;
pub mod types;
pub mod websocket;

pub use status::{FeedStatus, SharedFeedStatus};
pub use types::{parse_feed_message, FeedError, FeedMessage, PriceUpdatePayload, PRICE_UPDATE_V1};
pub use websocket::{spawn_feed_client, FeedClientConfig, FeedEvent, FeedHandle};
