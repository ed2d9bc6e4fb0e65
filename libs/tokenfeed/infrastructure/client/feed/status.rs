//! Feed connection status
//!
//! Lock-free counters shared between the feed task and the UI.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

pub type SharedFeedStatus = Arc<FeedStatus>;

#[derive(Debug, Default)]
pub struct FeedStatus {
    connected: AtomicBool,
    gave_up: AtomicBool,
    reconnect_attempts: AtomicU32,
    received: AtomicU64,
    dropped: AtomicU64,
    last_message_ms: AtomicI64,
}

impl FeedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    #[inline]
    pub fn has_given_up(&self) -> bool {
        self.gave_up.load(Ordering::Acquire)
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::Relaxed)
    }

    /// Valid updates forwarded
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Frames dropped by the boundary parser
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Epoch millis of the last valid update, 0 if none yet
    pub fn last_message_ms(&self) -> i64 {
        self.last_message_ms.load(Ordering::Relaxed)
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub(crate) fn set_gave_up(&self) {
        self.connected.store(false, Ordering::Release);
        self.gave_up.store(true, Ordering::Release);
    }

    pub(crate) fn set_reconnect_attempts(&self, attempts: u32) {
        self.reconnect_attempts.store(attempts, Ordering::Relaxed);
    }

    pub(crate) fn record_received(&self, now_ms: i64) {
        self.received.fetch_add(1, Ordering::Relaxed);
        self.last_message_ms.store(now_ms, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Short label for status bars
    pub fn label(&self) -> &'static str {
        if self.is_connected() {
            "LIVE"
        } else if self.has_given_up() {
            "OFFLINE"
        } else if self.reconnect_attempts() > 0 {
            "RECONNECTING"
        } else {
            "CONNECTING"
        }
    }
}
