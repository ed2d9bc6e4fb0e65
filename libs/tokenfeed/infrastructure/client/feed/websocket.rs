//! WebSocket feed client
//!
//! Follows the price-update feed with automatic reconnection. Decoded
//! updates and connection events are forwarded on an unbounded crossbeam
//! channel; the receiver is the single serialized application path.

use super::status::{FeedStatus, SharedFeedStatus};
use super::types::parse_feed_message;
use crate::application::price_series::now_ms;
use crate::domain::PriceUpdate;
use crate::infrastructure::config::FeedConfig;
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// How often an idle connection re-checks the shutdown flag
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

// =============================================================================
// Config / Events
// =============================================================================

#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    pub url: String,
    pub reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
}

impl FeedClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: Duration::from_millis(3_000),
            max_reconnect_attempts: 10,
        }
    }
}

impl From<&FeedConfig> for FeedClientConfig {
    fn from(config: &FeedConfig) -> Self {
        Self {
            url: config.ws_url.clone(),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            max_reconnect_attempts: config.max_reconnect_attempts,
        }
    }
}

/// Events delivered to the consumer
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Connected,
    Disconnected,
    /// Reconnecting (attempt number)
    Reconnecting(u32),
    /// Reconnect attempts exhausted, the client has stopped
    GaveUp,
    PriceUpdate(PriceUpdate),
}

/// Handle to a running feed client
pub struct FeedHandle {
    pub events: Receiver<FeedEvent>,
    pub status: SharedFeedStatus,
    pub task: JoinHandle<()>,
}

impl FeedHandle {
    /// Drain every event currently queued
    pub fn drain(&self) -> Vec<FeedEvent> {
        self.events.try_iter().collect()
    }
}

// =============================================================================
// Spawn
// =============================================================================

/// Spawn the feed client on the current tokio runtime
///
/// The client runs until `shutdown_flag` is cleared, the consumer drops the
/// event receiver, or reconnect attempts are exhausted.
pub fn spawn_feed_client(config: FeedClientConfig, shutdown_flag: Arc<AtomicBool>) -> FeedHandle {
    let (tx, rx) = unbounded();
    let status: SharedFeedStatus = Arc::new(FeedStatus::new());

    info!("[Feed WS] Starting feed client for {}", config.url);

    let task = {
        let status = Arc::clone(&status);
        tokio::spawn(async move {
            run_feed_client(config, status, tx, shutdown_flag).await;
        })
    };

    FeedHandle {
        events: rx,
        status,
        task,
    }
}

// =============================================================================
// Reconnect loop
// =============================================================================

/// Why a single connection ended
enum ConnectionEnd {
    Shutdown,
    ConsumerGone,
    Lost,
}

async fn run_feed_client(
    config: FeedClientConfig,
    status: SharedFeedStatus,
    tx: Sender<FeedEvent>,
    shutdown_flag: Arc<AtomicBool>,
) {
    let mut reconnect_attempts: u32 = 0;

    'reconnect: loop {
        if !shutdown_flag.load(Ordering::Acquire) {
            info!("[Feed WS] Shutdown signal received before connect");
            break 'reconnect;
        }

        if reconnect_attempts > 0 {
            info!(
                "[Feed WS] Reconnection attempt {} of {}",
                reconnect_attempts, config.max_reconnect_attempts
            );
            status.set_reconnect_attempts(reconnect_attempts);
            if tx.send(FeedEvent::Reconnecting(reconnect_attempts)).is_err() {
                break 'reconnect;
            }
            if !interruptible_sleep(config.reconnect_delay, &shutdown_flag).await {
                break 'reconnect;
            }
        }

        let ws_stream = match connect_async(config.url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                warn!("[Feed WS] Failed to connect: {}", e);
                reconnect_attempts += 1;
                if reconnect_attempts >= config.max_reconnect_attempts {
                    give_up(&config, &status, &tx);
                    break 'reconnect;
                }
                continue 'reconnect;
            }
        };

        info!("[Feed WS] Connected to {}", config.url);
        status.set_connected(true);
        if tx.send(FeedEvent::Connected).is_err() {
            break 'reconnect;
        }

        let connection_start = Instant::now();
        let (_write, mut read) = ws_stream.split();
        let mut end = ConnectionEnd::Lost;

        loop {
            if !shutdown_flag.load(Ordering::Acquire) {
                info!("[Feed WS] Shutdown signal received");
                end = ConnectionEnd::Shutdown;
                break;
            }

            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !forward_frame(&text, &status, &tx) {
                                end = ConnectionEnd::ConsumerGone;
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            warn!("[Feed WS] Server closed the connection");
                            break;
                        }
                        Some(Ok(Message::Binary(_))) => {
                            status.record_dropped();
                            debug!("[Feed WS] Dropping binary frame");
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("[Feed WS] Read error: {}", e);
                            break;
                        }
                        None => {
                            warn!("[Feed WS] Stream ended");
                            break;
                        }
                    }
                }
                _ = sleep(SHUTDOWN_POLL_INTERVAL) => {}
            }
        }

        status.set_connected(false);

        match end {
            ConnectionEnd::Shutdown | ConnectionEnd::ConsumerGone => break 'reconnect,
            ConnectionEnd::Lost => {
                if tx.send(FeedEvent::Disconnected).is_err() {
                    break 'reconnect;
                }

                let connection_duration = connection_start.elapsed();
                if connection_duration > config.reconnect_delay * 2 {
                    reconnect_attempts = 0;
                    info!(
                        "[Feed WS] Connection was stable for {:.1}s, resetting reconnect counter",
                        connection_duration.as_secs_f64()
                    );
                }

                reconnect_attempts += 1;
                if reconnect_attempts >= config.max_reconnect_attempts {
                    give_up(&config, &status, &tx);
                    break 'reconnect;
                }
            }
        }
    }

    status.set_connected(false);
    info!("[Feed WS] Feed client stopped");
}

/// Decode one frame and forward it. Returns false once the consumer is gone.
fn forward_frame(text: &str, status: &FeedStatus, tx: &Sender<FeedEvent>) -> bool {
    match parse_feed_message(text) {
        Ok(update) => {
            status.record_received(now_ms());
            tx.send(FeedEvent::PriceUpdate(update)).is_ok()
        }
        Err(e) => {
            status.record_dropped();
            debug!("[Feed WS] Dropping frame: {}", e);
            true
        }
    }
}

fn give_up(config: &FeedClientConfig, status: &FeedStatus, tx: &Sender<FeedEvent>) {
    warn!(
        "[Feed WS] Exceeded max reconnection attempts ({}), giving up",
        config.max_reconnect_attempts
    );
    status.set_gave_up();
    let _ = tx.send(FeedEvent::GaveUp);
}

/// Sleep in short slices, returning false if shutdown was requested
async fn interruptible_sleep(duration: Duration, shutdown_flag: &AtomicBool) -> bool {
    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        if !shutdown_flag.load(Ordering::Acquire) {
            return false;
        }
        let slice = SHUTDOWN_POLL_INTERVAL.min(duration - elapsed);
        sleep(slice).await;
        elapsed += slice;
    }
    shutdown_flag.load(Ordering::Acquire)
}
