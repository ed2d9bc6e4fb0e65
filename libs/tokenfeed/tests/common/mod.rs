//! Common test utilities for tokenfeed integration tests
//!
//! Token fixtures plus a scripted WebSocket server standing in for the
//! price feed.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokenfeed::domain::{Chain, Engagement, RawToken, RawTokensData};
use tokenfeed::infrastructure::client::feed::{FeedEvent, FeedHandle};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

// =============================================================================
// Token fixtures
// =============================================================================

pub fn raw_token(id: &str, chain: Chain, price: f64, market_cap: f64) -> RawToken {
    RawToken {
        id: id.to_string(),
        name: format!("Token {}", id),
        symbol: id.to_uppercase(),
        image: String::new(),
        price,
        market_cap,
        volume_24h: market_cap / 10.0,
        change_1h: 0.0,
        change_24h: 0.0,
        chain,
        timestamp: "1m".to_string(),
        engagement: Engagement::default(),
        tx_count: 0,
        percentage: 0.0,
    }
}

/// Two tokens per category across both chains
pub fn sample_snapshot() -> RawTokensData {
    RawTokensData {
        new: vec![
            raw_token("a", Chain::SOL, 10.0, 1_000.0),
            raw_token("b", Chain::BNB, 2.0, 5_000.0),
        ],
        final_stretch: vec![
            raw_token("c", Chain::SOL, 0.5, 20_000.0),
            raw_token("d", Chain::BNB, 1.0, 10_000.0),
        ],
        migrated: vec![
            raw_token("e", Chain::BNB, 100.0, 900_000.0),
            raw_token("f", Chain::SOL, 3.0, 300_000.0),
        ],
    }
}

// =============================================================================
// Scripted feed server
// =============================================================================

/// Mock WebSocket server sending a fixed script of frames to every client
pub struct MockWsServer {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Start a server. With `close_after` set, each connection is closed
    /// once the script has been sent; otherwise it is held open.
    pub async fn start(script: Vec<String>, close_after: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());

        let connections_clone = connections.clone();
        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                connections_clone.fetch_add(1, Ordering::SeqCst);
                                let script = script.clone();
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, script, close_after, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            connections,
            shutdown,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        script: Vec<String>,
        close_after: bool,
        shutdown: Arc<Notify>,
    ) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        for frame in script {
            if write.send(Message::Text(frame)).await.is_err() {
                return;
            }
        }

        if close_after {
            let _ = write.send(Message::Close(None)).await;
            return;
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) if msg.is_close() => break,
                        Some(Ok(_)) => {}
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of accepted connections so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A URL nothing is listening on
pub async fn unreachable_ws_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

/// Drain feed events until `done` holds for the collected list or the
/// timeout elapses
pub async fn collect_events<F>(handle: &FeedHandle, timeout: Duration, done: F) -> Vec<FeedEvent>
where
    F: Fn(&[FeedEvent]) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    let mut events = Vec::new();

    while tokio::time::Instant::now() < deadline {
        events.extend(handle.drain());
        if done(&events) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    events
}

pub fn price_updates(events: &[FeedEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, FeedEvent::PriceUpdate(_)))
        .count()
}
