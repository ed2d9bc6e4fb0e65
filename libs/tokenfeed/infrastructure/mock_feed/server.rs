//! Mock feed WebSocket server
//!
//! Broadcasts simulated `PRICE_UPDATE_V1` messages to every connected
//! client on a fixed interval.

use super::simulator::PriceSimulator;
use crate::infrastructure::client::feed::FeedMessage;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Buffered messages per client before a slow client starts lagging
const BROADCAST_CAPACITY: usize = 256;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct MockFeedServer {
    listener: TcpListener,
    tx: broadcast::Sender<String>,
}

impl MockFeedServer {
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(Self { listener, tx })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run until `shutdown_flag` is cleared
    pub async fn run(
        self,
        mut simulator: PriceSimulator,
        update_interval: Duration,
        shutdown_flag: Arc<AtomicBool>,
    ) {
        let MockFeedServer { listener, tx } = self;

        let accept_task = {
            let tx = tx.clone();
            let shutdown_flag = Arc::clone(&shutdown_flag);
            tokio::spawn(async move {
                accept_loop(listener, tx, shutdown_flag).await;
            })
        };

        let mut ticker = interval(update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        while shutdown_flag.load(Ordering::Acquire) {
            tokio::select! {
                _ = ticker.tick() => {
                    for update in simulator.tick() {
                        let message = FeedMessage::price_update(update.id.clone(), update.new_price);
                        match message.to_json() {
                            Ok(json) => {
                                // No subscribers is fine
                                let _ = tx.send(json);
                            }
                            Err(e) => {
                                warn!("[Mock Feed] Failed to encode update: {}", e);
                                continue;
                            }
                        }
                        info!(
                            "[PRICE_UPDATE] {}: ${:.8} -> ${:.8} ({:+.2}%)",
                            update.id, update.old_price, update.new_price, update.delta_percent
                        );
                    }
                }
                _ = tokio::time::sleep(SHUTDOWN_POLL_INTERVAL) => {}
            }
        }

        info!("[Mock Feed] Shutting down");
        accept_task.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    tx: broadcast::Sender<String>,
    shutdown_flag: Arc<AtomicBool>,
) {
    while shutdown_flag.load(Ordering::Acquire) {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let rx = tx.subscribe();
                let shutdown_flag = Arc::clone(&shutdown_flag);
                tokio::spawn(async move {
                    handle_client(stream, peer, rx, shutdown_flag).await;
                });
            }
            Err(e) => {
                warn!("[Mock Feed] Accept error: {}", e);
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    mut rx: broadcast::Receiver<String>,
    shutdown_flag: Arc<AtomicBool>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("[Mock Feed] Handshake with {} failed: {}", peer, e);
            return;
        }
    };

    info!("[Mock Feed] Client connected: {}", peer);
    let (mut write, mut read) = ws_stream.split();

    while shutdown_flag.load(Ordering::Acquire) {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(text) => {
                        if write.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("[Mock Feed] Client {} lagged, skipped {} updates", peer, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("[Mock Feed] Read error from {}: {}", peer, e);
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(SHUTDOWN_POLL_INTERVAL) => {}
        }
    }

    let _ = write.close().await;
    info!("[Mock Feed] Client disconnected: {}", peer);
}
