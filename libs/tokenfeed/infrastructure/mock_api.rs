//! Mock token REST API
//!
//! Serves the fixture snapshot as `GET /tokens`, wrapped in the
//! `{version, timestamp, data}` envelope, and a liveness check on
//! `GET /health`. `/tokens` answers after a random delay so the dashboard's
//! loading state is visible.

use crate::domain::{RawTokensData, SnapshotResponse};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Version string reported in every snapshot envelope
pub const API_VERSION: &str = "1.0.0";

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
}

/// Shared handler state
#[derive(Clone)]
pub struct MockApiState {
    data: Arc<RawTokensData>,
    min_latency_ms: u64,
    max_latency_ms: u64,
}

impl MockApiState {
    /// State that answers immediately
    pub fn new(data: RawTokensData) -> Self {
        Self {
            data: Arc::new(data),
            min_latency_ms: 0,
            max_latency_ms: 0,
        }
    }

    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_latency_ms = min_ms.min(max_ms);
        self.max_latency_ms = max_ms;
        self
    }

    fn latency(&self) -> Duration {
        if self.max_latency_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::thread_rng().gen_range(self.min_latency_ms..=self.max_latency_ms);
        Duration::from_millis(ms)
    }
}

pub fn router(state: MockApiState) -> Router {
    Router::new()
        .route("/tokens", get(tokens_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve until `shutdown_flag` is cleared
pub async fn serve(
    listener: TcpListener,
    state: MockApiState,
    shutdown_flag: Arc<AtomicBool>,
) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_flag))
        .await?;
    info!("[Mock API] Server stopped");
    Ok(())
}

async fn wait_for_shutdown(shutdown_flag: Arc<AtomicBool>) {
    while shutdown_flag.load(Ordering::Acquire) {
        tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
    }
}

async fn tokens_handler(State(state): State<MockApiState>) -> Json<SnapshotResponse> {
    let delay = state.latency();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    debug!(
        "[Mock API] GET /tokens -> {} tokens after {}ms",
        state.data.len(),
        delay.as_millis()
    );

    Json(SnapshotResponse {
        version: API_VERSION.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        data: state.data.as_ref().clone(),
    })
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().timestamp_millis(),
    })
}
