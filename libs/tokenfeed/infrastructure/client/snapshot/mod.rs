//! Snapshot bootstrap
//!
//! The initial token set comes either from the token API or from a local
//! JSON fixture. Both sit behind `SnapshotSource` and yield the same
//! `RawTokensData`.

pub mod fixture;
pub mod http;

pub use fixture::FixtureSnapshotSource;
pub use http::HttpSnapshotSource;

use crate::domain::RawTokensData;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Failed to read fixture {path}: {source}")]
    FixtureRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Snapshot contains no tokens")]
    Empty,
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Where the initial token snapshot comes from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the raw snapshot
    async fn fetch(&self) -> Result<RawTokensData>;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;
}
