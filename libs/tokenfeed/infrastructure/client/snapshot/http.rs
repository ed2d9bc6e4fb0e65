//! Token API client

use super::{BootstrapError, Result, SnapshotSource};
use crate::domain::{RawTokensData, SnapshotResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// `GET {base_url}/tokens`
pub struct HttpSnapshotSource {
    base_url: String,
    client: Client,
}

impl HttpSnapshotSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> String {
        format!("{}/tokens", self.base_url)
    }

    /// Fetch the full envelope, including version and server timestamp
    pub async fn fetch_envelope(&self) -> Result<SnapshotResponse> {
        let url = self.url();
        debug!("[Bootstrap] GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BootstrapError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let envelope: SnapshotResponse = serde_json::from_str(&text)
            .map_err(|e| BootstrapError::DeserializeFailed(e.to_string()))?;

        info!(
            "[Bootstrap] Snapshot v{} with {} tokens from {}",
            envelope.version,
            envelope.data.len(),
            url
        );
        Ok(envelope)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<RawTokensData> {
        let envelope = self.fetch_envelope().await?;
        if envelope.data.is_empty() {
            return Err(BootstrapError::Empty);
        }
        Ok(envelope.data)
    }

    fn describe(&self) -> String {
        self.url()
    }
}
