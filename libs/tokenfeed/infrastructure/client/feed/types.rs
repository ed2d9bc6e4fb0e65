//! Feed wire types
//!
//! Strict decoding of feed frames. Anything that is not a well formed
//! `PRICE_UPDATE_V1` with a string id and a positive finite price is
//! rejected here, before it reaches the store.

use crate::domain::PriceUpdate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message type tag for price updates
pub const PRICE_UPDATE_V1: &str = "PRICE_UPDATE_V1";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Empty token id")]
    EmptyId,

    #[error("Invalid price for {id}: {price}")]
    InvalidPrice { id: String, price: f64 },

    #[error("Unsupported frame: {0}")]
    UnsupportedFrame(&'static str),

    #[error("Connection failed: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Payload of a `PRICE_UPDATE_V1` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdatePayload {
    pub id: String,
    pub price: f64,
    /// Optional true 24h volume
    #[serde(rename = "volume24h", default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
}

/// Every message the feed may carry
///
/// Example JSON:
/// ```json
/// {"type": "PRICE_UPDATE_V1", "payload": {"id": "tok-001", "price": 0.00043}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum FeedMessage {
    #[serde(rename = "PRICE_UPDATE_V1")]
    PriceUpdateV1(PriceUpdatePayload),
}

impl FeedMessage {
    pub fn price_update(id: impl Into<String>, price: f64) -> Self {
        FeedMessage::PriceUpdateV1(PriceUpdatePayload {
            id: id.into(),
            price,
            volume_24h: None,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

/// Decode and validate one text frame
pub fn parse_feed_message(text: &str) -> Result<PriceUpdate> {
    let message: FeedMessage =
        serde_json::from_str(text).map_err(|e| FeedError::Malformed(e.to_string()))?;

    match message {
        FeedMessage::PriceUpdateV1(payload) => {
            if payload.id.is_empty() {
                return Err(FeedError::EmptyId);
            }
            if !payload.price.is_finite() || payload.price <= 0.0 {
                return Err(FeedError::InvalidPrice {
                    id: payload.id,
                    price: payload.price,
                });
            }

            let mut update = PriceUpdate::new(payload.id, payload.price);
            if let Some(volume) = payload.volume_24h.filter(|v| v.is_finite() && *v >= 0.0) {
                update = update.with_volume(volume);
            }
            Ok(update)
        }
    }
}
