//! Domain layer
//!
//! Token types and the pure normalization rules applied to them.

pub mod normalizer;
pub mod token;

pub use normalizer::{
    apply_price_update, flatten, initial_runtime, normalize, normalize_snapshot, validate_token,
    NormalizeError, PriceUpdateResult, VolumeJitter, VolumeModel, CHANGE_1H_WEIGHT,
    CHANGE_24H_WEIGHT, CHANGE_BOUND,
};
pub use token::{
    Chain, ChainFilter, Engagement, PriceDirection, PriceUpdate, RawToken, RawTokensData, SortKey,
    SnapshotResponse, Token, TokenCategory, TokenRuntime, TokenView, TokensByCategory,
};
