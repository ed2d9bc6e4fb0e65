//! Token domain types
//!
//! Raw snapshot records as delivered by the token API, the normalized
//! `Token` record, its volatile `TokenRuntime` projection and the combined
//! `TokenView` handed to the presentation layer.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

// =============================================================================
// TokenCategory - Lifecycle bucket
// =============================================================================

/// Lifecycle bucket of a token, decided once at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    New,
    Final,
    Migrated,
}

impl TokenCategory {
    /// Wire name of the category (e.g., "migrated")
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::New => "new",
            TokenCategory::Final => "final",
            TokenCategory::Migrated => "migrated",
        }
    }

    /// Column title used by the dashboard
    pub fn title(&self) -> &'static str {
        match self {
            TokenCategory::New => "New Pairs",
            TokenCategory::Final => "Final Stretch",
            TokenCategory::Migrated => "Migrated",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [TokenCategory] {
        &[
            TokenCategory::New,
            TokenCategory::Final,
            TokenCategory::Migrated,
        ]
    }
}

impl std::fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Chain / ChainFilter
// =============================================================================

/// Originating network of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    BNB,
    SOL,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::BNB => "BNB",
            Chain::SOL => "SOL",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chain filter applied by the category views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChainFilter {
    #[default]
    All,
    BNB,
    SOL,
}

impl ChainFilter {
    /// Whether a token on `chain` passes this filter
    pub fn matches(&self, chain: Chain) -> bool {
        match self {
            ChainFilter::All => true,
            ChainFilter::BNB => chain == Chain::BNB,
            ChainFilter::SOL => chain == Chain::SOL,
        }
    }

    /// Next filter in the All -> BNB -> SOL cycle
    pub fn cycle(&self) -> Self {
        match self {
            ChainFilter::All => ChainFilter::BNB,
            ChainFilter::BNB => ChainFilter::SOL,
            ChainFilter::SOL => ChainFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFilter::All => "All",
            ChainFilter::BNB => "BNB",
            ChainFilter::SOL => "SOL",
        }
    }
}

impl std::fmt::Display for ChainFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// PriceDirection
// =============================================================================

/// Direction of the most recent price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Up,
    Down,
    #[default]
    Neutral,
}

impl PriceDirection {
    /// Compare a new price against the previous one. Equality is neutral.
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            PriceDirection::Up
        } else if current < previous {
            PriceDirection::Down
        } else {
            PriceDirection::Neutral
        }
    }
}

// =============================================================================
// SortKey
// =============================================================================

/// Field used by an explicit sort request. All orders are descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    MarketCap,
    Volume,
    Change1h,
    Change24h,
}

impl SortKey {
    /// Value of this field on a token
    pub fn value(&self, token: &Token) -> f64 {
        match self {
            SortKey::MarketCap => token.market_cap,
            SortKey::Volume => token.volume_24h,
            SortKey::Change1h => token.change_1h,
            SortKey::Change24h => token.change_24h,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::MarketCap => "Market Cap",
            SortKey::Volume => "Volume",
            SortKey::Change1h => "1h %",
            SortKey::Change24h => "24h %",
        }
    }

    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::MarketCap,
            SortKey::Volume,
            SortKey::Change1h,
            SortKey::Change24h,
        ]
    }
}

// =============================================================================
// Raw snapshot records
// =============================================================================

/// Social engagement counters shown next to a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default)]
    pub person: u64,
    #[serde(default)]
    pub globe: u64,
    #[serde(default)]
    pub search: u64,
    #[serde(default)]
    pub doc: u64,
    #[serde(default)]
    pub crown: u64,
}

/// Raw token record as served by `GET /tokens`
///
/// Example JSON:
/// ```json
/// {
///     "id": "tok-001",
///     "name": "Pepe Classic",
///     "symbol": "PEPEC",
///     "image": "https://example.invalid/pepec.png",
///     "price": 0.00042,
///     "marketCap": 420000,
///     "volume24h": 51000,
///     "change1h": 3.2,
///     "change24h": -7.5,
///     "chain": "SOL",
///     "timestamp": "2m",
///     "engagement": { "person": 12, "globe": 3, "search": 0, "doc": 1, "crown": 0 },
///     "txCount": 87,
///     "percentage": 12
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToken {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    #[serde(rename = "change1h")]
    pub change_1h: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub chain: Chain,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub engagement: Engagement,
    #[serde(rename = "txCount", default)]
    pub tx_count: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// Raw snapshot grouped by category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTokensData {
    #[serde(default)]
    pub new: Vec<RawToken>,
    #[serde(rename = "final", default)]
    pub final_stretch: Vec<RawToken>,
    #[serde(default)]
    pub migrated: Vec<RawToken>,
}

impl RawTokensData {
    /// Raw records of one category
    pub fn category(&self, category: TokenCategory) -> &[RawToken] {
        match category {
            TokenCategory::New => &self.new,
            TokenCategory::Final => &self.final_stretch,
            TokenCategory::Migrated => &self.migrated,
        }
    }

    /// Total number of raw records across categories
    pub fn len(&self) -> usize {
        self.new.len() + self.final_stretch.len() + self.migrated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Envelope returned by the token API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub version: String,
    pub timestamp: i64,
    pub data: RawTokensData,
}

// =============================================================================
// Token / TokenRuntime / TokenView
// =============================================================================

/// Normalized token record. Replaced wholesale on every price update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub change_1h: f64,
    pub change_24h: f64,
    pub category: TokenCategory,
    pub chain: Chain,
    pub timestamp: String,
    pub engagement: Engagement,
    pub tx_count: u64,
    pub percentage: f64,
}

/// Volatile per-token state derived on every price update
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenRuntime {
    pub prev_price: f64,
    pub price_direction: PriceDirection,
}

/// Normalized tokens grouped by category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokensByCategory {
    pub new: Vec<Token>,
    pub final_stretch: Vec<Token>,
    pub migrated: Vec<Token>,
}

impl TokensByCategory {
    pub fn category(&self, category: TokenCategory) -> &[Token] {
        match category {
            TokenCategory::New => &self.new,
            TokenCategory::Final => &self.final_stretch,
            TokenCategory::Migrated => &self.migrated,
        }
    }
}

/// Combined Token + Runtime view handed to readers
///
/// The token half is shared with the store, so a row whose token was not
/// touched by an update keeps pointing at the same allocation across
/// store versions.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenView {
    pub token: Arc<Token>,
    pub runtime: TokenRuntime,
}

impl TokenView {
    pub fn new(token: Arc<Token>, runtime: TokenRuntime) -> Self {
        Self { token, runtime }
    }

    pub fn prev_price(&self) -> f64 {
        self.runtime.prev_price
    }

    pub fn price_direction(&self) -> PriceDirection {
        self.runtime.price_direction
    }

    /// Whether both views share the same token allocation
    pub fn same_token(&self, other: &TokenView) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

impl Deref for TokenView {
    type Target = Token;

    fn deref(&self) -> &Token {
        &self.token
    }
}

// =============================================================================
// PriceUpdate - inbound event
// =============================================================================

/// A validated price-update event from the feed
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub token_id: String,
    pub new_price: f64,
    /// True 24h volume, when the feed reports one
    pub volume_24h: Option<f64>,
}

impl PriceUpdate {
    pub fn new(token_id: impl Into<String>, new_price: f64) -> Self {
        Self {
            token_id: token_id.into(),
            new_price,
            volume_24h: None,
        }
    }

    pub fn with_volume(mut self, volume_24h: f64) -> Self {
        self.volume_24h = Some(volume_24h);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
