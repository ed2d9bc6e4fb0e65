//! Token Feed
//!
//! Live token state core for the mock trading dashboard: a normalized token
//! store fed by a price-update WebSocket feed, memoized read views and a
//! bounded price series for the token currently on screen.

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used items
pub use application::{
    LivePriceSeries, LiveTokenDashboard, PricePoint, PriceSeriesTracker, SharedTokenStore,
    TokenSelectors, TokenStore,
};
pub use domain::{
    Chain, ChainFilter, PriceDirection, PriceUpdate, RawToken, RawTokensData, SortKey, Token,
    TokenCategory, TokenRuntime, TokenView,
};
pub use infrastructure::{init_file_tracing, init_tracing, DashboardConfig, ShutdownManager};
