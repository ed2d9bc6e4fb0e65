//! Application Layer
//!
//! The token store, its read views, the live price series and the
//! orchestrator that serializes every state change. The terminal
//! visualizer renders on top of it.

pub mod chart;
pub mod dashboard;
pub mod price_series;
pub mod selectors;
pub mod token_store;
pub mod visualizer;

pub use chart::{format_price, price_domain, PriceDomain};
pub use dashboard::LiveTokenDashboard;
pub use price_series::{
    generate_initial_history, LivePriceSeries, PricePoint, PriceSeries, PriceSeriesTracker,
    INITIAL_POINTS, MAX_POINTS,
};
pub use selectors::{filter_by_direction, filter_min_market_cap, filter_min_volume, TokenSelectors};
pub use token_store::{create_shared_store, LoadState, SharedTokenStore, StoreStats, TokenStore};
