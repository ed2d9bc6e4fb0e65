//! Live Token Dashboard
//!
//! Orchestrator owning the store, the selectors and the series tracker.
//! Every state change (feed events, sort and filter commands, observation)
//! goes through a `&mut self` method here, which keeps event application
//! serialized.

use super::price_series::{now_ms, LivePriceSeries, PriceSeriesTracker};
use super::selectors::TokenSelectors;
use super::token_store::{create_shared_store, LoadState, SharedTokenStore, StoreStats};
use crate::domain::{
    flatten, normalize_snapshot, ChainFilter, PriceUpdate, RawTokensData, SortKey, TokenCategory,
    TokenView, VolumeModel,
};
use crate::infrastructure::client::snapshot::{BootstrapError, SnapshotSource};
use std::sync::Arc;
use tracing::{info, warn};

pub struct LiveTokenDashboard {
    store: SharedTokenStore,
    selectors: TokenSelectors,
    series: PriceSeriesTracker,
    observed: Option<String>,
}

impl Default for LiveTokenDashboard {
    fn default() -> Self {
        Self::new(VolumeModel::Hold)
    }
}

impl LiveTokenDashboard {
    pub fn new(volume_model: VolumeModel) -> Self {
        Self {
            store: create_shared_store(volume_model),
            selectors: TokenSelectors::new(),
            series: PriceSeriesTracker::new(),
            observed: None,
        }
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Normalize a raw snapshot and load it. `false` if already initialized.
    pub fn initialize(&mut self, data: &RawTokensData, default_category: Option<TokenCategory>) -> bool {
        let tokens = flatten(normalize_snapshot(data));
        self.store.write().initialize(tokens, default_category)
    }

    /// Fetch the snapshot from `source` and initialize
    ///
    /// Failures are recorded in the store's load state and returned.
    pub async fn bootstrap_from(&mut self, source: &dyn SnapshotSource) -> Result<usize, BootstrapError> {
        info!("[Bootstrap] Fetching snapshot from {}", source.describe());
        self.store.write().begin_loading();

        match source.fetch().await {
            Ok(data) => {
                self.initialize(&data, Some(TokenCategory::New));
                Ok(self.store.read().len())
            }
            Err(e) => {
                warn!("[Bootstrap] Failed: {}", e);
                self.store.write().fail_loading(e.to_string());
                Err(e)
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Apply one feed update, appending to the series if the token is observed
    pub fn apply_price_update(&mut self, update: &PriceUpdate) -> Option<TokenView> {
        let view = self.store.write().apply_update(update)?;
        self.series.on_price(&view.id, view.price, now_ms());
        Some(view)
    }

    /// Apply a bare price, as `update_price` on the store
    pub fn update_price(&mut self, id: &str, new_price: f64) -> Option<TokenView> {
        self.apply_price_update(&PriceUpdate::new(id, new_price))
    }

    pub fn sort(&mut self, key: SortKey) {
        self.store.write().sort(key);
    }

    pub fn set_chain_filter(&mut self, filter: ChainFilter) {
        self.store.write().set_chain_filter(filter);
    }

    /// Advance All -> BNB -> SOL -> All
    pub fn cycle_chain_filter(&mut self) -> ChainFilter {
        let mut store = self.store.write();
        let next = store.chain_filter().cycle();
        store.set_chain_filter(next);
        next
    }

    pub fn set_active_category(&mut self, category: Option<TokenCategory>) {
        self.store.write().set_active_category(category);
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Open the detail view of `id`, replacing any previously observed token
    pub fn observe(&mut self, id: &str) -> bool {
        if self.observed.as_deref() == Some(id) {
            return true;
        }

        let Some(price) = self.store.read().token(id).map(|t| t.price) else {
            return false;
        };

        self.stop_observing();
        if self.series.observe(id, price, now_ms()) {
            self.observed = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Close the detail view and discard its series
    pub fn stop_observing(&mut self) {
        if let Some(id) = self.observed.take() {
            self.series.unobserve(&id);
        }
    }

    pub fn observed_id(&self) -> Option<&str> {
        self.observed.as_deref()
    }

    pub fn observed_series(&self) -> Option<LivePriceSeries> {
        let id = self.observed.as_deref()?;
        self.series.snapshot(id)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn category_view(&self, category: TokenCategory) -> Arc<[TokenView]> {
        self.selectors.by_category(&self.store.read(), category)
    }

    pub fn sorted_tokens(&self) -> Arc<[TokenView]> {
        self.selectors.sorted_all(&self.store.read())
    }

    pub fn token(&self, id: &str) -> Option<TokenView> {
        self.selectors.by_id(&self.store.read(), id)
    }

    pub fn observed_token(&self) -> Option<TokenView> {
        self.token(self.observed.as_deref()?)
    }

    pub fn chain_filter(&self) -> ChainFilter {
        self.store.read().chain_filter()
    }

    pub fn sort_key(&self) -> SortKey {
        self.store.read().sort_key()
    }

    pub fn active_category(&self) -> Option<TokenCategory> {
        self.store.read().active_category()
    }

    pub fn load_state(&self) -> LoadState {
        self.store.read().load_state().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.store.read().is_initialized()
    }

    pub fn version(&self) -> u64 {
        self.store.read().version()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.read().stats()
    }

    pub fn selectors(&self) -> &TokenSelectors {
        &self.selectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::price_series::{INITIAL_POINTS, MAX_POINTS};
    use crate::domain::{Chain, Engagement, PriceDirection, RawToken};
    use async_trait::async_trait;

    fn raw(id: &str, chain: Chain, price: f64, market_cap: f64) -> RawToken {
        RawToken {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_string(),
            image: String::new(),
            price,
            market_cap,
            volume_24h: 10.0,
            change_1h: 0.0,
            change_24h: 0.0,
            chain,
            timestamp: String::new(),
            engagement: Engagement::default(),
            tx_count: 0,
            percentage: 0.0,
        }
    }

    fn snapshot() -> RawTokensData {
        RawTokensData {
            new: vec![raw("n1", Chain::SOL, 1.0, 100.0), raw("n2", Chain::BNB, 2.0, 200.0)],
            final_stretch: vec![raw("f1", Chain::SOL, 3.0, 300.0)],
            migrated: vec![raw("m1", Chain::BNB, 4.0, 400.0)],
        }
    }

    struct StaticSource(Option<RawTokensData>);

    #[async_trait]
    impl SnapshotSource for StaticSource {
        async fn fetch(&self) -> Result<RawTokensData, BootstrapError> {
            self.0.clone().ok_or(BootstrapError::Empty)
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    #[test]
    fn test_initialize_and_views() {
        let mut dashboard = LiveTokenDashboard::default();
        assert!(dashboard.category_view(TokenCategory::New).is_empty());

        assert!(dashboard.initialize(&snapshot(), Some(TokenCategory::New)));
        assert!(!dashboard.initialize(&snapshot(), None));

        let ids: Vec<String> = dashboard
            .category_view(TokenCategory::New)
            .iter()
            .map(|v| v.id.clone())
            .collect();
        assert_eq!(ids, vec!["n2", "n1"]);
        assert_eq!(dashboard.token("f1").unwrap().category, TokenCategory::Final);

        dashboard.set_chain_filter(ChainFilter::SOL);
        assert_eq!(dashboard.category_view(TokenCategory::New).len(), 1);
        assert_eq!(dashboard.cycle_chain_filter(), ChainFilter::All);
    }

    #[test]
    fn test_observation_lifecycle() {
        let mut dashboard = LiveTokenDashboard::default();
        dashboard.initialize(&snapshot(), None);

        assert!(!dashboard.observe("missing"));
        assert!(dashboard.observe("n1"));
        let series = dashboard.observed_series().unwrap();
        assert_eq!(series.series.len(), INITIAL_POINTS + 1);
        assert_eq!(series.current_price, 1.0);

        dashboard.update_price("n1", 1.5).unwrap();
        dashboard.update_price("n2", 9.0).unwrap();
        let series = dashboard.observed_series().unwrap();
        assert_eq!(series.series.len(), INITIAL_POINTS + 2);
        assert_eq!(series.current_price, 1.5);
        assert!(series.is_up);
        assert_eq!(
            series.series.last().unwrap().direction,
            PriceDirection::Up
        );

        assert!(dashboard.observe("n2"));
        assert_eq!(dashboard.observed_id(), Some("n2"));
        assert_eq!(
            dashboard.observed_series().unwrap().series.len(),
            INITIAL_POINTS + 1
        );

        dashboard.stop_observing();
        assert!(dashboard.observed_series().is_none());
        assert!(dashboard.observed_token().is_none());
    }

    #[test]
    fn test_observed_series_stays_bounded() {
        let mut dashboard = LiveTokenDashboard::default();
        dashboard.initialize(&snapshot(), None);
        dashboard.observe("m1");

        for i in 0..150 {
            dashboard.update_price("m1", 4.0 + (i + 1) as f64 * 0.01);
        }
        let series = dashboard.observed_series().unwrap();
        assert_eq!(series.series.len(), MAX_POINTS);
    }

    #[tokio::test]
    async fn test_bootstrap_success_and_failure() {
        let mut failing = LiveTokenDashboard::default();
        let err = failing.bootstrap_from(&StaticSource(None)).await;
        assert!(err.is_err());
        assert!(failing.load_state().error().is_some());
        assert!(!failing.is_initialized());

        let mut dashboard = LiveTokenDashboard::default();
        let count = dashboard
            .bootstrap_from(&StaticSource(Some(snapshot())))
            .await
            .unwrap();
        assert_eq!(count, 4);
        assert_eq!(dashboard.load_state(), LoadState::Ready);
        assert_eq!(dashboard.active_category(), Some(TokenCategory::New));
    }
}
