//! Read views over the token store
//!
//! Category lists are memoized on (store version, chain filter, category).
//! A repeated lookup with an unchanged key hands back the same `Arc`, so the
//! renderer can compare pointers to skip redrawing.

use super::token_store::TokenStore;
use crate::domain::{ChainFilter, PriceDirection, TokenCategory, TokenView};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Memoized list keyed by filter params
type CacheKey = (Option<TokenCategory>, ChainFilter);

#[derive(Debug, Clone)]
struct CachedView {
    version: u64,
    rows: Arc<[TokenView]>,
}

// =============================================================================
// TokenSelectors
// =============================================================================

/// Memoizing selectors. One instance per store.
#[derive(Debug, Default)]
pub struct TokenSelectors {
    cache: Mutex<HashMap<CacheKey, CachedView>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TokenSelectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of `category` passing the store's chain filter, in sort order
    pub fn by_category(&self, store: &TokenStore, category: TokenCategory) -> Arc<[TokenView]> {
        self.memoized(store, Some(category))
    }

    /// Every consistent token in sort order, chain filter applied
    pub fn sorted_all(&self, store: &TokenStore) -> Arc<[TokenView]> {
        self.memoized(store, None)
    }

    /// Combined view for one id
    pub fn by_id(&self, store: &TokenStore, id: &str) -> Option<TokenView> {
        store.view(id)
    }

    /// id -> combined view for every consistent token, unfiltered
    pub fn with_runtime(&self, store: &TokenStore) -> HashMap<String, TokenView> {
        store
            .tokens()
            .keys()
            .filter_map(|id| store.view(id).map(|view| (id.clone(), view)))
            .collect()
    }

    fn memoized(&self, store: &TokenStore, category: Option<TokenCategory>) -> Arc<[TokenView]> {
        let key = (category, store.chain_filter());
        let version = store.version();

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.get(&key) {
            if cached.version == version {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(&cached.rows);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let rows: Arc<[TokenView]> = compute_view(store, category).into();
        cache.insert(
            key,
            CachedView {
                version,
                rows: Arc::clone(&rows),
            },
        );
        rows
    }

    /// Drop every cached list
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// (hits, misses) since creation
    pub fn cache_stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

fn compute_view(store: &TokenStore, category: Option<TokenCategory>) -> Vec<TokenView> {
    if !store.is_initialized() {
        return Vec::new();
    }

    let filter = store.chain_filter();
    store
        .sorted_ids()
        .iter()
        .filter_map(|id| store.view(id))
        .filter(|view| category.map_or(true, |c| view.category == c))
        .filter(|view| filter.matches(view.chain))
        .collect()
}

// =============================================================================
// List helpers
// =============================================================================

/// Keep rows whose last move went `direction`
pub fn filter_by_direction(rows: &[TokenView], direction: PriceDirection) -> Vec<TokenView> {
    rows.iter()
        .filter(|view| view.price_direction() == direction)
        .cloned()
        .collect()
}

pub fn filter_min_market_cap(rows: &[TokenView], min: f64) -> Vec<TokenView> {
    rows.iter()
        .filter(|view| view.market_cap >= min)
        .cloned()
        .collect()
}

pub fn filter_min_volume(rows: &[TokenView], min: f64) -> Vec<TokenView> {
    rows.iter()
        .filter(|view| view.volume_24h >= min)
        .cloned()
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chain, Engagement, SortKey, Token};

    fn make_token(id: &str, category: TokenCategory, chain: Chain, market_cap: f64) -> Token {
        Token {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_string(),
            image: String::new(),
            price: 1.0,
            market_cap,
            volume_24h: market_cap / 10.0,
            change_1h: 0.0,
            change_24h: 0.0,
            category,
            chain,
            timestamp: String::new(),
            engagement: Engagement::default(),
            tx_count: 0,
            percentage: 0.0,
        }
    }

    fn store() -> TokenStore {
        let mut store = TokenStore::new();
        store.initialize(
            vec![
                make_token("n-bnb", TokenCategory::New, Chain::BNB, 300.0),
                make_token("n-sol", TokenCategory::New, Chain::SOL, 400.0),
                make_token("f-sol", TokenCategory::Final, Chain::SOL, 500.0),
                make_token("m-bnb", TokenCategory::Migrated, Chain::BNB, 100.0),
            ],
            None,
        );
        store
    }

    fn ids(rows: &[TokenView]) -> Vec<&str> {
        rows.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_uninitialized_store_gives_empty_views() {
        let selectors = TokenSelectors::new();
        let store = TokenStore::new();
        assert!(selectors.by_category(&store, TokenCategory::New).is_empty());
        assert!(selectors.sorted_all(&store).is_empty());
        assert!(selectors.by_id(&store, "x").is_none());
        assert!(selectors.with_runtime(&store).is_empty());
    }

    #[test]
    fn test_by_category_filters_and_orders() {
        let selectors = TokenSelectors::new();
        let mut store = store();

        let rows = selectors.by_category(&store, TokenCategory::New);
        assert_eq!(ids(&rows), vec!["n-sol", "n-bnb"]);

        store.set_chain_filter(ChainFilter::BNB);
        let rows = selectors.by_category(&store, TokenCategory::New);
        assert_eq!(ids(&rows), vec!["n-bnb"]);

        let rows = selectors.by_category(&store, TokenCategory::Final);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_memoized_rows_are_pointer_stable() {
        let selectors = TokenSelectors::new();
        let mut store = store();

        let first = selectors.by_category(&store, TokenCategory::New);
        let second = selectors.by_category(&store, TokenCategory::New);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(selectors.cache_stats(), (1, 1));

        store.update_price("n-bnb", 2.0);
        let third = selectors.by_category(&store, TokenCategory::New);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third[1].price, 2.0);
    }

    #[test]
    fn test_cache_survives_filter_round_trip() {
        let selectors = TokenSelectors::new();
        let mut store = store();

        let all = selectors.by_category(&store, TokenCategory::New);
        store.set_chain_filter(ChainFilter::SOL);
        let sol = selectors.by_category(&store, TokenCategory::New);
        assert_eq!(ids(&sol), vec!["n-sol"]);
        store.set_chain_filter(ChainFilter::All);
        let again = selectors.by_category(&store, TokenCategory::New);
        assert!(Arc::ptr_eq(&all, &again));
    }

    #[test]
    fn test_sorted_all_follows_sort() {
        let selectors = TokenSelectors::new();
        let mut store = store();
        assert_eq!(
            ids(&selectors.sorted_all(&store)),
            vec!["f-sol", "n-sol", "n-bnb", "m-bnb"]
        );

        store.update_price("m-bnb", 10.0);
        assert_eq!(
            ids(&selectors.sorted_all(&store)),
            vec!["f-sol", "n-sol", "n-bnb", "m-bnb"]
        );

        store.sort(SortKey::MarketCap);
        assert_eq!(
            ids(&selectors.sorted_all(&store)),
            vec!["m-bnb", "f-sol", "n-sol", "n-bnb"]
        );
    }

    #[test]
    fn test_list_helpers() {
        let selectors = TokenSelectors::new();
        let mut store = store();
        store.update_price("n-sol", 2.0);
        store.update_price("f-sol", 0.5);

        let rows = selectors.sorted_all(&store);
        assert_eq!(ids(&filter_by_direction(&rows, PriceDirection::Up)), vec!["n-sol"]);
        assert_eq!(ids(&filter_by_direction(&rows, PriceDirection::Down)), vec!["f-sol"]);
        assert_eq!(
            ids(&filter_min_market_cap(&rows, 300.0)),
            vec!["n-sol", "n-bnb"]
        );
        assert_eq!(ids(&filter_min_volume(&rows, 40.0)), vec!["f-sol", "n-sol"]);
        assert_eq!(selectors.with_runtime(&store).len(), 4);
    }
}
