//! Token Store
//!
//! Single source of truth for token state. Holds the id -> Token map, the
//! id -> Runtime map and the explicit sort order. Every mutation goes
//! through a `&mut self` method, so a reader holding the shared lock sees
//! either the state before a commit or the state after it.
//!
//! All operations are total: bad input leaves the store untouched.

use crate::domain::{
    apply_price_update, initial_runtime, validate_token, ChainFilter, PriceUpdate, SortKey, Token, TokenCategory,
    TokenRuntime, TokenView, VolumeModel,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// SharedTokenStore
// =============================================================================

/// Shared store accessible by the feed loop and the renderers
pub type SharedTokenStore = Arc<RwLock<TokenStore>>;

/// Create a new shared, uninitialized store
pub fn create_shared_store(volume_model: VolumeModel) -> SharedTokenStore {
    Arc::new(RwLock::new(TokenStore::with_volume_model(volume_model)))
}

// =============================================================================
// LoadState
// =============================================================================

/// Bootstrap progress as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// StoreStats
// =============================================================================

/// Counters for update outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Updates committed
    pub applied: u64,
    /// Updates for ids the store does not know
    pub unknown_id: u64,
    /// Updates rejected by the normalizer
    pub rejected: u64,
    /// Updates received before initialization
    pub before_init: u64,
}

// =============================================================================
// TokenStore
// =============================================================================

#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: HashMap<String, Arc<Token>>,
    runtime: HashMap<String, TokenRuntime>,
    /// Ids in snapshot order, the tie-break for every sort
    snapshot_order: Vec<String>,
    sorted_ids: Vec<String>,

    active_category: Option<TokenCategory>,
    chain_filter: ChainFilter,
    sort_key: SortKey,

    load_state: LoadState,
    initialized: bool,

    /// Bumped on every commit that changes token data or ordering
    version: u64,

    volume_model: VolumeModel,
    stats: StoreStats,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume_model(volume_model: VolumeModel) -> Self {
        Self {
            volume_model,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Bulk-load the token set
    ///
    /// Builds both maps with neutral runtimes and orders ids by market cap,
    /// descending. Tokens without a positive finite price and market cap are
    /// skipped. Returns `false` and leaves the store untouched when it was
    /// already initialized.
    pub fn initialize(&mut self, tokens: Vec<Token>, default_category: Option<TokenCategory>) -> bool {
        if self.initialized {
            warn!("[Store] initialize called on an initialized store, ignoring");
            return false;
        }

        let mut order = Vec::with_capacity(tokens.len());
        for token in tokens {
            if self.tokens.contains_key(&token.id) {
                warn!("[Store] Duplicate token id {} in snapshot, keeping first", token.id);
                continue;
            }
            if let Err(e) = validate_token(&token) {
                warn!("[Store] Skipping token in snapshot: {}", e);
                continue;
            }
            order.push(token.id.clone());
            self.runtime.insert(token.id.clone(), initial_runtime(&token));
            self.tokens.insert(token.id.clone(), Arc::new(token));
        }

        self.snapshot_order = order;
        self.sort_key = SortKey::MarketCap;
        self.sort_ids(SortKey::MarketCap);

        self.active_category = default_category;
        self.initialized = true;
        self.load_state = LoadState::Ready;
        self.version += 1;

        info!("[Store] Initialized with {} tokens", self.tokens.len());
        true
    }

    /// Apply a new price to one token
    ///
    /// No-op when the store is uninitialized, the id is unknown or the
    /// price is invalid. Ordering is left alone.
    pub fn update_price(&mut self, id: &str, new_price: f64) -> Option<TokenView> {
        self.commit_update(id, new_price, None)
    }

    /// Apply a feed event, honoring a reported volume when present
    pub fn apply_update(&mut self, update: &PriceUpdate) -> Option<TokenView> {
        self.commit_update(&update.token_id, update.new_price, update.volume_24h)
    }

    fn commit_update(
        &mut self,
        id: &str,
        new_price: f64,
        reported_volume: Option<f64>,
    ) -> Option<TokenView> {
        if !self.initialized {
            self.stats.before_init += 1;
            return None;
        }

        let Some(current) = self.tokens.get(id) else {
            self.stats.unknown_id += 1;
            debug!("[Store] Ignoring update for unknown token {}", id);
            return None;
        };

        let volume = match reported_volume {
            Some(volume) => Some(volume),
            None => self.volume_model.next_volume(current.volume_24h),
        };

        let result = match apply_price_update(current, new_price, volume) {
            Ok(result) => result,
            Err(e) => {
                self.stats.rejected += 1;
                debug!("[Store] Rejected update: {}", e);
                return None;
            }
        };

        let token = Arc::new(result.token);
        self.tokens.insert(id.to_string(), Arc::clone(&token));
        self.runtime.insert(id.to_string(), result.runtime);
        self.version += 1;
        self.stats.applied += 1;

        Some(TokenView::new(token, result.runtime))
    }

    /// Recompute the ordering from current values, descending by `key`
    ///
    /// Ties keep snapshot order, whatever the previous sort was.
    pub fn sort(&mut self, key: SortKey) {
        self.sort_key = key;
        self.sort_ids(key);
        self.version += 1;
        debug!("[Store] Sorted {} ids by {:?}", self.sorted_ids.len(), key);
    }

    fn sort_ids(&mut self, key: SortKey) {
        let tokens = &self.tokens;
        let value = |id: &String| tokens.get(id).map(|t| key.value(t)).unwrap_or(f64::NEG_INFINITY);
        let mut ids = self.snapshot_order.clone();
        ids.sort_by(|a, b| value(b).total_cmp(&value(a)));
        self.sorted_ids = ids;
    }

    pub fn set_chain_filter(&mut self, filter: ChainFilter) {
        self.chain_filter = filter;
    }

    pub fn set_active_category(&mut self, category: Option<TokenCategory>) {
        self.active_category = category;
    }

    pub fn set_volume_model(&mut self, model: VolumeModel) {
        self.volume_model = model;
    }

    /// Mark the bootstrap as in flight. Ignored once initialized.
    pub fn begin_loading(&mut self) {
        if !self.initialized {
            self.load_state = LoadState::Loading;
        }
    }

    /// Record a bootstrap failure. Ignored once initialized.
    pub fn fail_loading(&mut self, message: impl Into<String>) {
        if !self.initialized {
            self.load_state = LoadState::Failed(message.into());
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Combined view, `None` when either half is missing
    pub fn view(&self, id: &str) -> Option<TokenView> {
        let token = self.tokens.get(id)?;
        let runtime = self.runtime.get(id)?;
        Some(TokenView::new(Arc::clone(token), *runtime))
    }

    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.get(id).map(|t| t.as_ref())
    }

    pub fn runtime(&self, id: &str) -> Option<&TokenRuntime> {
        self.runtime.get(id)
    }

    /// Token map, for readers that need the raw records
    pub fn tokens(&self) -> &HashMap<String, Arc<Token>> {
        &self.tokens
    }

    pub fn sorted_ids(&self) -> &[String] {
        &self.sorted_ids
    }

    pub fn chain_filter(&self) -> ChainFilter {
        self.chain_filter
    }

    pub fn active_category(&self) -> Option<TokenCategory> {
        self.active_category
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn volume_model_name(&self) -> &'static str {
        self.volume_model.name()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
