//! Normalizer
//!
//! Pure functions turning raw snapshot records into normalized tokens and
//! folding a single price update into a token and its runtime state.

use super::token::{
    PriceDirection, RawToken, RawTokensData, Token, TokenCategory, TokenRuntime, TokensByCategory,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::warn;

// =============================================================================
// Constants
// =============================================================================

/// Share of a tick's percentage move accumulated into the 1h change
pub const CHANGE_1H_WEIGHT: f64 = 0.3;

/// Share of a tick's percentage move accumulated into the 24h change
pub const CHANGE_24H_WEIGHT: f64 = 0.15;

/// Both change fields are kept within [-CHANGE_BOUND, CHANGE_BOUND]
pub const CHANGE_BOUND: f64 = 50.0;

/// Default upper bound of the volume jitter, as a fraction of current volume
pub const DEFAULT_JITTER_FRACTION: f64 = 0.05;

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Invalid price for {token_id}: {price}")]
    InvalidPrice { token_id: String, price: f64 },

    #[error("Token {token_id} has a non-positive base price {price}")]
    InvalidBasePrice { token_id: String, price: f64 },

    #[error("Token {token_id} has an invalid market cap {market_cap}")]
    InvalidMarketCap { token_id: String, market_cap: f64 },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

// =============================================================================
// Snapshot normalization
// =============================================================================

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Check that a token can take part in price updates
///
/// Price and market cap must be finite and positive.
pub fn validate_token(token: &Token) -> Result<()> {
    if !is_positive(token.price) {
        return Err(NormalizeError::InvalidBasePrice {
            token_id: token.id.clone(),
            price: token.price,
        });
    }
    if !is_positive(token.market_cap) {
        return Err(NormalizeError::InvalidMarketCap {
            token_id: token.id.clone(),
            market_cap: token.market_cap,
        });
    }
    Ok(())
}

/// Copy a raw record into a normalized token tagged with its category
///
/// Change fields are clamped to ±CHANGE_BOUND.
pub fn normalize(raw: &RawToken, category: TokenCategory) -> Token {
    Token {
        id: raw.id.clone(),
        name: raw.name.clone(),
        symbol: raw.symbol.clone(),
        image: raw.image.clone(),
        price: raw.price,
        market_cap: raw.market_cap,
        volume_24h: raw.volume_24h,
        change_1h: clamp_change(raw.change_1h),
        change_24h: clamp_change(raw.change_24h),
        category,
        chain: raw.chain,
        timestamp: raw.timestamp.clone(),
        engagement: raw.engagement,
        tx_count: raw.tx_count,
        percentage: raw.percentage,
    }
}

/// Runtime state of a freshly loaded token
pub fn initial_runtime(token: &Token) -> TokenRuntime {
    TokenRuntime {
        prev_price: token.price,
        price_direction: PriceDirection::Neutral,
    }
}

/// Normalize a full snapshot, preserving per-category input order
///
/// Records failing `validate_token` are dropped with a warning.
pub fn normalize_snapshot(data: &RawTokensData) -> TokensByCategory {
    let map = |category: TokenCategory| -> Vec<Token> {
        data.category(category)
            .iter()
            .map(|raw| normalize(raw, category))
            .filter(|token| match validate_token(token) {
                Ok(()) => true,
                Err(e) => {
                    warn!("[Normalizer] Dropping snapshot record: {}", e);
                    false
                }
            })
            .collect()
    };

    TokensByCategory {
        new: map(TokenCategory::New),
        final_stretch: map(TokenCategory::Final),
        migrated: map(TokenCategory::Migrated),
    }
}

/// Flatten categories in New, Final, Migrated order
pub fn flatten(by_category: TokensByCategory) -> Vec<Token> {
    let TokensByCategory {
        new,
        final_stretch,
        migrated,
    } = by_category;

    let mut all = Vec::with_capacity(new.len() + final_stretch.len() + migrated.len());
    all.extend(new);
    all.extend(final_stretch);
    all.extend(migrated);
    all
}

// =============================================================================
// Price update
// =============================================================================

/// Token and runtime produced by a single price update
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdateResult {
    pub token: Token,
    pub runtime: TokenRuntime,
}

fn clamp_change(value: f64) -> f64 {
    value.clamp(-CHANGE_BOUND, CHANGE_BOUND)
}

/// Fold a new price into a token
///
/// Market cap scales with the price ratio, the change fields accumulate a
/// damped share of the tick's percentage move and stay clamped to
/// ±CHANGE_BOUND. Volume is replaced only when `volume_24h` is given.
pub fn apply_price_update(
    token: &Token,
    new_price: f64,
    volume_24h: Option<f64>,
) -> Result<PriceUpdateResult> {
    if !is_positive(new_price) {
        return Err(NormalizeError::InvalidPrice {
            token_id: token.id.clone(),
            price: new_price,
        });
    }
    if !is_positive(token.price) {
        return Err(NormalizeError::InvalidBasePrice {
            token_id: token.id.clone(),
            price: token.price,
        });
    }

    let old_price = token.price;
    let pct = (new_price - old_price) / old_price * 100.0;

    let mut next = token.clone();
    next.price = new_price;
    next.market_cap = token.market_cap * (new_price / old_price);
    next.change_1h = clamp_change(token.change_1h + pct * CHANGE_1H_WEIGHT);
    next.change_24h = clamp_change(token.change_24h + pct * CHANGE_24H_WEIGHT);
    if let Some(volume) = volume_24h.filter(|v| v.is_finite() && *v >= 0.0) {
        next.volume_24h = volume;
    }

    Ok(PriceUpdateResult {
        token: next,
        runtime: TokenRuntime {
            prev_price: old_price,
            price_direction: PriceDirection::between(old_price, new_price),
        },
    })
}

// =============================================================================
// VolumeModel
// =============================================================================

/// How 24h volume evolves when the feed does not report it
#[derive(Debug, Clone, Default)]
pub enum VolumeModel {
    /// Keep the last known volume
    #[default]
    Hold,
    /// Simulated drift within ±max_fraction of the current volume
    Jitter(VolumeJitter),
}

impl VolumeModel {
    /// Jitter model seeded from entropy
    pub fn jitter(max_fraction: f64) -> Self {
        VolumeModel::Jitter(VolumeJitter::new(max_fraction, StdRng::from_entropy()))
    }

    /// Jitter model with a fixed seed, for reproducible runs
    pub fn seeded_jitter(max_fraction: f64, seed: u64) -> Self {
        VolumeModel::Jitter(VolumeJitter::new(max_fraction, StdRng::seed_from_u64(seed)))
    }

    /// Volume to use for the next update, `None` means keep current
    pub fn next_volume(&mut self, current: f64) -> Option<f64> {
        match self {
            VolumeModel::Hold => None,
            VolumeModel::Jitter(jitter) => Some(jitter.next(current)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VolumeModel::Hold => "hold",
            VolumeModel::Jitter(_) => "jitter",
        }
    }
}

/// Bounded random walk applied to volume
#[derive(Debug, Clone)]
pub struct VolumeJitter {
    max_fraction: f64,
    rng: StdRng,
}

impl VolumeJitter {
    pub fn new(max_fraction: f64, rng: StdRng) -> Self {
        Self {
            max_fraction: max_fraction.abs(),
            rng,
        }
    }

    pub fn max_fraction(&self) -> f64 {
        self.max_fraction
    }

    fn next(&mut self, current: f64) -> f64 {
        if self.max_fraction == 0.0 || current <= 0.0 {
            return current.max(0.0);
        }
        let factor = self
            .rng
            .gen_range(-self.max_fraction..=self.max_fraction);
        (current * (1.0 + factor)).max(0.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{Chain, Engagement};

    fn raw(id: &str, price: f64, market_cap: f64) -> RawToken {
        RawToken {
            id: id.to_string(),
            name: format!("Token {}", id),
            symbol: id.to_uppercase(),
            image: String::new(),
            price,
            market_cap,
            volume_24h: 5_000.0,
            change_1h: 0.0,
            change_24h: 0.0,
            chain: Chain::SOL,
            timestamp: "1m".to_string(),
            engagement: Engagement::default(),
            tx_count: 10,
            percentage: 0.0,
        }
    }

    fn token(price: f64, market_cap: f64) -> Token {
        normalize(&raw("a", price, market_cap), TokenCategory::New)
    }

    #[test]
    fn test_normalize_copies_fields_and_tags_category() {
        let t = normalize(&raw("x", 2.0, 200.0), TokenCategory::Migrated);
        assert_eq!(t.category, TokenCategory::Migrated);
        assert_eq!(t.id, "x");
        assert_eq!(t.chain, Chain::SOL);
        assert_eq!(t.price, 2.0);
        assert_eq!(t.tx_count, 10);

        let runtime = initial_runtime(&t);
        assert_eq!(runtime.prev_price, 2.0);
        assert_eq!(runtime.price_direction, PriceDirection::Neutral);
    }

    #[test]
    fn test_flatten_order() {
        let data = RawTokensData {
            new: vec![raw("n1", 1.0, 1.0)],
            final_stretch: vec![raw("f1", 1.0, 1.0), raw("f2", 1.0, 1.0)],
            migrated: vec![raw("m1", 1.0, 1.0)],
        };
        let ids: Vec<String> = flatten(normalize_snapshot(&data))
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["n1", "f1", "f2", "m1"]);
    }

    #[test]
    fn test_price_up_ten_percent() {
        let t = token(10.0, 1000.0);
        let result = apply_price_update(&t, 11.0, None).unwrap();

        assert_eq!(result.runtime.price_direction, PriceDirection::Up);
        assert_eq!(result.runtime.prev_price, 10.0);
        assert!((result.token.market_cap - 1100.0).abs() < 1e-9);
        assert!((result.token.change_1h - 3.0).abs() < 1e-9);
        assert!((result.token.change_24h - 1.5).abs() < 1e-9);
        assert_eq!(result.token.volume_24h, 5_000.0);
    }

    #[test]
    fn test_equal_price_is_neutral() {
        let t = token(10.0, 1000.0);
        let result = apply_price_update(&t, 10.0, None).unwrap();
        assert_eq!(result.runtime.price_direction, PriceDirection::Neutral);
        assert_eq!(result.token.change_1h, 0.0);
    }

    #[test]
    fn test_changes_saturate() {
        let mut t = token(10.0, 1000.0);
        for _ in 0..10 {
            let next = t.price * 1.2;
            t = apply_price_update(&t, next, None).unwrap().token;
        }
        assert_eq!(t.change_1h, CHANGE_BOUND);
        assert!(t.change_24h <= CHANGE_BOUND);
    }

    #[test]
    fn test_rejects_invalid_prices() {
        let t = token(10.0, 1000.0);
        assert!(matches!(
            apply_price_update(&t, 0.0, None),
            Err(NormalizeError::InvalidPrice { .. })
        ));
        assert!(apply_price_update(&t, -1.0, None).is_err());
        assert!(apply_price_update(&t, f64::NAN, None).is_err());

        let zero = token(0.0, 0.0);
        assert!(matches!(
            apply_price_update(&zero, 1.0, None),
            Err(NormalizeError::InvalidBasePrice { .. })
        ));
    }

    #[test]
    fn test_normalize_clamps_change_fields() {
        let mut record = raw("z", 1.0, 10.0);
        record.change_1h = 80.0;
        record.change_24h = -120.0;

        let t = normalize(&record, TokenCategory::New);
        assert_eq!(t.change_1h, CHANGE_BOUND);
        assert_eq!(t.change_24h, -CHANGE_BOUND);
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token(&token(1.0, 10.0)).is_ok());
        assert!(matches!(
            validate_token(&token(0.0, 10.0)),
            Err(NormalizeError::InvalidBasePrice { .. })
        ));
        assert!(matches!(
            validate_token(&token(1.0, f64::NAN)),
            Err(NormalizeError::InvalidMarketCap { .. })
        ));
        assert!(validate_token(&token(f64::INFINITY, 10.0)).is_err());
        assert!(validate_token(&token(1.0, -5.0)).is_err());
    }

    #[test]
    fn test_snapshot_drops_invalid_records() {
        let data = RawTokensData {
            new: vec![raw("ok", 1.0, 10.0), raw("zero", 0.0, 10.0)],
            final_stretch: vec![raw("nocap", 1.0, 0.0)],
            migrated: vec![raw("nan", f64::NAN, 10.0), raw("fine", 2.0, 20.0)],
        };

        let ids: Vec<String> = flatten(normalize_snapshot(&data))
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["ok", "fine"]);
    }

    #[test]
    fn test_reported_volume_replaces() {
        let t = token(10.0, 1000.0);
        let result = apply_price_update(&t, 9.0, Some(1234.0)).unwrap();
        assert_eq!(result.token.volume_24h, 1234.0);
        assert_eq!(result.runtime.price_direction, PriceDirection::Down);
    }

    #[test]
    fn test_volume_models() {
        let mut hold = VolumeModel::Hold;
        assert_eq!(hold.next_volume(100.0), None);

        let mut jitter = VolumeModel::seeded_jitter(0.05, 7);
        for _ in 0..100 {
            let v = jitter.next_volume(100.0).unwrap();
            assert!((95.0..=105.0).contains(&v));
        }
    }
}
