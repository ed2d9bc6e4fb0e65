//! Random-walk price simulator

use crate::domain::RawTokensData;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Smallest absolute move per tick, in percent
pub const MIN_DELTA_PERCENT: f64 = 0.5;

/// Largest absolute move per tick, in percent
pub const MAX_DELTA_PERCENT: f64 = 3.0;

/// Prices never fall below this
pub const PRICE_FLOOR: f64 = 1e-9;

/// One simulated move
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedUpdate {
    pub id: String,
    pub old_price: f64,
    pub new_price: f64,
    pub delta_percent: f64,
}

/// Apply a percentage move with the price floor
pub fn apply_delta(price: f64, delta_percent: f64) -> f64 {
    (price * (1.0 + delta_percent / 100.0)).max(PRICE_FLOOR)
}

/// Current price of every token, moved a few at a time
pub struct PriceSimulator {
    prices: BTreeMap<String, f64>,
    rng: StdRng,
}

impl PriceSimulator {
    pub fn new(prices: BTreeMap<String, f64>, rng: StdRng) -> Self {
        Self { prices, rng }
    }

    pub fn from_snapshot(data: &RawTokensData) -> Self {
        Self::with_rng(data, StdRng::from_entropy())
    }

    pub fn with_rng(data: &RawTokensData, rng: StdRng) -> Self {
        let prices = data
            .new
            .iter()
            .chain(&data.final_stretch)
            .chain(&data.migrated)
            .map(|raw| (raw.id.clone(), raw.price))
            .collect();
        Self::new(prices, rng)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn price(&self, id: &str) -> Option<f64> {
        self.prices.get(id).copied()
    }

    /// Random signed delta with magnitude in [MIN_DELTA_PERCENT, MAX_DELTA_PERCENT)
    fn next_delta(&mut self) -> f64 {
        let magnitude = self.rng.gen_range(MIN_DELTA_PERCENT..MAX_DELTA_PERCENT);
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Move 2 or 3 distinct random tokens
    pub fn tick(&mut self) -> Vec<SimulatedUpdate> {
        if self.prices.is_empty() {
            return Vec::new();
        }

        let count = self.rng.gen_range(2..=3).min(self.prices.len());
        let ids: Vec<String> = self.prices.keys().cloned().collect();
        let selected: Vec<String> = ids
            .choose_multiple(&mut self.rng, count)
            .cloned()
            .collect();

        let mut updates = Vec::with_capacity(selected.len());
        for id in selected {
            let delta_percent = self.next_delta();
            if let Some(price) = self.prices.get_mut(&id) {
                let old_price = *price;
                let new_price = apply_delta(old_price, delta_percent);
                *price = new_price;
                updates.push(SimulatedUpdate {
                    id,
                    old_price,
                    new_price,
                    delta_percent,
                });
            }
        }
        updates
    }
}
