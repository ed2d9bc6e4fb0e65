//! Live Price Series
//!
//! Bounded rolling price history for tokens whose detail view is open.
//! A series is seeded with a deterministic synthetic history on first
//! observation, grows with every observed price change and is dropped when
//! observation ends.

use crate::domain::PriceDirection;
use std::collections::{HashMap, VecDeque};

// =============================================================================
// Constants
// =============================================================================

/// Series capacity. Older points are evicted first.
pub const MAX_POINTS: usize = 100;

/// Synthetic points generated before the pinned base point
pub const INITIAL_POINTS: usize = 50;

/// Spacing of synthetic points
pub const SEED_INTERVAL_MS: i64 = 2_000;

/// Seeded history starts at this fraction of the base price
pub const SEED_START_RATIO: f64 = 0.8;

/// Milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
// PricePoint
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Milliseconds since the Unix epoch
    pub time: i64,
    pub price: f64,
    pub direction: PriceDirection,
}

/// Deterministic synthetic history ending exactly at `base_price`
///
/// Walks from `0.8 * base_price` with an oscillating relative step of
/// `((i % 7) - 3) * 1%`, one point every two seconds, then pins a final
/// point at `base_price` stamped `now_ms`.
pub fn generate_initial_history(base_price: f64, now_ms: i64) -> Vec<PricePoint> {
    let mut points = Vec::with_capacity(INITIAL_POINTS + 1);
    let mut current = base_price * SEED_START_RATIO;

    for i in 0..INITIAL_POINTS {
        let step = ((i % 7) as f64 - 3.0) * 0.01;
        let prev = current;
        let mut next = current * (1.0 + step);
        if next <= 0.0 {
            next = prev * 0.95;
        }

        points.push(PricePoint {
            time: now_ms - (INITIAL_POINTS - i) as i64 * SEED_INTERVAL_MS,
            price: next,
            direction: PriceDirection::between(prev, next),
        });
        current = next;
    }

    if let Some(last) = points.last().copied() {
        points.push(PricePoint {
            time: now_ms,
            price: base_price,
            direction: if base_price >= last.price {
                PriceDirection::Up
            } else {
                PriceDirection::Down
            },
        });
    }

    points
}

// =============================================================================
// PriceSeries
// =============================================================================

/// Rolling window for one token
#[derive(Debug, Clone)]
pub struct PriceSeries {
    points: VecDeque<PricePoint>,
    last_price: f64,
}

impl PriceSeries {
    /// Seed a series at `base_price`
    pub fn seeded(base_price: f64, now_ms: i64) -> Self {
        let mut points = VecDeque::with_capacity(MAX_POINTS + 1);
        points.extend(generate_initial_history(base_price, now_ms));
        Self {
            points,
            last_price: base_price,
        }
    }

    /// Record a price observation
    ///
    /// Appends a point only when the price moved since the last
    /// observation. Returns whether a point was appended.
    pub fn record(&mut self, price: f64, now_ms: i64) -> bool {
        if !price.is_finite() || price <= 0.0 || price == self.last_price {
            return false;
        }

        self.push(PricePoint {
            time: now_ms,
            price,
            direction: PriceDirection::between(self.last_price, price),
        });
        self.last_price = price;
        true
    }

    fn push(&mut self, point: PricePoint) {
        self.points.push_back(point);
        while self.points.len() > MAX_POINTS {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    /// Chart-facing snapshot
    pub fn snapshot(&self) -> LivePriceSeries {
        let series: Vec<PricePoint> = self.points.iter().copied().collect();
        LivePriceSeries::from_points(series, self.last_price)
    }
}

// =============================================================================
// LivePriceSeries
// =============================================================================

/// What the chart renders for the observed token
#[derive(Debug, Clone, PartialEq)]
pub struct LivePriceSeries {
    pub series: Vec<PricePoint>,
    pub current_price: f64,
    /// Price of the second-to-last point, or the current price
    pub previous_price: f64,
    pub is_up: bool,
}

impl LivePriceSeries {
    pub fn from_points(series: Vec<PricePoint>, current_price: f64) -> Self {
        let previous_price = if series.len() >= 2 {
            series[series.len() - 2].price
        } else {
            current_price
        };

        Self {
            is_up: current_price >= previous_price,
            series,
            current_price,
            previous_price,
        }
    }

    /// Placeholder when nothing is observed
    pub fn empty() -> Self {
        Self::from_points(Vec::new(), 0.0)
    }
}

// =============================================================================
// PriceSeriesTracker
// =============================================================================

/// Series for every observed token
#[derive(Debug, Default)]
pub struct PriceSeriesTracker {
    series: HashMap<String, PriceSeries>,
}

impl PriceSeriesTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing. Seeds a fresh series unless one already exists.
    pub fn observe(&mut self, token_id: &str, current_price: f64, now_ms: i64) -> bool {
        if self.series.contains_key(token_id) || !current_price.is_finite() || current_price <= 0.0
        {
            return false;
        }
        self.series
            .insert(token_id.to_string(), PriceSeries::seeded(current_price, now_ms));
        true
    }

    /// Stop observing and discard the series
    pub fn unobserve(&mut self, token_id: &str) -> bool {
        self.series.remove(token_id).is_some()
    }

    /// Feed a committed price. Ignored for tokens not observed.
    pub fn on_price(&mut self, token_id: &str, price: f64, now_ms: i64) -> bool {
        match self.series.get_mut(token_id) {
            Some(series) => series.record(price, now_ms),
            None => false,
        }
    }

    pub fn is_observed(&self, token_id: &str) -> bool {
        self.series.contains_key(token_id)
    }

    pub fn get(&self, token_id: &str) -> Option<&PriceSeries> {
        self.series.get(token_id)
    }

    pub fn snapshot(&self, token_id: &str) -> Option<LivePriceSeries> {
        self.series.get(token_id).map(PriceSeries::snapshot)
    }

    pub fn observed_count(&self) -> usize {
        self.series.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_seed_shape() {
        let points = generate_initial_history(100.0, NOW);
        assert_eq!(points.len(), INITIAL_POINTS + 1);

        let first = points[0];
        assert!((first.price - 77.6).abs() < 1e-9);
        assert_eq!(first.direction, PriceDirection::Down);
        assert_eq!(first.time, NOW - 100_000);

        let last = points[points.len() - 1];
        assert_eq!(last.price, 100.0);
        assert_eq!(last.time, NOW);
        assert_eq!(last.direction, PriceDirection::Up);
    }

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(
            generate_initial_history(3.5, NOW),
            generate_initial_history(3.5, NOW)
        );
    }

    #[test]
    fn test_record_appends_on_change_only() {
        let mut series = PriceSeries::seeded(10.0, NOW);
        let len = series.len();

        assert!(!series.record(10.0, NOW + 1));
        assert!(series.record(11.0, NOW + 2));
        assert!(series.record(10.5, NOW + 3));
        assert!(!series.record(-1.0, NOW + 4));

        let points: Vec<_> = series.points().copied().collect();
        assert_eq!(points.len(), len + 2);
        assert_eq!(points[len].direction, PriceDirection::Up);
        assert_eq!(points[len + 1].direction, PriceDirection::Down);
    }

    #[test]
    fn test_capacity_and_fifo() {
        let mut series = PriceSeries::seeded(1.0, NOW);
        for i in 0..200 {
            series.record(2.0 + i as f64, NOW + i);
        }
        assert_eq!(series.len(), MAX_POINTS);

        let prices: Vec<f64> = series.points().map(|p| p.price).collect();
        let expected: Vec<f64> = (100..200).map(|i| 2.0 + i as f64).collect();
        assert_eq!(prices, expected);
    }

    #[test]
    fn test_snapshot_compares_second_to_last() {
        let mut series = PriceSeries::seeded(10.0, NOW);
        let snap = series.snapshot();
        assert_eq!(snap.current_price, 10.0);
        assert!(snap.is_up);

        series.record(9.0, NOW + 1);
        let snap = series.snapshot();
        assert_eq!(snap.previous_price, 10.0);
        assert!(!snap.is_up);

        let empty = LivePriceSeries::empty();
        assert_eq!(empty.previous_price, 0.0);
        assert!(empty.is_up);
    }

    #[test]
    fn test_tracker_lifecycle() {
        let mut tracker = PriceSeriesTracker::new();
        assert!(!tracker.on_price("a", 2.0, NOW));

        assert!(tracker.observe("a", 1.0, NOW));
        assert!(!tracker.observe("a", 5.0, NOW));
        assert!(tracker.on_price("a", 2.0, NOW + 1));
        assert_eq!(tracker.get("a").unwrap().len(), INITIAL_POINTS + 2);

        assert!(tracker.unobserve("a"));
        assert!(tracker.snapshot("a").is_none());

        assert!(tracker.observe("a", 2.0, NOW + 2));
        assert_eq!(tracker.get("a").unwrap().len(), INITIAL_POINTS + 1);
    }
}
