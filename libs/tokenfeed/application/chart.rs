//! Chart helpers
//!
//! Axis bounds and label formatting for the live price chart.

use super::price_series::PricePoint;
use chrono::{DateTime, Utc};

/// Vertical bounds of a chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDomain {
    pub min: f64,
    pub max: f64,
}

impl PriceDomain {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Min/max of the series with padding
///
/// Empty series map to [0, 1]. A flat series is padded by 10% of its price
/// (0.001 when the price is zero), anything else by 8% of the range with
/// the lower bound floored at zero.
pub fn price_domain(series: &[PricePoint]) -> PriceDomain {
    if series.is_empty() {
        return PriceDomain { min: 0.0, max: 1.0 };
    }

    let (min, max) = series.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.price), hi.max(p.price))
    });

    if min == max {
        let padding = if max * 0.1 != 0.0 { max * 0.1 } else { 0.001 };
        return PriceDomain {
            min: min - padding,
            max: max + padding,
        };
    }

    let padding = (max - min) * 0.08;
    PriceDomain {
        min: (min - padding).max(0.0),
        max: max + padding,
    }
}

/// Evenly spaced axis ticks between `min` and `max`, inclusive
pub fn y_ticks(domain: PriceDomain, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![domain.min],
        _ => {
            let step = domain.span() / (count - 1) as f64;
            (0..count).map(|i| domain.min + step * i as f64).collect()
        }
    }
}

/// Compact price label: M and K suffixes, then 2, 4 or 8 decimals
pub fn format_price(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else if value >= 1.0 {
        format!("{:.2}", value)
    } else if value >= 0.01 {
        format!("{:.4}", value)
    } else {
        format!("{:.8}", value)
    }
}

/// HH:MM:SS label for an epoch-millisecond timestamp
pub fn format_time(time_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(time_ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Signed percentage label, e.g. "+3.20%"
pub fn format_change(value: f64) -> String {
    format!("{:+.2}%", value)
}
