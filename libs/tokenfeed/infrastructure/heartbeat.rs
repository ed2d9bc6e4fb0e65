//! Periodic feed summaries for long-running processes
//!
//! Counts applied price updates between beats so each summary can report
//! the update rate over the last window.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Update counts for one heartbeat window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatSummary {
    pub updates: u64,
    pub window: Duration,
}

impl BeatSummary {
    pub fn updates_per_sec(&self) -> f64 {
        let secs = self.window.as_secs_f64();
        if secs > 0.0 {
            self.updates as f64 / secs
        } else {
            0.0
        }
    }
}

/// Tracks when the next summary is due and what happened since the last one
pub struct Heartbeat {
    interval: Duration,
    last_beat: DateTime<Utc>,
    updates_since_beat: u64,
}

impl Heartbeat {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            last_beat: Utc::now(),
            updates_since_beat: 0,
        }
    }

    /// Count applied price updates
    pub fn record_updates(&mut self, count: u64) {
        self.updates_since_beat += count;
    }

    pub fn should_beat(&self) -> bool {
        self.elapsed() >= self.interval
    }

    /// Close the current window and start a new one
    pub fn beat(&mut self) -> BeatSummary {
        let summary = BeatSummary {
            updates: self.updates_since_beat,
            window: self.elapsed(),
        };
        self.last_beat = Utc::now();
        self.updates_since_beat = 0;
        summary
    }

    pub fn last_beat(&self) -> DateTime<Utc> {
        self.last_beat
    }

    fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.last_beat)
            .to_std()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_always_beats() {
        let mut heartbeat = Heartbeat::new(0);
        assert!(heartbeat.should_beat());
        heartbeat.beat();
        assert!(heartbeat.should_beat());
    }

    #[test]
    fn test_long_interval_waits() {
        let heartbeat = Heartbeat::new(3_600);
        assert!(!heartbeat.should_beat());
    }

    #[test]
    fn test_beat_resets_update_count() {
        let mut heartbeat = Heartbeat::new(0);
        heartbeat.record_updates(1);
        heartbeat.record_updates(3);

        assert_eq!(heartbeat.beat().updates, 4);
        assert_eq!(heartbeat.beat().updates, 0);
    }

    #[test]
    fn test_rate_over_window() {
        let summary = BeatSummary {
            updates: 30,
            window: Duration::from_secs(10),
        };
        assert_eq!(summary.updates_per_sec(), 3.0);

        let empty = BeatSummary {
            updates: 5,
            window: Duration::ZERO,
        };
        assert_eq!(empty.updates_per_sec(), 0.0);
    }
}
