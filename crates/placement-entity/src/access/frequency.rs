//! Windowed access counts derived from an event sequence.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::model::AccessEvent;
use super::pattern::AccessPatternType;

/// Access counts over the fixed 1/7/30-day windows plus a recency-weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessFrequency {
    /// Accesses in the last day.
    pub daily: u64,
    /// Accesses in the last 7 days.
    pub weekly: u64,
    /// Accesses in the last 30 days.
    pub monthly: u64,
    /// Exponentially decayed access count.
    pub recency_weighted: f64,
}

impl AccessFrequency {
    /// Compute all windows independently from the raw events.
    pub fn compute(events: &[AccessEvent], now: DateTime<Utc>, half_life_days: f64) -> Self {
        let half_life_seconds = (half_life_days.max(f64::EPSILON)) * 86_400.0;
        let recency_weighted = events
            .iter()
            .filter(|e| e.timestamp <= now)
            .map(|e| {
                let age = (now - e.timestamp).num_seconds() as f64;
                0.5_f64.powf(age / half_life_seconds)
            })
            .sum();

        Self {
            daily: count_in_window(events, Duration::days(1), now),
            weekly: count_in_window(events, Duration::days(7), now),
            monthly: count_in_window(events, Duration::days(30), now),
            recency_weighted,
        }
    }

    /// Pattern class implied by the monthly count.
    pub fn pattern(&self) -> AccessPatternType {
        AccessPatternType::from_monthly_count(self.monthly)
    }
}

/// Number of events with `now - window < timestamp <= now`.
pub fn count_in_window(events: &[AccessEvent], window: Duration, now: DateTime<Utc>) -> u64 {
    let start = now - window;
    events
        .iter()
        .filter(|e| e.timestamp > start && e.timestamp <= now)
        .count() as u64
}
