//! Time/distance heuristic that suppresses redundant refreshes.

use chrono::{DateTime, Duration, Utc};
use ember_core::{AppConfig, Coordinate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STALE_AFTER_SECS: i64 = 45;
pub const DEFAULT_STALE_DISTANCE_METERS: f64 = 800.0;

/// Where and when the last successful fetch ran.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StalenessRecord {
    pub anchor: Coordinate,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StalenessGate {
    pub max_age: Duration,
    pub max_distance_meters: f64,
}

impl Default for StalenessGate {
    fn default() -> Self {
        Self {
            max_age: Duration::seconds(DEFAULT_STALE_AFTER_SECS),
            max_distance_meters: DEFAULT_STALE_DISTANCE_METERS,
        }
    }
}

impl StalenessGate {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let secs = i64::try_from(config.stale_after_secs).unwrap_or(i64::MAX);
        Self {
            max_age: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
            max_distance_meters: config.stale_distance_meters,
        }
    }

    /// Whether a fetch around `new_anchor` at `now` is warranted.
    ///
    /// Always `true` without a prior record. Otherwise the fetch is suppressed
    /// only while BOTH the last fetch is younger than `max_age` AND the anchor
    /// moved less than `max_distance_meters`.
    #[must_use]
    pub fn should_fetch(
        &self,
        last: Option<&StalenessRecord>,
        new_anchor: Coordinate,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(last) = last else {
            return true;
        };
        let elapsed = now.signed_duration_since(last.fetched_at);
        let moved = ember_core::geo::distance_meters(last.anchor, new_anchor);
        !(elapsed < self.max_age && moved < self.max_distance_meters)
    }
}
