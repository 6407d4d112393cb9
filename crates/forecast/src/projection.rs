//! Future Row Projection
//!
//! The persistence projector assumes tomorrow looks like now: every
//! pollutant and weather value of the seed row is held constant and only the
//! calendar columns follow the new timestamp.

use crate::ForecastError;
use chrono::Duration;
use feature_engine::TemporalFeatures;
use observation::FeatureRow;

/// Calendar columns a projection rewrites
pub const PROJECTED_COLUMNS: [&str; 4] = ["hour", "day", "month", "weekday"];

/// Builds the feature rows of future days from recent history
pub trait ProjectionStrategy {
    fn name(&self) -> &str;

    /// One row per day `1..=days`; `history` is ascending and non-empty
    fn project(&self, history: &[FeatureRow], days: u32) -> Result<Vec<FeatureRow>, ForecastError>;
}

/// Clone the latest row `days` times, one day apart
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistenceProjector;

impl PersistenceProjector {
    fn project_one(seed: &FeatureRow, day: u32) -> FeatureRow {
        let timestamp = seed.timestamp + Duration::days(i64::from(day));
        let calendar = TemporalFeatures::from_timestamp(timestamp);
        let mut row = seed.with_timestamp(timestamp);
        row.set("hour", f64::from(calendar.hour));
        row.set("day", f64::from(calendar.day));
        row.set("month", f64::from(calendar.month));
        row.set("weekday", f64::from(calendar.weekday));
        row
    }
}

impl ProjectionStrategy for PersistenceProjector {
    fn name(&self) -> &str {
        "persistence"
    }

    fn project(&self, history: &[FeatureRow], days: u32) -> Result<Vec<FeatureRow>, ForecastError> {
        let seed = history
            .iter()
            .max_by_key(|r| r.timestamp)
            .ok_or(ForecastError::NoSeedData)?;
        Ok((1..=days).map(|day| Self::project_one(seed, day)).collect())
    }
}
