//! Engineered Feature Row

use crate::{columns, Observation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fully populated row of engineered features.
///
/// `aqi` is the target column and is kept apart from the predictors. Every
/// value in `features` is defined: rows with gaps are never materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: DateTime<Utc>,
    pub aqi: f64,
    pub features: BTreeMap<String, f64>,
}

impl FeatureRow {
    pub fn new(timestamp: DateTime<Utc>, aqi: f64) -> Self {
        Self {
            timestamp,
            aqi,
            features: BTreeMap::new(),
        }
    }

    /// Copy every defined raw measurement of an observation into a row
    pub fn from_observation(observation: &Observation) -> Self {
        let mut row = Self::new(observation.timestamp, observation.aqi);
        for (column, value) in observation.measurements() {
            if let Some(v) = value {
                row.features.insert(column.to_string(), v);
            }
        }
        if let Some(v) = observation.openweather_aqi {
            row.features.insert(columns::OPENWEATHER_AQI.to_string(), v);
        }
        row
    }

    /// Value of a column; `"aqi"` reads the target
    pub fn get(&self, column: &str) -> Option<f64> {
        if column == columns::AQI {
            return Some(self.aqi);
        }
        self.features.get(column).copied()
    }

    /// Set a column; `"aqi"` writes the target
    pub fn set(&mut self, column: &str, value: f64) {
        if column == columns::AQI {
            self.aqi = value;
        } else {
            self.features.insert(column.to_string(), value);
        }
    }

    /// Number of predictor columns
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Same row at a different instant
    pub fn with_timestamp(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_observation_skips_missing() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap();
        let mut obs = Observation::new(ts);
        obs.pm2_5 = Some(20.0);
        obs.temperature = Some(18.5);
        obs.openweather_aqi = Some(2.0);
        obs.aqi = 68.0;

        let row = FeatureRow::from_observation(&obs);
        assert_eq!(row.aqi, 68.0);
        assert_eq!(row.feature_count(), 3);
        assert_eq!(row.get("pm2_5"), Some(20.0));
        assert_eq!(row.get("humidity"), None);
        assert_eq!(row.get("aqi"), Some(68.0));
    }

    #[test]
    fn test_set_routes_target() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap();
        let mut row = FeatureRow::new(ts, 0.0);
        row.set("aqi", 120.0);
        row.set("hour", 10.0);
        assert_eq!(row.aqi, 120.0);
        assert_eq!(row.features.len(), 1);
    }

    #[test]
    fn test_serializes_flat_map() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap();
        let mut row = FeatureRow::new(ts, 42.0);
        row.set("hour", 10.0);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["features"]["hour"], 10.0);
        assert_eq!(json["aqi"], 42.0);
    }
}
