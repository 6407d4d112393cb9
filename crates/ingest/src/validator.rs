//! Physical Range Validation

use crate::IngestError;
use observation::{columns, Observation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Temperature valid range (°C)
    pub temperature_range: (f64, f64),
    /// Relative humidity valid range (%)
    pub humidity_range: (f64, f64),
    /// Surface pressure valid range (hPa)
    pub pressure_range: (f64, f64),
    /// Wind speed valid range (m/s)
    pub wind_speed_range: (f64, f64),
    /// Wind direction valid range (degrees)
    pub wind_direction_range: (f64, f64),
    /// Hourly precipitation valid range (mm)
    pub precipitation_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            temperature_range: (-90.0, 60.0),
            humidity_range: (0.0, 100.0),
            pressure_range: (300.0, 1100.0),
            wind_speed_range: (0.0, 200.0),
            wind_direction_range: (0.0, 360.0),
            precipitation_range: (0.0, 500.0),
        }
    }
}

impl ValidationConfig {
    fn ranges(&self) -> [(&'static str, (f64, f64)); 6] {
        [
            (columns::TEMPERATURE, self.temperature_range),
            (columns::HUMIDITY, self.humidity_range),
            (columns::PRESSURE, self.pressure_range),
            (columns::WIND_SPEED, self.wind_speed_range),
            (columns::WIND_DIRECTION, self.wind_direction_range),
            (columns::PRECIPITATION, self.precipitation_range),
        ]
    }
}

/// Range checker for weather fields.
///
/// Pollutants are not checked here; negative concentrations are handled by
/// the AQI calculator as undefined.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), IngestError> {
        if !value.is_finite() || value < range.0 || value > range.1 {
            Err(IngestError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Discard every out-of-range weather value; returns how many were dropped
    pub fn sanitize(&self, observation: &mut Observation) -> usize {
        let mut dropped = 0;
        for (field, range) in self.config.ranges() {
            let Some(value) = observation.get(field) else {
                continue;
            };
            if let Err(e) = self.validate_range(field, value, range) {
                warn!("{} at {}: discarded", e, observation.timestamp);
                observation.set(field, None);
                dropped += 1;
            }
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_humidity_bounds() {
        let validator = Validator::default();
        let range = ValidationConfig::default().humidity_range;
        assert!(validator.validate_range("humidity", 0.0, range).is_ok());
        assert!(validator.validate_range("humidity", 100.0, range).is_ok());
        assert!(validator.validate_range("humidity", 101.0, range).is_err());
        assert!(validator.validate_range("humidity", f64::NAN, range).is_err());
    }

    #[test]
    fn test_sanitize_drops_only_bad_fields() {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap();
        let mut obs = Observation::new(ts);
        obs.temperature = Some(25.0);
        obs.humidity = Some(140.0);
        obs.wind_direction = Some(400.0);
        obs.pm2_5 = Some(-3.0);

        let dropped = Validator::default().sanitize(&mut obs);
        assert_eq!(dropped, 2);
        assert_eq!(obs.temperature, Some(25.0));
        assert_eq!(obs.humidity, None);
        assert_eq!(obs.wind_direction, None);
        assert_eq!(obs.pm2_5, Some(-3.0));
    }
}
