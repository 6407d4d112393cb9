//! Hourly Observation Record

use crate::columns;
use aqi_calculator::{AqiCalculator, PollutantReadings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped weather + pollution observation.
///
/// Measurements are optional: providers do not always report every field, and
/// a missing value must stay distinguishable from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,

    /// Air temperature (°C)
    pub temperature: Option<f64>,
    /// Relative humidity (%)
    pub humidity: Option<f64>,
    /// Surface pressure (hPa)
    pub pressure: Option<f64>,
    /// Wind speed (m/s)
    pub wind_speed: Option<f64>,
    /// Wind direction (degrees)
    pub wind_direction: Option<f64>,
    /// Precipitation (mm)
    pub precipitation: Option<f64>,
    /// Dew point (°C)
    pub dew_point: Option<f64>,

    // Pollutant concentrations, all µg/m³
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
    pub nh3: Option<f64>,
    pub no: Option<f64>,

    /// EPA AQI (0-500) derived from the pollutant concentrations
    pub aqi: f64,
    /// Provider's own 1-5 index, kept for traceability
    pub openweather_aqi: Option<f64>,
}

impl Observation {
    /// Create an empty observation at the given time
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_direction: None,
            precipitation: None,
            dew_point: None,
            pm2_5: None,
            pm10: None,
            o3: None,
            no2: None,
            so2: None,
            co: None,
            nh3: None,
            no: None,
            aqi: 0.0,
            openweather_aqi: None,
        }
    }

    fn slot(&mut self, column: &str) -> Option<&mut Option<f64>> {
        let slot = match column {
            columns::TEMPERATURE => &mut self.temperature,
            columns::HUMIDITY => &mut self.humidity,
            columns::PRESSURE => &mut self.pressure,
            columns::WIND_SPEED => &mut self.wind_speed,
            columns::WIND_DIRECTION => &mut self.wind_direction,
            columns::PRECIPITATION => &mut self.precipitation,
            columns::DEW_POINT => &mut self.dew_point,
            columns::PM2_5 => &mut self.pm2_5,
            columns::PM10 => &mut self.pm10,
            columns::O3 => &mut self.o3,
            columns::NO2 => &mut self.no2,
            columns::SO2 => &mut self.so2,
            columns::CO => &mut self.co,
            columns::NH3 => &mut self.nh3,
            columns::NO => &mut self.no,
            columns::OPENWEATHER_AQI => &mut self.openweather_aqi,
            _ => return None,
        };
        Some(slot)
    }

    /// Value of a canonical column
    pub fn get(&self, column: &str) -> Option<f64> {
        match column {
            columns::AQI => Some(self.aqi),
            columns::TEMPERATURE => self.temperature,
            columns::HUMIDITY => self.humidity,
            columns::PRESSURE => self.pressure,
            columns::WIND_SPEED => self.wind_speed,
            columns::WIND_DIRECTION => self.wind_direction,
            columns::PRECIPITATION => self.precipitation,
            columns::DEW_POINT => self.dew_point,
            columns::PM2_5 => self.pm2_5,
            columns::PM10 => self.pm10,
            columns::O3 => self.o3,
            columns::NO2 => self.no2,
            columns::SO2 => self.so2,
            columns::CO => self.co,
            columns::NH3 => self.nh3,
            columns::NO => self.no,
            columns::OPENWEATHER_AQI => self.openweather_aqi,
            _ => None,
        }
    }

    /// Set a canonical measurement column. Returns `false` for unknown columns.
    pub fn set(&mut self, column: &str, value: Option<f64>) -> bool {
        if column == columns::AQI {
            self.aqi = value.unwrap_or(0.0);
            return true;
        }
        match self.slot(column) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Raw measurements in schema order
    pub fn measurements(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        columns::MEASUREMENTS.iter().map(move |&c| (c, self.get(c)))
    }

    /// The six AQI pollutants as calculator input
    pub fn pollutant_readings(&self) -> PollutantReadings {
        PollutantReadings {
            pm2_5: self.pm2_5,
            pm10: self.pm10,
            o3: self.o3,
            no2: self.no2,
            so2: self.so2,
            co: self.co,
        }
    }

    /// Recompute `aqi` from the current concentrations
    pub fn refresh_aqi(&mut self, calculator: &AqiCalculator) -> f64 {
        self.aqi = calculator.calculate(&self.pollutant_readings());
        self.aqi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_get_set_roundtrip_by_column() {
        let mut obs = Observation::new(at(0));
        assert!(obs.set("pm2_5", Some(35.0)));
        assert!(obs.set("humidity", Some(60.0)));
        assert!(!obs.set("unknown_field", Some(1.0)));
        assert_eq!(obs.get("pm2_5"), Some(35.0));
        assert_eq!(obs.humidity, Some(60.0));
        assert_eq!(obs.get("unknown_field"), None);
    }

    #[test]
    fn test_measurements_cover_schema() {
        let obs = Observation::new(at(1));
        let names: Vec<_> = obs.measurements().map(|(c, _)| c).collect();
        assert_eq!(names.len(), 15);
        assert_eq!(names[0], "temperature");
        assert_eq!(names[14], "no");
    }

    #[test]
    fn test_refresh_aqi_uses_pollutants() {
        let mut obs = Observation::new(at(2));
        obs.pm2_5 = Some(12.0);
        let aqi = obs.refresh_aqi(&AqiCalculator::default());
        assert_eq!(aqi, 50.0);
        assert_eq!(obs.get("aqi"), Some(50.0));
    }

    #[test]
    fn test_refresh_aqi_without_pollutants_is_zero() {
        let mut obs = Observation::new(at(3));
        obs.temperature = Some(20.0);
        assert_eq!(obs.refresh_aqi(&AqiCalculator::default()), 0.0);
    }
}
