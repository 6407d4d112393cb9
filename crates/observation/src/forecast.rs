//! Daily Forecast Record

use aqi_calculator::AqiCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day of an AQI forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// "Day 1", "Day 2", ...
    pub day_label: String,
    pub date: NaiveDate,
    /// Predicted AQI, rounded to two decimals
    pub aqi: f64,
    pub category: AqiCategory,
    /// Projected instant the prediction was made for
    pub timestamp: DateTime<Utc>,
}

impl Forecast {
    /// Build the forecast for 1-based day `day`
    pub fn new(day: u32, timestamp: DateTime<Utc>, aqi: f64) -> Self {
        Self {
            day_label: format!("Day {}", day),
            date: timestamp.date_naive(),
            aqi,
            category: AqiCategory::from_aqi(aqi),
            timestamp,
        }
    }
}
