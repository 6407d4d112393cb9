//! Observation Data Model
//!
//! Canonical records shared by ingestion, feature engineering, storage and
//! forecasting. Column names are fixed here once so that every other crate
//! agrees on the schema.

mod feature_row;
mod forecast;
mod record;

pub use feature_row::FeatureRow;
pub use forecast::Forecast;
pub use record::Observation;

/// Canonical column names
pub mod columns {
    pub const TIMESTAMP: &str = "timestamp";
    pub const AQI: &str = "aqi";
    pub const OPENWEATHER_AQI: &str = "openweather_aqi";

    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const PRESSURE: &str = "pressure";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const WIND_DIRECTION: &str = "wind_direction";
    pub const PRECIPITATION: &str = "precipitation";
    pub const DEW_POINT: &str = "dew_point";

    pub const PM2_5: &str = "pm2_5";
    pub const PM10: &str = "pm10";
    pub const O3: &str = "o3";
    pub const NO2: &str = "no2";
    pub const SO2: &str = "so2";
    pub const CO: &str = "co";
    pub const NH3: &str = "nh3";
    pub const NO: &str = "no";

    /// Weather measurement columns
    pub const WEATHER: [&str; 7] = [
        TEMPERATURE,
        HUMIDITY,
        PRESSURE,
        WIND_SPEED,
        WIND_DIRECTION,
        PRECIPITATION,
        DEW_POINT,
    ];

    /// Pollutant measurement columns
    pub const POLLUTANTS: [&str; 8] = [PM2_5, PM10, O3, NO2, SO2, CO, NH3, NO];

    /// Every raw measurement column of an observation, in schema order
    pub const MEASUREMENTS: [&str; 15] = [
        TEMPERATURE,
        HUMIDITY,
        PRESSURE,
        WIND_SPEED,
        WIND_DIRECTION,
        PRECIPITATION,
        DEW_POINT,
        PM2_5,
        PM10,
        O3,
        NO2,
        SO2,
        CO,
        NH3,
        NO,
    ];
}
