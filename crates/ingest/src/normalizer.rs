//! Provider Key Normalization

use crate::{IngestError, RawRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use observation::columns;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Map a provider key (or dotted nested path) to its canonical column
pub fn canonical_column(key: &str) -> Option<&'static str> {
    let key = key.to_ascii_lowercase();
    let column = match key.as_str() {
        "pm2_5" | "pm25" | "pm2.5" => columns::PM2_5,
        "pm10" => columns::PM10,
        "o3" => columns::O3,
        "no2" => columns::NO2,
        "so2" => columns::SO2,
        "co" => columns::CO,
        "nh3" => columns::NH3,
        "no" => columns::NO,
        "temperature" | "temp" | "temperature_2m" => columns::TEMPERATURE,
        "humidity" | "relative_humidity_2m" => columns::HUMIDITY,
        "pressure" | "surface_pressure" => columns::PRESSURE,
        "wind_speed" | "wind_speed_10m" | "wind.speed" => columns::WIND_SPEED,
        "wind_direction" | "wind_direction_10m" | "wind.deg" | "deg" => columns::WIND_DIRECTION,
        "precipitation" | "rain.1h" => columns::PRECIPITATION,
        "dew_point" | "dew_point_2m" | "dewpoint" => columns::DEW_POINT,
        "aqi" | "openweather_aqi" | "main.aqi" => columns::OPENWEATHER_AQI,
        _ => return None,
    };
    Some(column)
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or Unix seconds
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, IngestError> {
    match value {
        Value::Number(n) => {
            let secs = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| IngestError::InvalidTimestamp(n.to_string()))?;
            DateTime::from_timestamp(secs, 0).ok_or_else(|| IngestError::InvalidTimestamp(n.to_string()))
        }
        Value::String(s) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Ok(ts.with_timezone(&Utc));
            }
            for format in NAIVE_FORMATS {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Ok(naive.and_utc());
                }
            }
            match s.parse::<i64>() {
                Ok(secs) => DateTime::from_timestamp(secs, 0)
                    .ok_or_else(|| IngestError::InvalidTimestamp(s.clone())),
                Err(_) => Err(IngestError::InvalidTimestamp(s.clone())),
            }
        }
        other => Err(IngestError::InvalidTimestamp(other.to_string())),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A provider record with canonical keys
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<&'static str, f64>,
}

/// Resolves provider aliases into the canonical schema
#[derive(Debug, Default, Clone)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one record. Nested objects (`components`, `main`, `wind`)
    /// are flattened; unknown keys are dropped.
    pub fn normalize(&self, record: &RawRecord) -> Result<NormalizedRecord, IngestError> {
        let raw_ts = record
            .get(columns::TIMESTAMP)
            .or_else(|| record.get("dt"))
            .ok_or(IngestError::MissingTimestamp)?;
        let timestamp = parse_timestamp(raw_ts)?;

        let mut values = BTreeMap::new();
        for (key, value) in record {
            if key == columns::TIMESTAMP || key == "dt" {
                continue;
            }
            self.collect(key, key, value, &mut values);
        }

        Ok(NormalizedRecord { timestamp, values })
    }

    fn collect(&self, path: &str, leaf: &str, value: &Value, out: &mut BTreeMap<&'static str, f64>) {
        if let Value::Object(children) = value {
            for (key, child) in children {
                self.collect(&format!("{}.{}", path, key), key, child, out);
            }
            return;
        }

        let Some(column) = canonical_column(path).or_else(|| canonical_column(leaf)) else {
            debug!("Ignoring unknown field '{}'", path);
            return;
        };
        match as_number(value) {
            Some(v) => {
                out.insert(column, v);
            }
            None => debug!("Field '{}' is not numeric, skipped", path),
        }
    }
}
