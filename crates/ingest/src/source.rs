//! Data Sources

use crate::{IngestError, RawRecord};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything that can deliver raw provider records
pub trait DataSource {
    /// Source name used in logs and errors
    fn name(&self) -> &str;

    /// Fetch all records currently available
    fn fetch(&self) -> Result<Vec<RawRecord>, IngestError>;
}

/// Extract records from a decoded payload.
///
/// Accepts a plain array of objects, an OpenWeather style `{"list": [...]}`
/// envelope, a single object, or an Open-Meteo style columnar
/// `{"hourly": {"time": [...], "<field>": [...]}}` block.
pub fn records_from_json(value: Value) -> Result<Vec<RawRecord>, IngestError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(IngestError::InvalidFormat(format!(
                    "expected object, found {}",
                    other
                ))),
            })
            .collect(),
        Value::Object(mut map) => {
            if let Some(list) = map.remove("list") {
                return records_from_json(list);
            }
            if let Some(Value::Object(hourly)) = map.remove("hourly") {
                return transpose_hourly(hourly);
            }
            Ok(vec![map])
        }
        other => Err(IngestError::InvalidFormat(format!(
            "unsupported payload: {}",
            other
        ))),
    }
}

fn transpose_hourly(hourly: Map<String, Value>) -> Result<Vec<RawRecord>, IngestError> {
    let times = match hourly.get("time") {
        Some(Value::Array(times)) => times,
        _ => return Err(IngestError::InvalidFormat("hourly block has no time array".into())),
    };

    let mut records = Vec::with_capacity(times.len());
    for (i, time) in times.iter().enumerate() {
        let mut record = Map::new();
        record.insert("timestamp".to_string(), time.clone());
        for (key, series) in &hourly {
            if key == "time" {
                continue;
            }
            if let Some(v) = series.as_array().and_then(|s| s.get(i)) {
                record.insert(key.clone(), v.clone());
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Raw records stored as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, IngestError> {
        let text = fs::read_to_string(&self.path).map_err(|e| IngestError::Source {
            source_name: self.name.clone(),
            message: format!("{}: {}", self.path.display(), e),
        })?;
        let records = records_from_json(serde_json::from_str(&text)?)?;
        info!("Fetched {} records from {}", records.len(), self.name);
        Ok(records)
    }
}
