//! Observation Ingestion
//!
//! Turns raw provider records into canonical, validated, AQI-bearing
//! observations. Key aliases are resolved here once; nothing downstream
//! needs to know how a provider spelled `pm2_5`.

mod error;
mod merge;
mod normalizer;
mod retry;
mod source;
mod validator;

pub use error::IngestError;
pub use merge::{derive_dew_point, floor_to_hour, HourlyMerger};
pub use normalizer::{canonical_column, parse_timestamp, NormalizedRecord, Normalizer};
pub use retry::RetryPolicy;
pub use source::{records_from_json, DataSource, JsonFileSource};
pub use validator::{ValidationConfig, Validator};

/// A raw provider record, as decoded from JSON
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
