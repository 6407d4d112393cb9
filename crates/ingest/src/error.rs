//! Ingestion Error Types

use thiserror::Error;

/// Errors while reading or normalizing provider data
#[derive(Debug, Error)]
pub enum IngestError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Record has no `timestamp` or `dt` field
    #[error("Record has no timestamp")]
    MissingTimestamp,

    /// Timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Payload shape not understood
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// A data source failed to deliver
    #[error("Source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
