//! Storage Layer
//!
//! Feature store and model registry on top of a timestamp-keyed document
//! collection. The in-memory collection can be mirrored to a JSON file so
//! state survives between CLI invocations.

mod collection;
mod file;
mod memory;
mod record;
mod registry;
mod store;

pub use collection::{DocumentCollection, InsertManyOutcome, Query, SortOrder};
pub use memory::MemoryCollection;
pub use record::{RecordMetadata, StoredRecord};
pub use registry::{MemoryModelRegistry, ModelDocument, ModelRegistry, ModelSummary, NewModel};
pub use store::{AppendOutcome, BatchOutcome, FeatureStore, DEFAULT_VERSION};

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Lock error: {0}")]
    Lock(String),
    /// Timestamp is the natural key of the feature collection
    #[error("Record for {timestamp} already exists")]
    DuplicateKey { timestamp: DateTime<Utc> },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex.lock().map_err(|e| StorageError::Lock(e.to_string()))
}
