//! In-Process Document Collection

use crate::collection::{DocumentCollection, InsertManyOutcome, Query, SortOrder};
use crate::file::{read_json, write_json};
use crate::{lock, StorageError, StoredRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

type Records = BTreeMap<DateTime<Utc>, StoredRecord>;

/// Timestamp-keyed collection held in memory, optionally mirrored to a
/// JSON file after every write
pub struct MemoryCollection {
    records: Mutex<Records>,
    path: Option<PathBuf>,
}

impl MemoryCollection {
    /// Create an empty, purely in-memory collection
    pub fn new() -> Self {
        info!("Creating in-memory feature collection");
        Self {
            records: Mutex::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Open a file-backed collection, loading existing documents
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let stored: Vec<StoredRecord> = read_json(&path)?;
        let records: Records = stored.into_iter().map(|r| (r.timestamp, r)).collect();
        info!("Opened {} with {} records", path.display(), records.len());
        Ok(Self {
            records: Mutex::new(records),
            path: Some(path),
        })
    }

    /// Apply `change` to the records. A file-backed collection applies it to
    /// a staged copy and keeps it only once the file write succeeded.
    fn write<R>(
        &self,
        change: impl FnOnce(&mut Records) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let mut records = lock(&self.records)?;
        let Some(path) = &self.path else {
            return change(&mut *records);
        };

        let mut staged = records.clone();
        let result = change(&mut staged)?;
        let all: Vec<&StoredRecord> = staged.values().collect();
        write_json(path, &all)?;
        debug!("Persisted {} records to {}", all.len(), path.display());
        *records = staged;
        Ok(result)
    }

    fn insert_locked(records: &mut Records, record: StoredRecord) -> Result<Uuid, StorageError> {
        if records.contains_key(&record.timestamp) {
            return Err(StorageError::DuplicateKey {
                timestamp: record.timestamp,
            });
        }
        let id = record.id;
        records.insert(record.timestamp, record);
        Ok(id)
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCollection for MemoryCollection {
    fn find(&self, query: &Query) -> Result<Vec<StoredRecord>, StorageError> {
        let records = lock(&self.records)?;
        let matching = records.values().filter(|r| query.matches(r.timestamp));
        let limit = query.limit.unwrap_or(usize::MAX);
        let found: Vec<StoredRecord> = match query.sort {
            SortOrder::Ascending => matching.take(limit).cloned().collect(),
            SortOrder::Descending => matching.rev().take(limit).cloned().collect(),
        };
        Ok(found)
    }

    fn insert_one(&self, record: StoredRecord) -> Result<Uuid, StorageError> {
        self.write(|records| Self::insert_locked(records, record))
    }

    fn insert_many(&self, batch: Vec<StoredRecord>) -> Result<InsertManyOutcome, StorageError> {
        self.write(|records| {
            let mut outcome = InsertManyOutcome::default();
            for record in batch {
                let timestamp = record.timestamp;
                match Self::insert_locked(records, record) {
                    Ok(id) => outcome.inserted.push(id),
                    Err(e) => outcome.failures.push((timestamp, e)),
                }
            }
            Ok(outcome)
        })
    }

    fn update_many(
        &self,
        query: &Query,
        update: &mut dyn FnMut(&mut StoredRecord),
    ) -> Result<usize, StorageError> {
        self.write(|records| {
            let mut matched = 0;
            for (timestamp, record) in records.iter_mut() {
                if !query.matches(*timestamp) {
                    continue;
                }
                update(record);
                record.timestamp = *timestamp;
                matched += 1;
            }
            Ok(matched)
        })
    }

    fn count(&self, query: &Query) -> Result<usize, StorageError> {
        let records = lock(&self.records)?;
        Ok(records.keys().filter(|ts| query.matches(**ts)).count())
    }

    fn delete_many(&self, query: &Query) -> Result<usize, StorageError> {
        self.write(|records| {
            let before = records.len();
            records.retain(|ts, _| !query.matches(*ts));
            Ok(before - records.len())
        })
    }
}
