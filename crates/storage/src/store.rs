//! Feature Store Access

use crate::collection::{DocumentCollection, Query};
use crate::{StorageError, StoredRecord};
use chrono::{DateTime, Utc};
use metrics::counter;
use observation::FeatureRow;
use tracing::{debug, info, warn};

/// Default feature schema version written into record metadata
pub const DEFAULT_VERSION: &str = "v1.0";

/// Counts from an append
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub added: usize,
    /// Rows whose timestamp was already stored
    pub skipped: usize,
}

/// Counts from a batched upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub uploaded: usize,
    pub failed: usize,
    pub batches: usize,
}

/// Time-series access to stored feature rows, keyed by timestamp
pub struct FeatureStore<C> {
    collection: C,
    version: String,
}

impl<C: DocumentCollection> FeatureStore<C> {
    pub fn new(collection: C) -> Self {
        Self::with_version(collection, DEFAULT_VERSION)
    }

    /// Use a specific feature schema version for new records
    pub fn with_version(collection: C, version: impl Into<String>) -> Self {
        Self {
            collection,
            version: version.into(),
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Whether a record with exactly this timestamp is stored
    pub fn exists(&self, timestamp: DateTime<Utc>) -> Result<bool, StorageError> {
        Ok(self.collection.count(&Query::at(timestamp))? > 0)
    }

    /// Up to `n` most recent rows, returned in ascending timestamp order
    pub fn last_n(&self, n: usize) -> Result<Vec<FeatureRow>, StorageError> {
        let mut rows: Vec<FeatureRow> = self
            .collection
            .find(&Query::new().descending().limit(n))?
            .iter()
            .map(StoredRecord::to_row)
            .collect();
        rows.reverse();
        debug!("Fetched last {} rows (asked for {})", rows.len(), n);
        Ok(rows)
    }

    /// Most recent row
    pub fn latest(&self) -> Result<Option<FeatureRow>, StorageError> {
        Ok(self
            .collection
            .find_one(&Query::new().descending())?
            .map(|r| r.to_row()))
    }

    /// Insert rows whose timestamp is not stored yet; existing ones are
    /// skipped, never overwritten
    pub fn append(&self, rows: &[FeatureRow]) -> Result<AppendOutcome, StorageError> {
        let mut outcome = AppendOutcome::default();
        for row in rows {
            if self.exists(row.timestamp)? {
                debug!("Record for {} exists, skipped", row.timestamp);
                outcome.skipped += 1;
                continue;
            }
            self.collection
                .insert_one(StoredRecord::from_row(row, &self.version))?;
            outcome.added += 1;
        }

        counter!("feature_store_appended_total").increment(outcome.added as u64);
        counter!("feature_store_skipped_total").increment(outcome.skipped as u64);
        info!("Append: {} added, {} skipped", outcome.added, outcome.skipped);
        Ok(outcome)
    }

    /// Bulk insert in batches; a failing document does not block the others
    pub fn upload_batch(
        &self,
        rows: &[FeatureRow],
        batch_size: usize,
    ) -> Result<BatchOutcome, StorageError> {
        let mut outcome = BatchOutcome::default();
        for chunk in rows.chunks(batch_size.max(1)) {
            let documents = chunk
                .iter()
                .map(|row| StoredRecord::from_row(row, &self.version))
                .collect();
            let result = self.collection.insert_many(documents)?;
            for (timestamp, e) in &result.failures {
                warn!("Failed to upload record {}: {}", timestamp, e);
            }
            outcome.uploaded += result.inserted.len();
            outcome.failed += result.failures.len();
            outcome.batches += 1;
            debug!(
                "Batch {}: {} uploaded, {} failed",
                outcome.batches,
                result.inserted.len(),
                result.failures.len()
            );
        }

        counter!("feature_store_uploaded_total").increment(outcome.uploaded as u64);
        counter!("feature_store_batch_failures_total").increment(outcome.failed as u64);
        info!(
            "Uploaded {} records in {} batches ({} failed)",
            outcome.uploaded, outcome.batches, outcome.failed
        );
        Ok(outcome)
    }

    fn rows(&self, query: &Query) -> Result<Vec<FeatureRow>, StorageError> {
        Ok(self
            .collection
            .find(query)?
            .iter()
            .map(StoredRecord::to_row)
            .collect())
    }

    /// Ascending rows within `[start, end]`, optionally capped
    pub fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<FeatureRow>, StorageError> {
        let mut query = Query::new().since(start).until(end);
        query.limit = limit;
        self.rows(&query)
    }

    /// Every stored row in ascending order, optionally capped
    pub fn query_all(&self, limit: Option<usize>) -> Result<Vec<FeatureRow>, StorageError> {
        let mut query = Query::new();
        query.limit = limit;
        self.rows(&query)
    }

    /// Ascending rows at or after `cutoff`
    pub fn query_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<FeatureRow>, StorageError> {
        self.rows(&Query::new().since(cutoff))
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        self.collection.count(&Query::new())
    }

    /// Rewrite the schema version of every stored record
    pub fn restamp_version(&self, version: &str) -> Result<usize, StorageError> {
        let updated = self.collection.update_many(&Query::new(), &mut |record| {
            record.metadata.version = version.to_string();
        })?;
        info!("Marked {} records as feature schema {}", updated, version);
        Ok(updated)
    }

    /// Delete every record; returns how many were removed
    pub fn clear(&self) -> Result<usize, StorageError> {
        let deleted = self.collection.delete_many(&Query::new())?;
        warn!("Cleared {} records from the feature store", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCollection;
    use chrono::{Duration, TimeZone};

    fn row(hour: i64) -> FeatureRow {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap() + Duration::hours(hour);
        let mut r = FeatureRow::new(ts, 40.0 + hour as f64);
        r.set("pm2_5", 10.0 + hour as f64);
        r
    }

    fn store_with(hours: std::ops::Range<i64>) -> FeatureStore<MemoryCollection> {
        let store = FeatureStore::new(MemoryCollection::new());
        let rows: Vec<FeatureRow> = hours.map(row).collect();
        store.upload_batch(&rows, 7).unwrap();
        store
    }

    #[test]
    fn test_duplicate_append_is_noop() {
        let store = store_with(0..3);
        let mut changed = row(1);
        changed.aqi = 999.0;

        let outcome = store.append(&[changed, row(3)]).unwrap();
        assert_eq!(outcome, AppendOutcome { added: 1, skipped: 1 });
        assert_eq!(store.count().unwrap(), 4);

        let stored = store.query_range(row(1).timestamp, row(1).timestamp, None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].aqi, 41.0);
    }

    #[test]
    fn test_last_n_is_ascending() {
        let store = store_with(0..30);
        let rows = store.last_n(24).unwrap();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].timestamp, row(6).timestamp);
        assert_eq!(rows[23].timestamp, row(29).timestamp);
        assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(store.latest().unwrap().unwrap().aqi, 69.0);
    }

    #[test]
    fn test_last_n_on_empty_store() {
        let store = FeatureStore::new(MemoryCollection::new());
        assert!(store.last_n(24).unwrap().is_empty());
        assert!(store.latest().unwrap().is_none());
        assert!(!store.exists(row(0).timestamp).unwrap());
    }

    #[test]
    fn test_upload_batch_partial_failure() {
        let store = store_with(0..5);
        let rows: Vec<FeatureRow> = (3..10).map(row).collect();
        let outcome = store.upload_batch(&rows, 3).unwrap();
        assert_eq!(outcome.uploaded, 5);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.batches, 3);
        assert_eq!(store.count().unwrap(), 10);
    }

    #[test]
    fn test_queries_and_clear() {
        let store = store_with(0..10);
        assert_eq!(store.query_all(Some(4)).unwrap().len(), 4);
        assert_eq!(store.query_all(None).unwrap()[0].aqi, 40.0);
        assert_eq!(store.query_since(row(8).timestamp).unwrap().len(), 2);
        assert_eq!(
            store
                .query_range(row(2).timestamp, row(5).timestamp, Some(2))
                .unwrap()
                .iter()
                .map(|r| r.aqi)
                .collect::<Vec<_>>(),
            vec![42.0, 43.0]
        );
        assert_eq!(store.clear().unwrap(), 10);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_restamp_version() {
        let store = store_with(0..3);
        assert_eq!(store.restamp_version("v2.0").unwrap(), 3);
        let stored = store.collection().find(&Query::new()).unwrap();
        assert!(stored.iter().all(|r| r.metadata.version == "v2.0"));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_metadata_written() {
        let store = FeatureStore::with_version(MemoryCollection::new(), "v2.0");
        store.append(&[row(0)]).unwrap();
        let stored = store.collection().find(&Query::new()).unwrap();
        assert_eq!(stored[0].metadata.version, "v2.0");
        assert_eq!(stored[0].metadata.feature_count, 1);
    }
}
