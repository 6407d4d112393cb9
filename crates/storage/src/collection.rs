//! Document Collection Contract

use crate::{StorageError, StoredRecord};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Sort direction on the timestamp key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter, sort and limit over the timestamp key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Inclusive lower bound
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub until: Option<DateTime<Utc>>,
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exactly one timestamp
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self::new().since(timestamp).until(timestamp)
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.since = Some(start);
        self
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.until = Some(end);
        self
    }

    pub fn descending(mut self) -> Self {
        self.sort = SortOrder::Descending;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn matches(&self, timestamp: DateTime<Utc>) -> bool {
        self.since.map_or(true, |s| timestamp >= s) && self.until.map_or(true, |u| timestamp <= u)
    }
}

/// Result of an unordered bulk insert
#[derive(Debug, Default)]
pub struct InsertManyOutcome {
    pub inserted: Vec<Uuid>,
    /// Documents that failed, with the reason; the rest were still inserted
    pub failures: Vec<(DateTime<Utc>, StorageError)>,
}

/// A timestamp-keyed document collection.
///
/// Implementations enforce timestamp uniqueness: inserting a second document
/// for a stored timestamp fails with [`StorageError::DuplicateKey`].
pub trait DocumentCollection {
    fn find(&self, query: &Query) -> Result<Vec<StoredRecord>, StorageError>;

    fn find_one(&self, query: &Query) -> Result<Option<StoredRecord>, StorageError> {
        let mut query = query.clone();
        query.limit = Some(1);
        Ok(self.find(&query)?.into_iter().next())
    }

    fn insert_one(&self, record: StoredRecord) -> Result<Uuid, StorageError>;

    /// Insert every document independently; one failure does not stop the rest
    fn insert_many(&self, records: Vec<StoredRecord>) -> Result<InsertManyOutcome, StorageError>;

    /// Apply `update` to every matching document; returns how many matched.
    /// The timestamp key is not updatable.
    fn update_many(
        &self,
        query: &Query,
        update: &mut dyn FnMut(&mut StoredRecord),
    ) -> Result<usize, StorageError>;

    fn count(&self, query: &Query) -> Result<usize, StorageError>;

    fn delete_many(&self, query: &Query) -> Result<usize, StorageError>;
}
