//! Seed Sources

use observation::FeatureRow;
use storage::{DocumentCollection, FeatureStore, StorageError};

/// Supplies the recent history a forecast is seeded from
pub trait SeedSource {
    fn name(&self) -> &str;

    /// Up to `n` most recent rows, ascending by timestamp
    fn recent(&self, n: usize) -> Result<Vec<FeatureRow>, StorageError>;
}

impl<C: DocumentCollection> SeedSource for FeatureStore<C> {
    fn name(&self) -> &str {
        "feature_store"
    }

    fn recent(&self, n: usize) -> Result<Vec<FeatureRow>, StorageError> {
        self.last_n(n)
    }
}

impl<S: SeedSource + ?Sized> SeedSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recent(&self, n: usize) -> Result<Vec<FeatureRow>, StorageError> {
        (**self).recent(n)
    }
}

/// Fixed set of rows, e.g. the current observations computed in-process
#[derive(Debug, Clone, Default)]
pub struct StaticSeed {
    name: String,
    rows: Vec<FeatureRow>,
}

impl StaticSeed {
    pub fn new(name: impl Into<String>, mut rows: Vec<FeatureRow>) -> Self {
        rows.sort_by_key(|r| r.timestamp);
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl SeedSource for StaticSeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn recent(&self, n: usize) -> Result<Vec<FeatureRow>, StorageError> {
        let start = self.rows.len().saturating_sub(n);
        Ok(self.rows[start..].to_vec())
    }
}
