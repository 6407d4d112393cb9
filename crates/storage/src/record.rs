//! Persisted Feature Record

use chrono::{DateTime, Utc};
use observation::FeatureRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Bookkeeping stored next to every record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Feature schema version
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub feature_count: usize,
}

/// Document shape: `{timestamp, aqi, features, metadata}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub aqi: f64,
    pub features: BTreeMap<String, f64>,
    pub metadata: RecordMetadata,
}

impl StoredRecord {
    /// Wrap a feature row for storage
    pub fn from_row(row: &FeatureRow, version: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: row.timestamp,
            aqi: row.aqi,
            features: row.features.clone(),
            metadata: RecordMetadata {
                version: version.to_string(),
                created_at: Utc::now(),
                feature_count: row.feature_count(),
            },
        }
    }

    /// Flatten back into a feature row
    pub fn to_row(&self) -> FeatureRow {
        FeatureRow {
            timestamp: self.timestamp,
            aqi: self.aqi,
            features: self.features.clone(),
        }
    }
}
