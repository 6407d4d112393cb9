//! Model Registry
//!
//! Stores serialized regressor/scaler pairs with their feature list. Exactly
//! one model is active at a time.

use crate::file::{read_json, write_json};
use crate::{lock, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// A registered model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub id: Uuid,
    pub model_name: String,
    pub version: String,
    pub model_bytes: Vec<u8>,
    pub scaler_bytes: Vec<u8>,
    /// Ordered columns the model was trained on
    pub feature_names: Vec<String>,
    pub n_features: usize,
    pub performance: BTreeMap<String, f64>,
    pub training_info: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Registry listing entry, without the artifact bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: Uuid,
    pub model_name: String,
    pub version: String,
    pub n_features: usize,
    pub performance: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&ModelDocument> for ModelSummary {
    fn from(doc: &ModelDocument) -> Self {
        Self {
            id: doc.id,
            model_name: doc.model_name.clone(),
            version: doc.version.clone(),
            n_features: doc.n_features,
            performance: doc.performance.clone(),
            created_at: doc.created_at,
            is_active: doc.is_active,
        }
    }
}

/// Input to [`ModelRegistry::save`]
#[derive(Debug, Clone, Default)]
pub struct NewModel {
    pub model_name: String,
    pub version: String,
    pub model_bytes: Vec<u8>,
    pub scaler_bytes: Vec<u8>,
    pub feature_names: Vec<String>,
    pub performance: BTreeMap<String, f64>,
    pub training_info: BTreeMap<String, Value>,
}

/// Model registry contract
pub trait ModelRegistry {
    /// Store a model and make it the only active one
    fn save(&self, model: NewModel) -> Result<Uuid, StorageError>;

    fn load_active(&self) -> Result<Option<ModelDocument>, StorageError>;

    /// Newest first
    fn list(&self, limit: usize) -> Result<Vec<ModelSummary>, StorageError>;

    fn get(&self, id: Uuid) -> Result<Option<ModelDocument>, StorageError>;

    /// Activate `id` and deactivate every other model
    fn set_active(&self, id: Uuid) -> Result<(), StorageError>;

    /// `v{N+1}` after the newest `vN`, `v1` for an empty registry
    fn next_version(&self) -> Result<String, StorageError>;
}

/// In-memory registry, optionally mirrored to a JSON file
pub struct MemoryModelRegistry {
    models: Mutex<Vec<ModelDocument>>,
    path: Option<PathBuf>,
}

impl MemoryModelRegistry {
    pub fn new() -> Self {
        Self {
            models: Mutex::new(Vec::new()),
            path: None,
        }
    }

    /// Open a file-backed registry
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let models: Vec<ModelDocument> = read_json(&path)?;
        info!("Model registry {} holds {} models", path.display(), models.len());
        Ok(Self {
            models: Mutex::new(models),
            path: Some(path),
        })
    }

    /// Apply `change` to a staged copy of the models; it replaces the live
    /// list only after the file write succeeded
    fn write<R>(
        &self,
        change: impl FnOnce(&mut Vec<ModelDocument>) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let mut models = lock(&self.models)?;
        let mut staged = models.clone();
        let result = change(&mut staged)?;
        if let Some(path) = &self.path {
            write_json(path, &staged)?;
        }
        *models = staged;
        Ok(result)
    }

    fn newest(models: &[ModelDocument]) -> Option<&ModelDocument> {
        models.iter().max_by_key(|m| m.created_at)
    }
}

impl Default for MemoryModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn bump_version(version: &str, fallback: usize) -> String {
    match version.trim_start_matches('v').parse::<u32>() {
        Ok(n) => format!("v{}", n + 1),
        Err(_) => format!("v{}", fallback + 1),
    }
}

impl ModelRegistry for MemoryModelRegistry {
    fn save(&self, model: NewModel) -> Result<Uuid, StorageError> {
        let doc = ModelDocument {
            id: Uuid::new_v4(),
            n_features: model.feature_names.len(),
            model_name: model.model_name,
            version: model.version,
            model_bytes: model.model_bytes,
            scaler_bytes: model.scaler_bytes,
            feature_names: model.feature_names,
            performance: model.performance,
            training_info: model.training_info,
            created_at: Utc::now(),
            is_active: true,
        };
        let id = doc.id;
        let (name, version) = (doc.model_name.clone(), doc.version.clone());

        self.write(|models| {
            for existing in models.iter_mut() {
                existing.is_active = false;
            }
            models.push(doc);
            Ok(())
        })?;
        info!("Saved model {} {} ({})", name, version, id);
        Ok(id)
    }

    fn load_active(&self) -> Result<Option<ModelDocument>, StorageError> {
        let models = lock(&self.models)?;
        let active = models.iter().find(|m| m.is_active).cloned();
        match &active {
            Some(m) => info!("Loaded active model {} {}", m.model_name, m.version),
            None => warn!("No active model found in registry"),
        }
        Ok(active)
    }

    fn list(&self, limit: usize) -> Result<Vec<ModelSummary>, StorageError> {
        let models = lock(&self.models)?;
        let mut summaries: Vec<ModelSummary> = models.iter().map(ModelSummary::from).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit);
        Ok(summaries)
    }

    fn get(&self, id: Uuid) -> Result<Option<ModelDocument>, StorageError> {
        let models = lock(&self.models)?;
        Ok(models.iter().find(|m| m.id == id).cloned())
    }

    fn set_active(&self, id: Uuid) -> Result<(), StorageError> {
        self.write(|models| {
            if !models.iter().any(|m| m.id == id) {
                return Err(StorageError::NotFound(format!("model {}", id)));
            }
            for model in models.iter_mut() {
                model.is_active = model.id == id;
            }
            Ok(())
        })?;
        info!("Activated model {}", id);
        Ok(())
    }

    fn next_version(&self) -> Result<String, StorageError> {
        let models = lock(&self.models)?;
        Ok(match Self::newest(&models) {
            Some(m) => bump_version(&m.version, models.len()),
            None => "v1".to_string(),
        })
    }
}
