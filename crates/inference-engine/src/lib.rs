//! AQI Inference Engine
//!
//! Applies a fitted scaler and regressor to feature rows. Models are trained
//! elsewhere; this crate only understands their serialized parameters.

mod artifact;
mod engine;
mod model;

pub use artifact::{ModelPayload, ModelSpec, ScalerPayload};
pub use engine::{round2, InferenceEngine};
pub use model::{FeatureScaler, IdentityScaler, LinearRegressor, Regressor, StandardScaler};

use storage::StorageError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("No active model in the registry")]
    NoActiveModel,
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    /// The row lacks a column the model was trained on
    #[error("Feature '{name}' missing from input row")]
    MissingFeature { name: String },
    #[error("Invalid model spec: {0}")]
    InvalidSpec(String),
    #[error("Artifact codec error: {0}")]
    Codec(#[from] postcard::Error),
    #[error("Registry error: {0}")]
    Storage(#[from] StorageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
