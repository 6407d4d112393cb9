//! AQI Forecast Engine
//!
//! Seeds a multi-day forecast from the most recent stored feature row,
//! projects it forward with a pluggable strategy, runs the active model and
//! derives a hazard alert from the result.

mod engine;
mod projection;
mod seed;

pub use engine::{ForecastConfig, ForecastEngine, ForecastReport};
pub use projection::{PersistenceProjector, ProjectionStrategy, PROJECTED_COLUMNS};
pub use seed::{SeedSource, StaticSeed};

use alerting::AlertError;
use inference_engine::InferenceError;
use storage::StorageError;
use thiserror::Error;

/// Forecast errors
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Neither the feature store nor the fallback source returned a row
    #[error("No feature data available for prediction")]
    NoSeedData,

    #[error("Invalid forecast configuration: {0}")]
    InvalidConfig(String),

    #[error("Projection failed: {0}")]
    Projection(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Feature store error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Alert(#[from] AlertError),
}
