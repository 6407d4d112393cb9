//! Feature Engineering Engine
//!
//! Derives temporal, lag, rolling, change-rate, interaction and alert-flag
//! features from an ascending observation series for AQI regression.

mod derived;
mod frame;
mod pipeline;
mod temporal;
mod window;

pub use derived::{add_alert_flags, add_change_rates, add_interactions, change_rate, INTERACTIONS};
pub use frame::{Column, FeatureFrame};
pub use pipeline::{FeatureConfig, FeaturePipeline};
pub use temporal::{add_temporal, TemporalFeatures};
pub use window::{add_lags, add_rolling, lag, rolling, WindowStats};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Feature engineering errors
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("No observations to engineer")]
    EmptyInput,

    #[error("Timestamps must be strictly ascending: {current} follows {previous}")]
    NotAscending {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// Every row still had a gap after filling
    #[error("All {rows} rows dropped: insufficient data for the requested features")]
    AllRowsDropped { rows: usize },

    #[error("Column '{column}' empty at {timestamp}")]
    MissingValue {
        column: String,
        timestamp: DateTime<Utc>,
    },

    #[error("Invalid feature configuration: {0}")]
    InvalidConfig(String),
}
