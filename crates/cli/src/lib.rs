//! AQI Pipeline CLI
//!
//! Wires ingestion, feature engineering, the feature store, the model
//! registry and the forecast engine behind a small set of commands.

mod commands;
mod pipelines;
mod settings;

pub use commands::{execute, render_report, Command, USAGE};
pub use pipelines::{Pipeline, UpdateOutcome};
pub use settings::{LogFormat, LoggingSettings, Settings, StorageSettings, CONFIG_ENV};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Startup and argument errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Initialize logging; `RUST_LOG` overrides the configured level
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
