//! Application Settings
//!
//! Layered from an optional TOML file (`AQI_CONFIG`, default `aqi.toml`)
//! and `AQI__*` environment variables, e.g.
//! `AQI__STORAGE__BATCH_SIZE=500` or `AQI__LOGGING__FORMAT=json`.

use crate::CliError;
use alerting::AlertConfig;
use aqi_calculator::AqiConfig;
use config::{Config, Environment, File, FileFormat};
use feature_engine::FeatureConfig;
use forecast::ForecastConfig;
use ingest::{RetryPolicy, ValidationConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "AQI_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "aqi.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Historical feature records
    pub features_path: PathBuf,
    /// Latest hourly records, consulted when the history is empty
    pub current_path: Option<PathBuf>,
    pub models_path: PathBuf,
    /// Feature schema version written into record metadata
    pub schema_version: String,
    /// Documents per backfill insert
    pub batch_size: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            features_path: PathBuf::from("data/features.json"),
            current_path: None,
            models_path: PathBuf::from("data/models.json"),
            schema_version: storage::DEFAULT_VERSION.to_string(),
            batch_size: 1000,
        }
    }
}

/// Every component's configuration, assembled once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
    pub retry: RetryPolicy,
    pub validation: ValidationConfig,
    pub aqi: AqiConfig,
    pub features: FeatureConfig,
    pub forecast: ForecastConfig,
    pub alerts: AlertConfig,
}

impl Settings {
    /// Load from the file named by `AQI_CONFIG` (or `aqi.toml`) plus environment
    pub fn load() -> Result<Self, CliError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// A missing file is fine; defaults apply
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let settings: Settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("AQI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Configuration errors are fatal at startup
    pub fn validate(&self) -> Result<(), CliError> {
        let invalid = |msg: String| Err(CliError::InvalidSettings(msg));

        if self.storage.features_path.as_os_str().is_empty() {
            return invalid("storage.features_path is empty".into());
        }
        if self.storage.models_path.as_os_str().is_empty() {
            return invalid("storage.models_path is empty".into());
        }
        if self.storage.batch_size == 0 {
            return invalid("storage.batch_size must be at least 1".into());
        }
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1".into());
        }
        if let Err(e) = self.aqi.validate() {
            return invalid(e.to_string());
        }
        if let Err(e) = self.features.validate() {
            return invalid(e.to_string());
        }
        if let Err(e) = self.forecast.validate() {
            return invalid(e.to_string());
        }
        if let Err(e) = self.alerts.validate() {
            return invalid(e.to_string());
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            "Feature store: {}, models: {}, horizon {} days",
            self.storage.features_path.display(),
            self.storage.models_path.display(),
            self.forecast.horizon_days
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.forecast.horizon_days, 3);
        assert_eq!(settings.alerts.alert_threshold, 200.0);
        assert_eq!(settings.features.lags, vec![1, 6, 12, 24]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.storage.batch_size, 1000);
    }

    #[test]
    fn test_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aqi.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[logging]
format = "json"

[storage]
features_path = "/tmp/features.json"
batch_size = 50

[forecast]
horizon_days = 5

[features]
lags = [1, 2]
"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.storage.batch_size, 50);
        assert_eq!(settings.forecast.horizon_days, 5);
        assert_eq!(settings.forecast.history_window, 24);
        assert_eq!(settings.features.lags, vec![1, 2]);
        assert_eq!(settings.features.rolling_windows, vec![6, 12, 24]);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.alerts.severe_threshold = 100.0;
        assert!(matches!(settings.validate(), Err(CliError::InvalidSettings(_))));

        let mut settings = Settings::default();
        settings.storage.batch_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.features.rolling_windows.clear();
        assert!(settings.validate().is_err());
    }
}
