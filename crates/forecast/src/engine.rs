//! Forecast Engine Implementation

use crate::projection::{PersistenceProjector, ProjectionStrategy};
use crate::seed::SeedSource;
use crate::ForecastError;
use alerting::{Alert, AlertConfig, AlertManager};
use chrono::{DateTime, Utc};
use inference_engine::InferenceEngine;
use metrics::counter;
use observation::{FeatureRow, Forecast};
use serde::{Deserialize, Serialize};
use storage::ModelRegistry;
use tracing::{debug, info, warn};

/// Forecast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Days to forecast (default: 3)
    pub horizon_days: u32,
    /// Stored rows fetched as history (default: 24)
    pub history_window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 3,
            history_window: 24,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidConfig("horizon_days must be at least 1".into()));
        }
        if self.history_window == 0 {
            return Err(ForecastError::InvalidConfig("history_window must be at least 1".into()));
        }
        Ok(())
    }
}

/// A complete forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub model_name: String,
    pub model_version: String,
    /// Timestamp of the row the projection was seeded from
    pub seed_timestamp: DateTime<Utc>,
    pub forecasts: Vec<Forecast>,
    pub alert: Alert,
}

/// Seed, project, predict, classify and alert
pub struct ForecastEngine<S> {
    inference: InferenceEngine,
    seeds: S,
    fallback: Option<Box<dyn SeedSource>>,
    projector: Box<dyn ProjectionStrategy>,
    alerts: AlertManager,
    config: ForecastConfig,
}

impl<S: SeedSource> ForecastEngine<S> {
    pub fn new(
        inference: InferenceEngine,
        seeds: S,
        config: ForecastConfig,
        alert_config: AlertConfig,
    ) -> Result<Self, ForecastError> {
        config.validate()?;
        alert_config.validate()?;
        info!(
            "Forecast engine ready: model {} {}, seeded from {}",
            inference.model_name(),
            inference.version(),
            seeds.name()
        );
        Ok(Self {
            inference,
            seeds,
            fallback: None,
            projector: Box::new(PersistenceProjector),
            alerts: AlertManager::new(alert_config),
            config,
        })
    }

    /// Load the registry's active model; fails when none is active
    pub fn from_registry<R: ModelRegistry + ?Sized>(
        registry: &R,
        seeds: S,
        config: ForecastConfig,
        alert_config: AlertConfig,
    ) -> Result<Self, ForecastError> {
        let inference = InferenceEngine::from_registry(registry)?;
        Self::new(inference, seeds, config, alert_config)
    }

    /// Source consulted when the primary one has no rows
    pub fn with_fallback(mut self, fallback: Box<dyn SeedSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_projector(mut self, projector: Box<dyn ProjectionStrategy>) -> Self {
        self.projector = projector;
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn inference(&self) -> &InferenceEngine {
        &self.inference
    }

    /// Recent ascending history from the primary source, else the fallback
    pub fn fetch_history(&self) -> Result<Vec<FeatureRow>, ForecastError> {
        let window = self.config.history_window;
        let mut rows = self.seeds.recent(window)?;

        if rows.is_empty() {
            if let Some(fallback) = &self.fallback {
                warn!(
                    "No recent data in {}, trying {}",
                    self.seeds.name(),
                    fallback.name()
                );
                rows = fallback.recent(window)?;
            }
        }

        if rows.is_empty() {
            return Err(ForecastError::NoSeedData);
        }
        info!("Fetched {} history rows", rows.len());
        Ok(rows)
    }

    fn forecast_days(&self, days: u32) -> Result<(DateTime<Utc>, Vec<Forecast>), ForecastError> {
        let history = self.fetch_history()?;
        let seed_timestamp = history
            .iter()
            .map(|r| r.timestamp)
            .max()
            .ok_or(ForecastError::NoSeedData)?;

        let projected = self.projector.project(&history, days)?;
        debug!(
            "Projected {} rows with {} strategy",
            projected.len(),
            self.projector.name()
        );
        let predictions = self.inference.predict_rows(&projected)?;

        let forecasts: Vec<Forecast> = projected
            .iter()
            .zip(predictions)
            .zip(1u32..)
            .map(|((row, aqi), day)| Forecast::new(day, row.timestamp, aqi))
            .collect();
        for f in &forecasts {
            info!("{} ({}): AQI = {:.2} ({})", f.day_label, f.date, f.aqi, f.category);
        }
        Ok((seed_timestamp, forecasts))
    }

    /// Forecast `days` days ahead, all projected from the same seed row
    pub fn predict_next_days(&self, days: u32) -> Result<Vec<Forecast>, ForecastError> {
        Ok(self.forecast_days(days)?.1)
    }

    pub fn predict_next_3_days(&self) -> Result<Vec<Forecast>, ForecastError> {
        self.predict_next_days(3)
    }

    pub fn check_alert(&self, forecasts: &[Forecast]) -> Alert {
        self.alerts.evaluate(forecasts)
    }

    /// Forecast the configured horizon and evaluate alerts
    pub fn run(&self) -> Result<ForecastReport, ForecastError> {
        let (seed_timestamp, forecasts) = self.forecast_days(self.config.horizon_days)?;
        let alert = self.check_alert(&forecasts);

        counter!("forecast_runs_total").increment(1);
        if alert.has_alert {
            counter!("forecast_alerts_total").increment(1);
        }

        Ok(ForecastReport {
            model_name: self.inference.model_name().to_string(),
            model_version: self.inference.version().to_string(),
            seed_timestamp,
            forecasts,
            alert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticSeed;
    use alerting::AlertLevel;
    use aqi_calculator::AqiCategory;
    use chrono::{Duration, TimeZone};
    use inference_engine::{IdentityScaler, InferenceError, LinearRegressor, ModelSpec};
    use storage::{FeatureStore, MemoryCollection, MemoryModelRegistry};

    fn row(hour: i64, pm2_5: f64) -> FeatureRow {
        let ts = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap() + Duration::hours(hour);
        let mut r = FeatureRow::new(ts, 90.0);
        r.set("pm2_5", pm2_5);
        r.set("weekday", 0.0);
        r
    }

    /// AQI = 2 * pm2_5 + 10 * weekday
    fn inference() -> InferenceEngine {
        InferenceEngine::new(
            Box::new(LinearRegressor::new(vec![2.0, 10.0], 0.0)),
            Box::new(IdentityScaler),
            vec!["pm2_5".into(), "weekday".into()],
            "linear",
            "v1",
        )
        .unwrap()
    }

    fn engine_with(rows: Vec<FeatureRow>) -> ForecastEngine<StaticSeed> {
        ForecastEngine::new(
            inference(),
            StaticSeed::new("history", rows),
            ForecastConfig::default(),
            AlertConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_three_day_forecast() {
        // seed is Monday 05:00 -> Tue, Wed, Thu
        let engine = engine_with((0..6).map(|h| row(h, 40.0 + h as f64)).collect());
        let forecasts = engine.predict_next_3_days().unwrap();

        let aqi: Vec<f64> = forecasts.iter().map(|f| f.aqi).collect();
        assert_eq!(aqi, vec![100.0, 110.0, 120.0]);
        assert_eq!(forecasts[0].day_label, "Day 1");
        assert_eq!(forecasts[2].date.to_string(), "2025-11-06");
        assert_eq!(forecasts[2].category, AqiCategory::UnhealthyForSensitiveGroups);
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let engine = engine_with((0..24).map(|h| row(h, 33.3)).collect());
        let first = engine.run().unwrap();
        let second = engine.run().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.forecasts.len(), 3);
    }

    #[test]
    fn test_alerting_report() {
        let engine = engine_with(vec![row(0, 150.0)]);
        let report = engine.run().unwrap();
        // 310, 320, 330
        assert!(report.alert.has_alert);
        assert_eq!(report.alert.level, AlertLevel::Severe);
        assert_eq!(report.alert.alert_days.len(), 3);
        assert_eq!(report.model_version, "v1");
        assert_eq!(report.seed_timestamp, row(0, 0.0).timestamp);
    }

    #[test]
    fn test_fallback_source() {
        let store = FeatureStore::new(MemoryCollection::new());
        let engine = ForecastEngine::new(
            inference(),
            &store,
            ForecastConfig::default(),
            AlertConfig::default(),
        )
        .unwrap();
        assert!(matches!(engine.run(), Err(ForecastError::NoSeedData)));

        let engine = engine.with_fallback(Box::new(StaticSeed::new("current", vec![row(0, 20.0)])));
        assert_eq!(engine.predict_next_days(1).unwrap()[0].aqi, 50.0);

        store.append(&[row(5, 30.0)]).unwrap();
        assert_eq!(engine.predict_next_days(1).unwrap()[0].aqi, 70.0);
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let registry = MemoryModelRegistry::new();
        let result = ForecastEngine::from_registry(
            &registry,
            StaticSeed::new("history", vec![row(0, 10.0)]),
            ForecastConfig::default(),
            AlertConfig::default(),
        );
        assert!(matches!(
            result,
            Err(ForecastError::Inference(InferenceError::NoActiveModel))
        ));
    }

    #[test]
    fn test_from_registry() {
        let registry = MemoryModelRegistry::new();
        let spec = ModelSpec::from_json(
            r#"{"name": "linear", "feature_names": ["pm2_5"], "coefficients": [1.0], "intercept": 0.5}"#,
        )
        .unwrap();
        registry.save(spec.into_new_model("v3".into()).unwrap()).unwrap();

        let engine = ForecastEngine::from_registry(
            &registry,
            StaticSeed::new("history", vec![row(0, 10.0)]),
            ForecastConfig { horizon_days: 5, ..Default::default() },
            AlertConfig::default(),
        )
        .unwrap();
        let report = engine.run().unwrap();
        assert_eq!(report.forecasts.len(), 5);
        assert!(report.forecasts.iter().all(|f| f.aqi == 10.5));
        assert_eq!(
            report.alert.message,
            "No hazardous AQI levels predicted for the next 5 days"
        );
    }

    #[test]
    fn test_missing_feature_surfaces() {
        let mut seed = row(0, 10.0);
        seed.features.remove("pm2_5");
        let engine = engine_with(vec![seed]);
        assert!(matches!(
            engine.predict_next_3_days(),
            Err(ForecastError::Inference(InferenceError::MissingFeature { .. }))
        ));
    }

    #[test]
    fn test_invalid_config() {
        let result = ForecastEngine::new(
            inference(),
            StaticSeed::default(),
            ForecastConfig { horizon_days: 0, ..Default::default() },
            AlertConfig::default(),
        );
        assert!(matches!(result, Err(ForecastError::InvalidConfig(_))));
    }
}
