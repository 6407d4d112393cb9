//! Hourly Update, Backfill and Forecast Pipelines

use crate::settings::Settings;
use anyhow::{Context, Result};
use aqi_calculator::AqiCalculator;
use feature_engine::FeaturePipeline;
use forecast::{ForecastEngine, ForecastReport};
use inference_engine::ModelSpec;
use ingest::{DataSource, HourlyMerger, RawRecord, Validator};
use observation::Observation;
use std::path::Path;
use storage::{
    AppendOutcome, BatchOutcome, FeatureStore, MemoryCollection, MemoryModelRegistry,
    ModelRegistry,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Counts from an hourly update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Merged hourly observations fetched
    pub observations: usize,
    /// Observations whose hour is already stored
    pub already_stored: usize,
    /// Unstored hours older than the latest record; appending them would
    /// break the ascending history
    pub out_of_order: usize,
    pub appended: AppendOutcome,
}

/// Stores and components opened from one set of settings
pub struct Pipeline {
    settings: Settings,
    store: FeatureStore<MemoryCollection>,
    current: Option<FeatureStore<MemoryCollection>>,
    registry: MemoryModelRegistry,
    merger: HourlyMerger,
    features: FeaturePipeline,
}

fn open_store(path: &Path, version: &str) -> Result<FeatureStore<MemoryCollection>> {
    let collection = MemoryCollection::open(path)
        .with_context(|| format!("Failed to open feature store {}", path.display()))?;
    Ok(FeatureStore::with_version(collection, version))
}

impl Pipeline {
    pub fn open(settings: Settings) -> Result<Self> {
        let version = settings.storage.schema_version.as_str();
        let store = open_store(&settings.storage.features_path, version)?;
        let current = match &settings.storage.current_path {
            Some(path) => Some(open_store(path, version)?),
            None => None,
        };
        let registry = MemoryModelRegistry::open(&settings.storage.models_path).with_context(|| {
            format!(
                "Failed to open model registry {}",
                settings.storage.models_path.display()
            )
        })?;
        let merger = HourlyMerger::new(
            Validator::new(settings.validation.clone()),
            AqiCalculator::new(settings.aqi),
        );
        let features = FeaturePipeline::new(settings.features.clone());

        Ok(Self {
            settings,
            store,
            current,
            registry,
            merger,
            features,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &FeatureStore<MemoryCollection> {
        &self.store
    }

    pub fn registry(&self) -> &MemoryModelRegistry {
        &self.registry
    }

    fn fetch(&self, source: &dyn DataSource) -> Result<Vec<RawRecord>> {
        let operation = format!("fetch {}", source.name());
        self.settings
            .retry
            .run(&operation, |_| source.fetch())
            .with_context(|| format!("Failed to fetch {}", source.name()))
    }

    /// Fetch both feeds and merge them into hourly observations
    pub fn observations(
        &self,
        weather: &dyn DataSource,
        pollution: &dyn DataSource,
    ) -> Result<Vec<Observation>> {
        let weather = self.fetch(weather)?;
        let pollution = self.fetch(pollution)?;
        let observations = self
            .merger
            .merge(&weather, &pollution)
            .context("Failed to merge weather and pollution records")?;
        if observations.is_empty() {
            anyhow::bail!("No hour is present in both the weather and pollution data");
        }
        Ok(observations)
    }

    /// Append features for hours newer than the latest stored record
    pub fn hourly_update(
        &self,
        weather: &dyn DataSource,
        pollution: &dyn DataSource,
    ) -> Result<UpdateOutcome> {
        let observations = self.observations(weather, pollution)?;
        let latest = self.store.latest()?.map(|r| r.timestamp);

        let mut outcome = UpdateOutcome {
            observations: observations.len(),
            ..Default::default()
        };
        let mut fresh = Vec::with_capacity(observations.len());
        for obs in observations {
            match latest {
                Some(ts) if obs.timestamp <= ts => {
                    if self.store.exists(obs.timestamp)? {
                        info!("Record for {} already exists, skipping", obs.timestamp);
                        outcome.already_stored += 1;
                    } else {
                        warn!(
                            "Record for {} is older than the latest stored hour {}, skipping",
                            obs.timestamp, ts
                        );
                        outcome.out_of_order += 1;
                    }
                }
                _ => fresh.push(obs),
            }
        }
        if fresh.is_empty() {
            return Ok(outcome);
        }

        let required = self.features.config().required_history();
        let history = self.store.last_n(required)?;
        if history.len() < required {
            warn!(
                "{} of {} history rows stored, lag and rolling features skipped",
                history.len(),
                required
            );
        }
        let rows = self
            .features
            .engineer_incremental(&history, &fresh)
            .context("Feature engineering failed for the hourly update")?;

        outcome.appended = self.store.append(&rows)?;
        if let Some(current) = &self.current {
            current.append(&rows)?;
        }
        info!(
            "Hourly update: {} new rows, AQI {:?}",
            outcome.appended.added,
            rows.last().map(|r| r.aqi)
        );
        Ok(outcome)
    }

    /// Engineer the full history and upload it in batches
    pub fn backfill(
        &self,
        weather: &dyn DataSource,
        pollution: &dyn DataSource,
    ) -> Result<BatchOutcome> {
        let observations = self.observations(weather, pollution)?;
        let rows = self
            .features
            .engineer(&observations, true)
            .context("Feature engineering failed for the backfill")?;
        let outcome = self
            .store
            .upload_batch(&rows, self.settings.storage.batch_size)?;
        Ok(outcome)
    }

    /// Run the forecast engine against the active model
    pub fn forecast(&self) -> Result<ForecastReport> {
        let mut engine = ForecastEngine::from_registry(
            &self.registry,
            &self.store,
            self.settings.forecast.clone(),
            self.settings.alerts.clone(),
        )
        .context("Cannot build the forecast engine")?;

        if let Some(path) = &self.settings.storage.current_path {
            let fallback = open_store(path, &self.settings.storage.schema_version)?;
            engine = engine.with_fallback(Box::new(fallback));
        }

        let report = engine.run().context("Forecast failed")?;
        Ok(report)
    }

    /// Import a model spec; it becomes the active model
    pub fn register_model(&self, path: &Path) -> Result<Uuid> {
        let spec = ModelSpec::from_file(path)
            .with_context(|| format!("Failed to read model spec {}", path.display()))?;
        let version = self.registry.next_version()?;
        let model = spec.into_new_model(version)?;
        let id = self.registry.save(model)?;
        Ok(id)
    }
}
