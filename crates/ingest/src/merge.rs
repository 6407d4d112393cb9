//! Hourly Weather/Pollution Merge

use crate::normalizer::{NormalizedRecord, Normalizer};
use crate::validator::Validator;
use crate::{IngestError, RawRecord};
use aqi_calculator::AqiCalculator;
use chrono::{DateTime, Duration, DurationRound, Utc};
use observation::Observation;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Truncate a timestamp to the start of its hour
pub fn floor_to_hour(ts: DateTime<Utc>) -> Result<DateTime<Utc>, IngestError> {
    ts.duration_trunc(Duration::hours(1))
        .map_err(|e| IngestError::InvalidTimestamp(format!("{}: {}", ts, e)))
}

/// Approximate dew point (°C) from temperature and relative humidity
pub fn derive_dew_point(temperature: f64, humidity: f64) -> f64 {
    temperature - (100.0 - humidity) / 5.0
}

type HourlyValues = BTreeMap<DateTime<Utc>, BTreeMap<&'static str, f64>>;

/// Joins weather and pollution feeds into canonical hourly observations
#[derive(Debug, Clone, Default)]
pub struct HourlyMerger {
    normalizer: Normalizer,
    validator: Validator,
    calculator: AqiCalculator,
}

impl HourlyMerger {
    pub fn new(validator: Validator, calculator: AqiCalculator) -> Self {
        Self {
            normalizer: Normalizer::new(),
            validator,
            calculator,
        }
    }

    fn bucket(&self, feed: &str, records: &[RawRecord]) -> Result<HourlyValues, IngestError> {
        let mut hours: HourlyValues = BTreeMap::new();
        for raw in records {
            let NormalizedRecord { timestamp, values } = match self.normalizer.normalize(raw) {
                Ok(rec) => rec,
                Err(e) => {
                    warn!("Skipping {} record: {}", feed, e);
                    continue;
                }
            };
            // Later records for the same hour win
            hours.insert(floor_to_hour(timestamp)?, values);
        }
        debug!("{} feed: {} records into {} hours", feed, records.len(), hours.len());
        Ok(hours)
    }

    /// Build one observation from already-canonical values
    pub fn build(&self, timestamp: DateTime<Utc>, values: &BTreeMap<&'static str, f64>) -> Observation {
        let mut obs = Observation::new(timestamp);
        for (&column, &value) in values {
            obs.set(column, Some(value));
        }
        self.validator.sanitize(&mut obs);

        if obs.dew_point.is_none() {
            if let (Some(t), Some(h)) = (obs.temperature, obs.humidity) {
                obs.dew_point = Some(derive_dew_point(t, h));
            }
        }

        obs.refresh_aqi(&self.calculator);
        obs
    }

    /// Inner-join both feeds on the hour; output is ascending and unique by
    /// timestamp with the EPA AQI filled in.
    pub fn merge(
        &self,
        weather: &[RawRecord],
        pollution: &[RawRecord],
    ) -> Result<Vec<Observation>, IngestError> {
        let weather = self.bucket("weather", weather)?;
        let pollution = self.bucket("pollution", pollution)?;

        let observations: Vec<Observation> = weather
            .iter()
            .filter_map(|(ts, w)| {
                let p = pollution.get(ts)?;
                let mut values = w.clone();
                values.extend(p.iter().map(|(&k, &v)| (k, v)));
                Some(self.build(*ts, &values))
            })
            .collect();

        info!(
            "Merged {} weather hours and {} pollution hours into {} observations",
            weather.len(),
            pollution.len(),
            observations.len()
        );
        Ok(observations)
    }
}
