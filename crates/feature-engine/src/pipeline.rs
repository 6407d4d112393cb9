//! Feature Pipeline Composition

use crate::derived::{add_alert_flags, add_change_rates, add_interactions};
use crate::frame::FeatureFrame;
use crate::temporal::add_temporal;
use crate::window::{add_lags, add_rolling};
use crate::FeatureError;
use observation::{FeatureRow, Observation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Feature engineering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Columns that receive lag features
    pub lag_columns: Vec<String>,
    /// Lag offsets in rows
    pub lags: Vec<usize>,
    /// Columns that receive rolling statistics
    pub rolling_columns: Vec<String>,
    /// Rolling window sizes in rows
    pub rolling_windows: Vec<usize>,
    /// Columns that receive a change rate
    pub change_rate_columns: Vec<String>,
    /// `high_pollution_alert` fires above this EPA category ordinal
    pub high_pollution_ordinal: u8,
    /// `rain_alert` fires above this precipitation (mm)
    pub rain_threshold: f64,
    /// `high_pm2_5_alert` fires above this concentration (µg/m³)
    pub high_pm2_5_threshold: f64,
    /// `high_temp_alert` fires above this temperature (°C)
    pub high_temp_threshold: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        let tracked = ["aqi", "pm2_5", "pm10", "co", "no2"];
        Self {
            lag_columns: names(&tracked),
            lags: vec![1, 6, 12, 24],
            rolling_columns: names(&tracked),
            rolling_windows: vec![6, 12, 24],
            change_rate_columns: names(&[
                "pm2_5",
                "pm10",
                "co",
                "no2",
                "temperature",
                "humidity",
                "wind_speed",
            ]),
            high_pollution_ordinal: 3,
            rain_threshold: 0.0,
            high_pm2_5_threshold: 15.0,
            high_temp_threshold: 35.0,
        }
    }
}

impl FeatureConfig {
    /// Reject configurations that cannot produce lag/rolling features
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.lags.is_empty() || self.lags.contains(&0) {
            return Err(FeatureError::InvalidConfig(
                "lags must be a non-empty list of positive offsets".into(),
            ));
        }
        if self.rolling_windows.is_empty() || self.rolling_windows.contains(&0) {
            return Err(FeatureError::InvalidConfig(
                "rolling_windows must be a non-empty list of positive sizes".into(),
            ));
        }
        Ok(())
    }

    /// Rows of history needed before every lag and window is fully populated
    pub fn required_history(&self) -> usize {
        let max_lag = self.lags.iter().copied().max().unwrap_or(0);
        let max_window = self.rolling_windows.iter().copied().max().unwrap_or(0);
        max_lag.max(max_window)
    }
}

/// Applies the transforms in their fixed order, then fills and drops gaps
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: FeatureConfig,
}

impl FeaturePipeline {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Temporal, then lag and rolling when requested, then change rate,
    /// interactions and alert flags. Leaves gaps in place.
    pub fn transform(&self, frame: &mut FeatureFrame, include_lags: bool) {
        add_temporal(frame);
        if include_lags {
            add_lags(frame, &self.config.lag_columns, &self.config.lags);
            add_rolling(frame, &self.config.rolling_columns, &self.config.rolling_windows);
        } else {
            info!("Lag and rolling features skipped for {} rows", frame.len());
        }
        add_change_rates(frame, &self.config.change_rate_columns);
        add_interactions(frame);
        add_alert_flags(frame, &self.config);
    }

    /// Full pass: transform, forward-fill, backward-fill, drop incomplete rows
    pub fn apply(&self, mut frame: FeatureFrame, include_lags: bool) -> Result<FeatureFrame, FeatureError> {
        let input_rows = frame.len();
        self.transform(&mut frame, include_lags);

        frame.fill_forward();
        frame.fill_backward();
        let dropped = frame.drop_incomplete();

        if frame.is_empty() {
            return Err(FeatureError::AllRowsDropped { rows: input_rows });
        }
        debug!(
            "Feature pass: {} rows in, {} dropped, {} columns",
            input_rows,
            dropped,
            frame.column_names().count()
        );
        Ok(frame)
    }

    /// Engineer features for a whole ascending observation series
    pub fn engineer(
        &self,
        observations: &[Observation],
        include_lags: bool,
    ) -> Result<Vec<FeatureRow>, FeatureError> {
        let frame = FeatureFrame::from_observations(observations)?;
        let rows = self.apply(frame, include_lags)?.to_rows()?;
        info!("Engineered {} feature rows from {} observations", rows.len(), observations.len());
        Ok(rows)
    }

    /// Engineer features for new observations on top of stored history.
    ///
    /// Only rows for the new observations are returned. With fewer than
    /// `required_history()` stored rows the lag and rolling features are
    /// skipped rather than failing.
    pub fn engineer_incremental(
        &self,
        history: &[FeatureRow],
        observations: &[Observation],
    ) -> Result<Vec<FeatureRow>, FeatureError> {
        if observations.is_empty() {
            return Err(FeatureError::EmptyInput);
        }
        if history.is_empty() {
            return self.engineer(observations, false);
        }

        let required = self.config.required_history();
        let include_lags = history.len() >= required;
        if !include_lags {
            info!(
                "Only {} of {} history rows stored, lag and rolling features skipped",
                history.len(),
                required
            );
        }

        let mut frame = FeatureFrame::from_rows(history)?;
        frame.extend_with_observations(observations)?;
        let frame = self.apply(frame, include_lags)?;

        let first_new = observations[0].timestamp;
        let rows: Vec<FeatureRow> = frame
            .to_rows()?
            .into_iter()
            .filter(|r| r.timestamp >= first_new)
            .collect();
        info!(
            "Engineered {} new rows against {} rows of history",
            rows.len(),
            history.len()
        );
        Ok(rows)
    }
}
