//! Lag and Rolling-Window Features

use crate::frame::{Column, FeatureFrame};
use tracing::debug;

/// Statistics over one rolling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    /// Sample standard deviation, undefined for a single value
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl WindowStats {
    /// Compute statistics over the defined values; `None` when there are none
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let std_dev = if values.len() >= 2 {
            let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            Some((m2 / (n - 1.0)).sqrt())
        } else {
            None
        };

        Some(Self {
            mean,
            std_dev,
            min,
            max,
        })
    }
}

/// Value `lag` rows earlier; the first `lag` rows are empty
pub fn lag(values: &[Option<f64>], lag: usize) -> Column {
    (0..values.len())
        .map(|i| if i >= lag { values[i - lag] } else { None })
        .collect()
}

/// Trailing-window statistics per row, computed from whatever defined values
/// the window holds
pub fn rolling(values: &[Option<f64>], window: usize) -> Vec<Option<WindowStats>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let defined: Vec<f64> = values[start..=i].iter().flatten().copied().collect();
            WindowStats::compute(&defined)
        })
        .collect()
}

/// Add `{col}_lag_{k}` for every configured column present in the frame
pub fn add_lags(frame: &mut FeatureFrame, columns: &[String], lags: &[usize]) {
    for name in columns {
        let Some(values) = frame.column(name).map(<[Option<f64>]>::to_vec) else {
            debug!("Lag source '{}' absent, skipped", name);
            continue;
        };
        for &k in lags {
            frame.insert_column(format!("{}_lag_{}", name, k), lag(&values, k));
        }
    }
}

/// Add rolling mean/std/min/max columns, `{col}_rolling_{stat}_{w}h`
pub fn add_rolling(frame: &mut FeatureFrame, columns: &[String], windows: &[usize]) {
    for name in columns {
        let Some(values) = frame.column(name).map(<[Option<f64>]>::to_vec) else {
            debug!("Rolling source '{}' absent, skipped", name);
            continue;
        };
        for &w in windows {
            let stats = rolling(&values, w);
            frame.insert_column(
                format!("{}_rolling_mean_{}h", name, w),
                stats.iter().map(|s| s.map(|s| s.mean)).collect(),
            );
            frame.insert_column(
                format!("{}_rolling_std_{}h", name, w),
                stats.iter().map(|s| s.and_then(|s| s.std_dev)).collect(),
            );
            frame.insert_column(
                format!("{}_rolling_min_{}h", name, w),
                stats.iter().map(|s| s.map(|s| s.min)).collect(),
            );
            frame.insert_column(
                format!("{}_rolling_max_{}h", name, w),
                stats.iter().map(|s| s.map(|s| s.max)).collect(),
            );
        }
    }
}
