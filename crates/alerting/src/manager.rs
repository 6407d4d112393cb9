//! Alert Manager Implementation

use crate::AlertError;
use aqi_calculator::AqiCategory;
use chrono::NaiveDate;
use observation::Forecast;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// AQI at or above which a day is flagged (default: 200, Unhealthy)
    pub alert_threshold: f64,
    /// Maximum AQI at or above which the message escalates (default: 300)
    pub severe_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 200.0,
            severe_threshold: 300.0,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), AlertError> {
        let ok = self.alert_threshold.is_finite()
            && self.severe_threshold.is_finite()
            && self.alert_threshold >= 0.0
            && self.severe_threshold >= self.alert_threshold;
        if !ok {
            return Err(AlertError::InvalidThresholds {
                alert: self.alert_threshold,
                severe: self.severe_threshold,
            });
        }
        Ok(())
    }
}

/// Severity of an evaluated forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    None,
    Alert,
    Severe,
}

/// A forecast day that crossed the alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDay {
    pub day: String,
    pub date: NaiveDate,
    pub aqi: f64,
    pub category: AqiCategory,
}

/// Alert derived from a list of forecasts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub has_alert: bool,
    pub alert_days: Vec<AlertDay>,
    pub max_aqi: f64,
    pub message: String,
    pub level: AlertLevel,
}

/// Stateless evaluator for forecast hazards
pub struct AlertManager {
    config: AlertConfig,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Map the highest predicted AQI to a level
    pub fn get_level(&self, max_aqi: f64, has_alert: bool) -> AlertLevel {
        if !has_alert {
            AlertLevel::None
        } else if max_aqi >= self.config.severe_threshold {
            AlertLevel::Severe
        } else {
            AlertLevel::Alert
        }
    }

    /// Evaluate every forecast day; `max_aqi` starts at 0
    pub fn evaluate(&self, forecasts: &[Forecast]) -> Alert {
        let mut max_aqi: f64 = 0.0;
        let mut alert_days = Vec::new();

        for forecast in forecasts {
            max_aqi = max_aqi.max(forecast.aqi);
            if forecast.aqi >= self.config.alert_threshold {
                debug!("{} crosses the alert threshold: {}", forecast.day_label, forecast.aqi);
                alert_days.push(AlertDay {
                    day: forecast.day_label.clone(),
                    date: forecast.date,
                    aqi: forecast.aqi,
                    category: forecast.category,
                });
            }
        }

        let has_alert = !alert_days.is_empty();
        let level = self.get_level(max_aqi, has_alert);
        let message = match level {
            AlertLevel::Severe => {
                "SEVERE ALERT: Very Unhealthy/Hazardous AQI levels predicted!".to_string()
            }
            AlertLevel::Alert => "ALERT: Unhealthy AQI levels predicted!".to_string(),
            AlertLevel::None => format!(
                "No hazardous AQI levels predicted for the next {} days",
                forecasts.len()
            ),
        };

        if has_alert {
            warn!("{} ({} days, max AQI {})", message, alert_days.len(), max_aqi);
        } else {
            info!("{}", message);
        }

        Alert {
            has_alert,
            alert_days,
            max_aqi,
            message,
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn forecasts(values: &[f64]) -> Vec<Forecast> {
        let start = Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &aqi)| Forecast::new(i as u32 + 1, start + Duration::days(i as i64 + 1), aqi))
            .collect()
    }

    #[test]
    fn test_severe_alert() {
        let manager = AlertManager::new(AlertConfig::default());
        let alert = manager.evaluate(&forecasts(&[80.0, 210.0, 310.0]));

        assert!(alert.has_alert);
        assert_eq!(alert.level, AlertLevel::Severe);
        assert_eq!(alert.max_aqi, 310.0);
        let days: Vec<&str> = alert.alert_days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["Day 2", "Day 3"]);
        assert!(alert.message.contains("SEVERE"));
        assert_eq!(alert.alert_days[1].category, AqiCategory::Hazardous);
    }

    #[test]
    fn test_no_hazard() {
        let manager = AlertManager::new(AlertConfig::default());
        let alert = manager.evaluate(&forecasts(&[40.0, 60.0, 90.0]));

        assert!(!alert.has_alert);
        assert!(alert.alert_days.is_empty());
        assert_eq!(alert.level, AlertLevel::None);
        assert_eq!(alert.max_aqi, 90.0);
        assert_eq!(
            alert.message,
            "No hazardous AQI levels predicted for the next 3 days"
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let manager = AlertManager::new(AlertConfig::default());
        let alert = manager.evaluate(&forecasts(&[200.0, 120.0]));
        assert!(alert.has_alert);
        assert_eq!(alert.level, AlertLevel::Alert);
        assert!(alert.message.starts_with("ALERT"));
    }

    #[test]
    fn test_empty_forecast() {
        let alert = AlertManager::new(AlertConfig::default()).evaluate(&[]);
        assert!(!alert.has_alert);
        assert_eq!(alert.max_aqi, 0.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(AlertConfig::default().validate().is_ok());
        let inverted = AlertConfig {
            alert_threshold: 300.0,
            severe_threshold: 200.0,
        };
        assert!(inverted.validate().is_err());

        let parsed: AlertConfig = serde_json::from_str(r#"{"alert_threshold": 150.0}"#).unwrap();
        assert_eq!(parsed.severe_threshold, 300.0);
    }
}
