//! Alerting
//!
//! Scans a multi-day AQI forecast for days at or above the Unhealthy
//! threshold and escalates the message when a day reaches the severe one.

mod manager;

pub use manager::{Alert, AlertConfig, AlertDay, AlertLevel, AlertManager};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AlertError {
    #[error("Invalid alert thresholds: alert {alert}, severe {severe}")]
    InvalidThresholds { alert: f64, severe: f64 },
}
