//! AQI Calculator
//!
//! Converts pollutant concentrations to the US EPA Air Quality Index (0-500)
//! using piecewise-linear breakpoint tables. The overall index is governed by
//! the worst pollutant.

mod breakpoints;
mod calculator;
mod category;
mod conversion;
mod pollutant;

pub use breakpoints::{Breakpoint, BreakpointTable};
pub use calculator::{calculate_epa_aqi, AqiBreakdown, AqiCalculator, AqiConfig, PollutantReadings};
pub use category::AqiCategory;
pub use conversion::{GasConversion, MolecularWeights};
pub use pollutant::{ConcentrationUnit, Pollutant};

use thiserror::Error;

/// Errors raised by the AQI calculator
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AqiError {
    #[error("Unknown pollutant: {0}")]
    UnknownPollutant(String),
    #[error("Invalid reference conditions: {0}")]
    InvalidReference(String),
    #[error("Invalid molecular weight for {pollutant}: {value}")]
    InvalidMolecularWeight { pollutant: &'static str, value: f64 },
}

/// Round to one decimal place, the precision AQI values are reported at
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
