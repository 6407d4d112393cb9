//! Pollutant Species

use crate::breakpoints::{self, BreakpointTable};
use crate::AqiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a breakpoint table is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    /// Micrograms per cubic metre
    MicrogramsPerCubicMeter,
    /// Parts per billion
    PartsPerBillion,
    /// Parts per million
    PartsPerMillion,
}

/// Pollutants that contribute to the EPA AQI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Pm2_5,
    Pm10,
    O3,
    No2,
    So2,
    Co,
}

impl Pollutant {
    /// All AQI pollutants in evaluation order
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm2_5,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
    ];

    /// Canonical column name
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::Pm2_5 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::O3 => "o3",
            Pollutant::No2 => "no2",
            Pollutant::So2 => "so2",
            Pollutant::Co => "co",
        }
    }

    /// Unit of the pollutant's breakpoint table
    pub fn native_unit(&self) -> ConcentrationUnit {
        match self {
            Pollutant::Pm2_5 | Pollutant::Pm10 => ConcentrationUnit::MicrogramsPerCubicMeter,
            Pollutant::O3 | Pollutant::No2 | Pollutant::So2 => ConcentrationUnit::PartsPerBillion,
            Pollutant::Co => ConcentrationUnit::PartsPerMillion,
        }
    }

    /// EPA breakpoint table for this pollutant
    pub fn table(&self) -> &'static BreakpointTable {
        match self {
            Pollutant::Pm2_5 => &breakpoints::PM2_5,
            Pollutant::Pm10 => &breakpoints::PM10,
            Pollutant::O3 => &breakpoints::O3,
            Pollutant::No2 => &breakpoints::NO2,
            Pollutant::So2 => &breakpoints::SO2,
            Pollutant::Co => &breakpoints::CO,
        }
    }

    /// Largest index this pollutant can report
    pub fn max_index(&self) -> f64 {
        self.table().ceiling
    }

    /// Whether concentrations must be converted from µg/m³ before lookup
    pub fn is_gas(&self) -> bool {
        self.native_unit() != ConcentrationUnit::MicrogramsPerCubicMeter
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pollutant {
    type Err = AqiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pm2_5" | "pm25" | "pm2.5" => Ok(Pollutant::Pm2_5),
            "pm10" => Ok(Pollutant::Pm10),
            "o3" => Ok(Pollutant::O3),
            "no2" => Ok(Pollutant::No2),
            "so2" => Ok(Pollutant::So2),
            "co" => Ok(Pollutant::Co),
            _ => Err(AqiError::UnknownPollutant(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("PM25".parse::<Pollutant>().unwrap(), Pollutant::Pm2_5);
        assert_eq!("pm2.5".parse::<Pollutant>().unwrap(), Pollutant::Pm2_5);
        assert_eq!("NO2".parse::<Pollutant>().unwrap(), Pollutant::No2);
        assert!("nh3".parse::<Pollutant>().is_err());
    }

    #[test]
    fn test_max_index() {
        assert_eq!(Pollutant::O3.max_index(), 300.0);
        for p in [Pollutant::Pm2_5, Pollutant::Pm10, Pollutant::No2, Pollutant::So2, Pollutant::Co] {
            assert_eq!(p.max_index(), 500.0);
        }
    }

    #[test]
    fn test_units() {
        assert!(!Pollutant::Pm10.is_gas());
        assert_eq!(Pollutant::Co.native_unit(), ConcentrationUnit::PartsPerMillion);
        assert_eq!(Pollutant::So2.native_unit(), ConcentrationUnit::PartsPerBillion);
    }
}
