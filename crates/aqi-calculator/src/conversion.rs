//! Mass-to-Volume Unit Conversion
//!
//! Gaseous pollutants are reported in µg/m³ by providers but the EPA tables
//! are in ppb/ppm. The ideal-gas molar volume at the reference conditions
//! bridges the two.

use crate::{AqiError, Pollutant};
use serde::{Deserialize, Serialize};

/// Universal gas constant, kPa·L/(mol·K)
const GAS_CONSTANT: f64 = 8.314;

/// Reference conditions for the ideal-gas conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConversion {
    /// Reference temperature (K)
    pub temperature_k: f64,
    /// Reference pressure (kPa)
    pub pressure_kpa: f64,
}

impl Default for GasConversion {
    fn default() -> Self {
        Self {
            temperature_k: 298.15,
            pressure_kpa: 101.325,
        }
    }
}

impl GasConversion {
    /// Molar volume in litres per mole
    pub fn molar_volume(&self) -> f64 {
        GAS_CONSTANT * self.temperature_k / self.pressure_kpa
    }

    /// Convert µg/m³ to ppb
    pub fn ug_m3_to_ppb(&self, ug_m3: f64, molecular_weight: f64) -> f64 {
        ug_m3 / molecular_weight * self.molar_volume()
    }

    /// Convert µg/m³ to ppm
    pub fn ug_m3_to_ppm(&self, ug_m3: f64, molecular_weight: f64) -> f64 {
        self.ug_m3_to_ppb(ug_m3, molecular_weight) / 1000.0
    }

    pub fn validate(&self) -> Result<(), AqiError> {
        if !(self.temperature_k > 0.0) || !(self.pressure_kpa > 0.0) {
            return Err(AqiError::InvalidReference(format!(
                "temperature {} K, pressure {} kPa",
                self.temperature_k, self.pressure_kpa
            )));
        }
        Ok(())
    }
}

/// Molecular weights (g/mol) of the gaseous AQI pollutants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MolecularWeights {
    pub o3: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
}

impl Default for MolecularWeights {
    fn default() -> Self {
        Self {
            o3: 48.0,
            no2: 46.0,
            so2: 64.0,
            co: 28.0,
        }
    }
}

impl MolecularWeights {
    /// Molecular weight for a gaseous pollutant, `None` for particulates
    pub fn for_pollutant(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::O3 => Some(self.o3),
            Pollutant::No2 => Some(self.no2),
            Pollutant::So2 => Some(self.so2),
            Pollutant::Co => Some(self.co),
            Pollutant::Pm2_5 | Pollutant::Pm10 => None,
        }
    }

    pub fn validate(&self) -> Result<(), AqiError> {
        for (pollutant, value) in [("o3", self.o3), ("no2", self.no2), ("so2", self.so2), ("co", self.co)] {
            if !(value > 0.0) {
                return Err(AqiError::InvalidMolecularWeight { pollutant, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_molar_volume_at_reference() {
        let conv = GasConversion::default();
        // 8.314 * 298.15 / 101.325
        assert!((conv.molar_volume() - 24.4640).abs() < 1e-3);
    }

    #[test]
    fn test_ppb_conversion() {
        let conv = GasConversion::default();
        // 48 µg/m³ of O3 is one micromole per m³ -> molar volume in ppb
        let ppb = conv.ug_m3_to_ppb(48.0, 48.0);
        assert!((ppb - conv.molar_volume()).abs() < 1e-9);
    }

    #[test]
    fn test_ppm_is_thousandth_of_ppb() {
        let conv = GasConversion::default();
        let ppb = conv.ug_m3_to_ppb(1145.0, 28.0);
        let ppm = conv.ug_m3_to_ppm(1145.0, 28.0);
        assert!((ppb / 1000.0 - ppm).abs() < 1e-12);
    }

    #[test]
    fn test_particulates_have_no_weight() {
        let weights = MolecularWeights::default();
        assert_eq!(weights.for_pollutant(Pollutant::Pm10), None);
        assert_eq!(weights.for_pollutant(Pollutant::Co), Some(28.0));
    }

    #[test]
    fn test_validation() {
        assert!(GasConversion::default().validate().is_ok());
        let bad = GasConversion {
            temperature_k: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad_weights = MolecularWeights {
            so2: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_weights.validate(),
            Err(AqiError::InvalidMolecularWeight { pollutant: "so2", .. })
        ));
    }
}
