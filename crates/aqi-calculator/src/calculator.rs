//! AQI Calculator Implementation

use crate::conversion::{GasConversion, MolecularWeights};
use crate::pollutant::{ConcentrationUnit, Pollutant};
use crate::{round1, AqiError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Calculator configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AqiConfig {
    /// Reference conditions for µg/m³ -> ppb/ppm
    pub conversion: GasConversion,
    /// Molecular weights of the gaseous pollutants
    pub molecular_weights: MolecularWeights,
}

impl AqiConfig {
    /// Check that the reference conditions and weights are physically meaningful
    pub fn validate(&self) -> Result<(), AqiError> {
        self.conversion.validate()?;
        self.molecular_weights.validate()
    }
}

/// Raw pollutant concentrations as reported by providers, all in µg/m³
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReadings {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

impl PollutantReadings {
    /// Reading for a single pollutant
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm2_5 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::O3 => self.o3,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
        }
    }
}

/// Overall AQI together with the per-pollutant sub-indices it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiBreakdown {
    /// Overall AQI (max sub-index), 0.0 when nothing was defined
    pub aqi: f64,
    /// Pollutant with the highest sub-index
    pub dominant: Option<Pollutant>,
    /// Every defined sub-index, in evaluation order
    pub sub_indices: Vec<(Pollutant, f64)>,
}

/// Pure EPA AQI calculator
#[derive(Debug, Clone, Default)]
pub struct AqiCalculator {
    config: AqiConfig,
}

impl AqiCalculator {
    /// Create a calculator with the given configuration
    pub fn new(config: AqiConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &AqiConfig {
        &self.config
    }

    /// Sub-index for a concentration already in the pollutant's native unit
    pub fn aqi_for(&self, pollutant: Pollutant, concentration: f64) -> Option<f64> {
        pollutant.table().sub_index(concentration)
    }

    /// Convert a µg/m³ reading into the unit of the pollutant's table
    pub fn to_native_unit(&self, pollutant: Pollutant, ug_m3: f64) -> f64 {
        let weight = self.config.molecular_weights.for_pollutant(pollutant);
        match (pollutant.native_unit(), weight) {
            (ConcentrationUnit::PartsPerBillion, Some(mw)) => {
                self.config.conversion.ug_m3_to_ppb(ug_m3, mw)
            }
            (ConcentrationUnit::PartsPerMillion, Some(mw)) => {
                self.config.conversion.ug_m3_to_ppm(ug_m3, mw)
            }
            _ => ug_m3,
        }
    }

    /// Sub-index for a µg/m³ reading; `None` when absent or negative
    pub fn sub_index(&self, pollutant: Pollutant, ug_m3: Option<f64>) -> Option<f64> {
        let value = ug_m3?;
        if !value.is_finite() || value < 0.0 {
            trace!("{} reading {} is undefined", pollutant, value);
            return None;
        }
        let native = self.to_native_unit(pollutant, value);
        let index = self.aqi_for(pollutant, native);
        if native > pollutant.table().upper_limit() {
            debug!(
                "{} concentration {:.2} above table, clamped to {}",
                pollutant,
                native,
                pollutant.max_index()
            );
        }
        index
    }

    /// Compute every defined sub-index and the governing overall AQI
    pub fn breakdown(&self, readings: &PollutantReadings) -> AqiBreakdown {
        let sub_indices: Vec<(Pollutant, f64)> = Pollutant::ALL
            .iter()
            .filter_map(|&p| self.sub_index(p, readings.get(p)).map(|i| (p, i)))
            .collect();

        let mut dominant: Option<(Pollutant, f64)> = None;
        for &(pollutant, index) in &sub_indices {
            if dominant.map_or(true, |(_, best)| index > best) {
                dominant = Some((pollutant, index));
            }
        }

        AqiBreakdown {
            aqi: dominant.map(|(_, i)| round1(i)).unwrap_or(0.0),
            dominant: dominant.map(|(p, _)| p),
            sub_indices,
        }
    }

    /// Overall AQI: worst pollutant governs, 0.0 when no reading is usable
    pub fn calculate(&self, readings: &PollutantReadings) -> f64 {
        self.breakdown(readings).aqi
    }
}

/// Overall AQI with default reference conditions
pub fn calculate_epa_aqi(readings: &PollutantReadings) -> f64 {
    AqiCalculator::default().calculate(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pm25_boundary() {
        let calc = AqiCalculator::default();
        let at_edge = PollutantReadings {
            pm2_5: Some(12.0),
            ..Default::default()
        };
        let next = PollutantReadings {
            pm2_5: Some(12.1),
            ..Default::default()
        };
        assert_eq!(calc.calculate(&at_edge), 50.0);
        assert_eq!(calc.calculate(&next), 51.0);
    }

    #[test]
    fn test_between_brackets_still_counts() {
        let readings = PollutantReadings {
            pm2_5: Some(12.05),
            ..Default::default()
        };
        let breakdown = AqiCalculator::default().breakdown(&readings);
        assert_eq!(breakdown.aqi, 50.0);
        assert!(breakdown.dominant.is_some());
    }

    #[test]
    fn test_pm25_clamped_above_table() {
        let readings = PollutantReadings {
            pm2_5: Some(600.0),
            ..Default::default()
        };
        assert_eq!(calculate_epa_aqi(&readings), 500.0);
    }

    #[test]
    fn test_no_readings_defaults_to_zero() {
        assert_eq!(calculate_epa_aqi(&PollutantReadings::default()), 0.0);

        let negatives = PollutantReadings {
            pm2_5: Some(-1.0),
            pm10: Some(-3.0),
            o3: Some(-0.5),
            no2: None,
            so2: Some(-10.0),
            co: Some(-200.0),
        };
        let breakdown = AqiCalculator::default().breakdown(&negatives);
        assert_eq!(breakdown.aqi, 0.0);
        assert!(breakdown.dominant.is_none());
        assert!(breakdown.sub_indices.is_empty());
    }

    #[test]
    fn test_worst_pollutant_governs() {
        let readings = PollutantReadings {
            pm2_5: Some(40.0), // ~112
            pm10: Some(60.0),  // ~53
            ..Default::default()
        };
        let breakdown = AqiCalculator::default().breakdown(&readings);
        assert_eq!(breakdown.dominant, Some(Pollutant::Pm2_5));
        assert_eq!(breakdown.sub_indices.len(), 2);
        assert!(breakdown.aqi > 100.0);
    }

    #[test]
    fn test_gas_converted_before_lookup() {
        let calc = AqiCalculator::default();
        // 100 µg/m³ NO2 is ~53.2 ppb: the gap between the first two brackets
        let ppb = calc.to_native_unit(Pollutant::No2, 100.0);
        assert!((ppb - 53.18).abs() < 0.01);
        assert_eq!(calc.sub_index(Pollutant::No2, Some(100.0)), Some(50.0));

        // CO lands in ppm
        let ppm = calc.to_native_unit(Pollutant::Co, 1145.0);
        assert!((ppm - 1.0004).abs() < 0.001);
    }

    #[test]
    fn test_ozone_clamps_to_300() {
        let calc = AqiCalculator::default();
        // 1000 µg/m³ O3 is ~510 ppb
        assert_eq!(calc.sub_index(Pollutant::O3, Some(1000.0)), Some(300.0));
    }

    #[test]
    fn test_particulates_not_converted() {
        let calc = AqiCalculator::default();
        assert_eq!(calc.to_native_unit(Pollutant::Pm10, 123.0), 123.0);
    }

    fn reading() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![Just(None), (-50.0f64..3000.0).prop_map(Some)]
    }

    proptest! {
        #[test]
        fn prop_overall_is_max_of_sub_indices(
            pm2_5 in reading(), pm10 in reading(), o3 in reading(),
            no2 in reading(), so2 in reading(), co in reading(),
        ) {
            let calc = AqiCalculator::default();
            let readings = PollutantReadings { pm2_5, pm10, o3, no2, so2, co };
            let expected = Pollutant::ALL
                .iter()
                .filter_map(|&p| calc.sub_index(p, readings.get(p)))
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
                .unwrap_or(0.0);
            let aqi = calc.calculate(&readings);
            prop_assert_eq!(aqi, expected);
            prop_assert!((0.0..=500.0).contains(&aqi));
        }

        #[test]
        fn prop_sub_index_monotonic_for_pm25(a in 0.0f64..600.0, b in 0.0f64..600.0) {
            let calc = AqiCalculator::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let i_lo = calc.aqi_for(Pollutant::Pm2_5, lo).unwrap();
            let i_hi = calc.aqi_for(Pollutant::Pm2_5, hi).unwrap();
            prop_assert!(i_lo <= i_hi);
        }
    }
}
