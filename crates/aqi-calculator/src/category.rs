//! AQI Categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPA health category for an AQI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Classify an AQI value; each upper bound is inclusive
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            AqiCategory::Good
        } else if aqi <= 100.0 {
            AqiCategory::Moderate
        } else if aqi <= 150.0 {
            AqiCategory::UnhealthyForSensitiveGroups
        } else if aqi <= 200.0 {
            AqiCategory::Unhealthy
        } else if aqi <= 300.0 {
            AqiCategory::VeryUnhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Health message for the category
    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is satisfactory",
            AqiCategory::Moderate => "Air quality is acceptable",
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Sensitive groups may experience health effects"
            }
            AqiCategory::Unhealthy => "Everyone may begin to experience health effects",
            AqiCategory::VeryUnhealthy => "Health alert: everyone may experience serious effects",
            AqiCategory::Hazardous => "Health warning of emergency conditions",
        }
    }

    /// EPA palette colour
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00e400",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::UnhealthyForSensitiveGroups => "#ff7e00",
            AqiCategory::Unhealthy => "#ff0000",
            AqiCategory::VeryUnhealthy => "#8f3f97",
            AqiCategory::Hazardous => "#7e0023",
        }
    }

    /// 1-based severity rank (Good = 1, Hazardous = 6)
    pub fn ordinal(&self) -> u8 {
        match self {
            AqiCategory::Good => 1,
            AqiCategory::Moderate => 2,
            AqiCategory::UnhealthyForSensitiveGroups => 3,
            AqiCategory::Unhealthy => 4,
            AqiCategory::VeryUnhealthy => 5,
            AqiCategory::Hazardous => 6,
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_upper_bounds() {
        assert_eq!(AqiCategory::from_aqi(0.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.01), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(100.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(150.0), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_aqi(200.0), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300.0), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(300.5), AqiCategory::Hazardous);
    }

    #[test]
    fn test_ordinal_tracks_severity() {
        assert!(AqiCategory::Hazardous > AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(151.0).ordinal(), 4);
        assert_eq!(AqiCategory::from_aqi(42.0).ordinal(), 1);
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(
            AqiCategory::UnhealthyForSensitiveGroups.to_string(),
            "Unhealthy for Sensitive Groups"
        );
    }
}
