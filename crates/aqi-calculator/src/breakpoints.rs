//! EPA Breakpoint Tables
//!
//! Concentrations are in each pollutant's native unit: PM2.5 and PM10 in
//! µg/m³, O3/NO2/SO2 in ppb, CO in ppm.

use crate::round1;

/// One bracket of a breakpoint table: `[c_low, c_high]` maps onto `[i_low, i_high]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: f64,
    pub i_high: f64,
}

impl Breakpoint {
    const fn new(c_low: f64, c_high: f64, i_low: f64, i_high: f64) -> Self {
        Self {
            c_low,
            c_high,
            i_low,
            i_high,
        }
    }

    /// Whether the concentration falls inside this bracket (both edges inclusive)
    pub fn contains(&self, concentration: f64) -> bool {
        self.c_low <= concentration && concentration <= self.c_high
    }

    /// Linear interpolation inside the bracket
    pub fn interpolate(&self, concentration: f64) -> f64 {
        (self.i_high - self.i_low) / (self.c_high - self.c_low) * (concentration - self.c_low)
            + self.i_low
    }
}

/// An ordered breakpoint table and the index reported above its last bracket
#[derive(Debug, Clone, Copy)]
pub struct BreakpointTable {
    pub brackets: &'static [Breakpoint],
    /// Index assigned to any concentration above the highest bracket
    pub ceiling: f64,
}

impl BreakpointTable {
    /// Sub-index for a concentration in the table's native unit.
    ///
    /// Returns `None` for negative or non-finite input. Values above the table
    /// clamp to the ceiling. Values that land between two brackets (e.g. 12.05
    /// for PM2.5) take the upper index of the bracket below, so a reading that
    /// misses every bracket edge still contributes to the overall AQI instead
    /// of being treated as undefined.
    pub fn sub_index(&self, concentration: f64) -> Option<f64> {
        if !concentration.is_finite() || concentration < 0.0 {
            return None;
        }

        let mut below: Option<&Breakpoint> = None;
        for bracket in self.brackets {
            if bracket.contains(concentration) {
                return Some(round1(bracket.interpolate(concentration)));
            }
            if concentration > bracket.c_high {
                below = Some(bracket);
            }
        }

        match self.brackets.last() {
            Some(last) if concentration > last.c_high => Some(self.ceiling),
            _ => below.map(|bracket| bracket.i_high),
        }
    }

    /// Highest concentration covered by an explicit bracket
    pub fn upper_limit(&self) -> f64 {
        self.brackets.last().map(|b| b.c_high).unwrap_or(0.0)
    }
}

pub(crate) const PM2_5: BreakpointTable = BreakpointTable {
    brackets: &[
        Breakpoint::new(0.0, 12.0, 0.0, 50.0),
        Breakpoint::new(12.1, 35.4, 51.0, 100.0),
        Breakpoint::new(35.5, 55.4, 101.0, 150.0),
        Breakpoint::new(55.5, 150.4, 151.0, 200.0),
        Breakpoint::new(150.5, 250.4, 201.0, 300.0),
        Breakpoint::new(250.5, 350.4, 301.0, 400.0),
        Breakpoint::new(350.5, 500.4, 401.0, 500.0),
    ],
    ceiling: 500.0,
};

pub(crate) const PM10: BreakpointTable = BreakpointTable {
    brackets: &[
        Breakpoint::new(0.0, 54.0, 0.0, 50.0),
        Breakpoint::new(55.0, 154.0, 51.0, 100.0),
        Breakpoint::new(155.0, 254.0, 101.0, 150.0),
        Breakpoint::new(255.0, 354.0, 151.0, 200.0),
        Breakpoint::new(355.0, 424.0, 201.0, 300.0),
        Breakpoint::new(425.0, 504.0, 301.0, 400.0),
        Breakpoint::new(505.0, 604.0, 401.0, 500.0),
    ],
    ceiling: 500.0,
};

// 8-hour ozone; the 8-hour table stops at Very Unhealthy
pub(crate) const O3: BreakpointTable = BreakpointTable {
    brackets: &[
        Breakpoint::new(0.0, 54.0, 0.0, 50.0),
        Breakpoint::new(55.0, 70.0, 51.0, 100.0),
        Breakpoint::new(71.0, 85.0, 101.0, 150.0),
        Breakpoint::new(86.0, 105.0, 151.0, 200.0),
        Breakpoint::new(106.0, 200.0, 201.0, 300.0),
    ],
    ceiling: 300.0,
};

pub(crate) const NO2: BreakpointTable = BreakpointTable {
    brackets: &[
        Breakpoint::new(0.0, 53.0, 0.0, 50.0),
        Breakpoint::new(54.0, 100.0, 51.0, 100.0),
        Breakpoint::new(101.0, 360.0, 101.0, 150.0),
        Breakpoint::new(361.0, 649.0, 151.0, 200.0),
        Breakpoint::new(650.0, 1249.0, 201.0, 300.0),
        Breakpoint::new(1250.0, 1649.0, 301.0, 400.0),
        Breakpoint::new(1650.0, 2049.0, 401.0, 500.0),
    ],
    ceiling: 500.0,
};

pub(crate) const SO2: BreakpointTable = BreakpointTable {
    brackets: &[
        Breakpoint::new(0.0, 35.0, 0.0, 50.0),
        Breakpoint::new(36.0, 75.0, 51.0, 100.0),
        Breakpoint::new(76.0, 185.0, 101.0, 150.0),
        Breakpoint::new(186.0, 304.0, 151.0, 200.0),
        Breakpoint::new(305.0, 604.0, 201.0, 300.0),
        Breakpoint::new(605.0, 804.0, 301.0, 400.0),
        Breakpoint::new(805.0, 1004.0, 401.0, 500.0),
    ],
    ceiling: 500.0,
};

pub(crate) const CO: BreakpointTable = BreakpointTable {
    brackets: &[
        Breakpoint::new(0.0, 4.4, 0.0, 50.0),
        Breakpoint::new(4.5, 9.4, 51.0, 100.0),
        Breakpoint::new(9.5, 12.4, 101.0, 150.0),
        Breakpoint::new(12.5, 15.4, 151.0, 200.0),
        Breakpoint::new(15.5, 30.4, 201.0, 300.0),
        Breakpoint::new(30.5, 40.4, 301.0, 400.0),
        Breakpoint::new(40.5, 50.4, 401.0, 500.0),
    ],
    ceiling: 500.0,
};
