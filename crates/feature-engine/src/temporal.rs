//! Calendar Features

use crate::frame::FeatureFrame;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Calendar decomposition of a timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    /// Monday = 0
    pub weekday: u32,
    pub is_weekend: bool,
    /// 1 winter, 2 spring, 3 summer, 4 fall
    pub season: u8,
    /// 0 night, 1 morning, 2 afternoon, 3 evening
    pub time_of_day: u8,
}

impl TemporalFeatures {
    pub const COLUMNS: [&'static str; 8] = [
        "year",
        "month",
        "day",
        "hour",
        "weekday",
        "is_weekend",
        "season",
        "time_of_day",
    ];

    pub fn from_timestamp(ts: DateTime<Utc>) -> Self {
        let month = ts.month();
        let hour = ts.hour();
        let weekday = ts.weekday().num_days_from_monday();
        Self {
            year: ts.year(),
            month,
            day: ts.day(),
            hour,
            weekday,
            is_weekend: weekday >= 5,
            season: match month {
                12 | 1 | 2 => 1,
                3..=5 => 2,
                6..=8 => 3,
                _ => 4,
            },
            time_of_day: match hour {
                0..=5 => 0,
                6..=11 => 1,
                12..=17 => 2,
                _ => 3,
            },
        }
    }

    /// Values in `COLUMNS` order
    pub fn values(&self) -> [f64; 8] {
        [
            self.year as f64,
            self.month as f64,
            self.day as f64,
            self.hour as f64,
            self.weekday as f64,
            if self.is_weekend { 1.0 } else { 0.0 },
            self.season as f64,
            self.time_of_day as f64,
        ]
    }
}

/// Add every calendar column to the frame
pub fn add_temporal(frame: &mut FeatureFrame) {
    let decomposed: Vec<[f64; 8]> = frame
        .timestamps()
        .iter()
        .map(|&ts| TemporalFeatures::from_timestamp(ts).values())
        .collect();

    for (i, name) in TemporalFeatures::COLUMNS.iter().enumerate() {
        frame.insert_column(*name, decomposed.iter().map(|v| Some(v[i])).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_weekend_and_buckets() {
        // 2025-11-08 is a Saturday
        let ts = Utc.with_ymd_and_hms(2025, 11, 8, 13, 0, 0).unwrap();
        let t = TemporalFeatures::from_timestamp(ts);
        assert_eq!(t.weekday, 5);
        assert!(t.is_weekend);
        assert_eq!(t.season, 4);
        assert_eq!(t.time_of_day, 2);
    }

    #[test]
    fn test_quadrant_edges() {
        let at = |h| TemporalFeatures::from_timestamp(Utc.with_ymd_and_hms(2025, 1, 6, h, 0, 0).unwrap());
        assert_eq!(at(0).time_of_day, 0);
        assert_eq!(at(5).time_of_day, 0);
        assert_eq!(at(6).time_of_day, 1);
        assert_eq!(at(18).time_of_day, 3);
        assert_eq!(at(23).season, 1);
        assert!(!at(12).is_weekend);
    }
}
