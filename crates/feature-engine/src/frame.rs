//! Columnar Feature Frame

use crate::FeatureError;
use chrono::{DateTime, Utc};
use observation::{columns, FeatureRow, Observation};
use std::collections::BTreeMap;
use tracing::debug;

/// A column of optional values, one per frame row
pub type Column = Vec<Option<f64>>;

/// Time-indexed table of optional values.
///
/// Rows are strictly ascending by timestamp. `aqi` is always present; other
/// columns appear only when at least one input row defines them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    timestamps: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Column>,
}

fn check_ascending(
    previous: Option<DateTime<Utc>>,
    timestamps: impl Iterator<Item = DateTime<Utc>>,
) -> Result<(), FeatureError> {
    let mut previous = previous;
    for ts in timestamps {
        if let Some(prev) = previous {
            if ts <= prev {
                return Err(FeatureError::NotAscending {
                    previous: prev,
                    current: ts,
                });
            }
        }
        previous = Some(ts);
    }
    Ok(())
}

impl FeatureFrame {
    /// Build a frame from raw observations
    pub fn from_observations(observations: &[Observation]) -> Result<Self, FeatureError> {
        if observations.is_empty() {
            return Err(FeatureError::EmptyInput);
        }
        let mut frame = Self::default();
        frame.extend_with_observations(observations)?;
        Ok(frame)
    }

    /// Build a frame from stored feature rows
    pub fn from_rows(rows: &[FeatureRow]) -> Result<Self, FeatureError> {
        if rows.is_empty() {
            return Err(FeatureError::EmptyInput);
        }
        check_ascending(None, rows.iter().map(|r| r.timestamp))?;

        let mut table: BTreeMap<String, Column> = BTreeMap::new();
        table.insert(
            columns::AQI.to_string(),
            rows.iter().map(|r| Some(r.aqi)).collect(),
        );
        for (i, row) in rows.iter().enumerate() {
            for (name, &value) in &row.features {
                table
                    .entry(name.clone())
                    .or_insert_with(|| vec![None; rows.len()])[i] = Some(value);
            }
        }

        Ok(Self {
            timestamps: rows.iter().map(|r| r.timestamp).collect(),
            columns: table,
        })
    }

    /// Append observations after the current last row
    pub fn extend_with_observations(
        &mut self,
        observations: &[Observation],
    ) -> Result<(), FeatureError> {
        check_ascending(
            self.timestamps.last().copied(),
            observations.iter().map(|o| o.timestamp),
        )?;

        let old_len = self.len();
        let new_len = old_len + observations.len();

        let mut incoming: Vec<(&'static str, Column)> = vec![(
            columns::AQI,
            observations.iter().map(|o| Some(o.aqi)).collect(),
        )];
        for &name in columns::MEASUREMENTS.iter().chain([columns::OPENWEATHER_AQI].iter()) {
            let values: Column = observations.iter().map(|o| o.get(name)).collect();
            if values.iter().any(Option::is_some) {
                incoming.push((name, values));
            }
        }

        for (name, values) in incoming {
            let column = self
                .columns
                .entry(name.to_string())
                .or_insert_with(|| vec![None; old_len]);
            column.extend(values);
        }
        for column in self.columns.values_mut() {
            column.resize(new_len, None);
        }
        self.timestamps.extend(observations.iter().map(|o| o.timestamp));

        debug!("Frame extended by {} rows to {}", observations.len(), new_len);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Insert or replace a column; `values` must have one entry per row
    pub(crate) fn insert_column(&mut self, name: impl Into<String>, values: Column) {
        debug_assert_eq!(values.len(), self.len());
        self.columns.insert(name.into(), values);
    }

    /// Number of empty cells across the frame
    pub fn empty_count(&self) -> usize {
        self.columns
            .values()
            .map(|c| c.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    /// Fill each gap with the nearest earlier value in its column
    pub fn fill_forward(&mut self) {
        for column in self.columns.values_mut() {
            let mut last = None;
            for value in column.iter_mut() {
                match *value {
                    Some(v) => last = Some(v),
                    None => *value = last,
                }
            }
        }
    }

    /// Fill each gap with the nearest later value in its column
    pub fn fill_backward(&mut self) {
        for column in self.columns.values_mut() {
            let mut next = None;
            for value in column.iter_mut().rev() {
                match *value {
                    Some(v) => next = Some(v),
                    None => *value = next,
                }
            }
        }
    }

    /// Remove every row that still has an empty cell; returns rows dropped
    pub fn drop_incomplete(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.len())
            .map(|i| self.columns.values().all(|c| c[i].is_some()))
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return 0;
        }

        let mut mask = keep.iter();
        self.timestamps.retain(|_| *mask.next().unwrap_or(&false));
        for column in self.columns.values_mut() {
            let mut mask = keep.iter();
            column.retain(|_| *mask.next().unwrap_or(&false));
        }
        dropped
    }

    /// Materialize complete rows
    pub fn to_rows(&self) -> Result<Vec<FeatureRow>, FeatureError> {
        let mut rows = Vec::with_capacity(self.len());
        for (i, &timestamp) in self.timestamps.iter().enumerate() {
            let mut row = FeatureRow::new(timestamp, 0.0);
            for (name, column) in &self.columns {
                let value = column[i].ok_or_else(|| FeatureError::MissingValue {
                    column: name.clone(),
                    timestamp,
                })?;
                row.set(name, value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn obs(hour: i64, pm2_5: Option<f64>) -> Observation {
        let base = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap();
        let mut o = Observation::new(base + Duration::hours(hour));
        o.pm2_5 = pm2_5;
        o.aqi = hour as f64;
        o
    }

    #[test]
    fn test_absent_columns_omitted() {
        let frame = FeatureFrame::from_observations(&[obs(0, Some(1.0)), obs(1, None)]).unwrap();
        assert!(frame.has_column("aqi"));
        assert!(frame.has_column("pm2_5"));
        assert!(!frame.has_column("temperature"));
        assert_eq!(frame.column("pm2_5").unwrap(), &[Some(1.0), None]);
    }

    #[test]
    fn test_rejects_unsorted_input() {
        let result = FeatureFrame::from_observations(&[obs(1, None), obs(0, None)]);
        assert!(matches!(result, Err(FeatureError::NotAscending { .. })));

        let dup = FeatureFrame::from_observations(&[obs(1, None), obs(1, None)]);
        assert!(matches!(dup, Err(FeatureError::NotAscending { .. })));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            FeatureFrame::from_observations(&[]),
            Err(FeatureError::EmptyInput)
        ));
    }

    #[test]
    fn test_fill_order_forward_then_backward() {
        let mut frame = FeatureFrame::from_observations(&[
            obs(0, None),
            obs(1, Some(10.0)),
            obs(2, None),
            obs(3, Some(30.0)),
        ])
        .unwrap();
        frame.fill_forward();
        assert_eq!(frame.column("pm2_5").unwrap(), &[None, Some(10.0), Some(10.0), Some(30.0)]);
        frame.fill_backward();
        assert_eq!(frame.column("pm2_5").unwrap()[0], Some(10.0));
        assert_eq!(frame.empty_count(), 0);
    }

    #[test]
    fn test_drop_incomplete() {
        let mut frame = FeatureFrame::from_observations(&[obs(0, None), obs(1, Some(1.0))]).unwrap();
        assert_eq!(frame.drop_incomplete(), 1);
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.column("aqi").unwrap(), &[Some(1.0)]);
    }

    #[test]
    fn test_extend_rows_with_observation() {
        let mut history = FeatureRow::new(obs(0, None).timestamp, 20.0);
        history.set("nh3", 4.0);
        history.set("aqi_lag_1", 18.0);

        let mut frame = FeatureFrame::from_rows(&[history]).unwrap();
        frame.extend_with_observations(&[obs(1, Some(5.0))]).unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.column("nh3").unwrap(), &[Some(4.0), None]);
        assert_eq!(frame.column("pm2_5").unwrap(), &[None, Some(5.0)]);
        assert!(frame.extend_with_observations(&[obs(0, None)]).is_err());
    }

    #[test]
    fn test_to_rows_requires_complete_frame() {
        let frame = FeatureFrame::from_observations(&[obs(0, None), obs(1, Some(2.0))]).unwrap();
        assert!(matches!(frame.to_rows(), Err(FeatureError::MissingValue { .. })));

        let complete = FeatureFrame::from_observations(&[obs(0, Some(1.0))]).unwrap();
        let rows = complete.to_rows().unwrap();
        assert_eq!(rows[0].aqi, 0.0);
        assert_eq!(rows[0].get("pm2_5"), Some(1.0));
    }
}
