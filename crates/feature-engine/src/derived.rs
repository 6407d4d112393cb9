//! Change-Rate, Interaction and Alert-Flag Features

use crate::frame::{Column, FeatureFrame};
use crate::pipeline::FeatureConfig;
use aqi_calculator::AqiCategory;
use observation::columns;
use tracing::debug;

/// Fixed pairwise products: (output, left, right)
pub const INTERACTIONS: [(&str, &str, &str); 4] = [
    ("temp_humidity_interaction", columns::TEMPERATURE, columns::HUMIDITY),
    ("wind_pm2_5_interaction", columns::WIND_SPEED, columns::PM2_5),
    ("wind_temp_interaction", columns::WIND_SPEED, columns::TEMPERATURE),
    ("humidity_pm2_5_interaction", columns::HUMIDITY, columns::PM2_5),
];

/// Row-over-row relative change `(v_t - v_{t-1}) / v_{t-1}`
pub fn change_rate(values: &[Option<f64>]) -> Column {
    (0..values.len())
        .map(|i| {
            let current = values[i]?;
            let previous = values.get(i.checked_sub(1)?).copied().flatten()?;
            let rate = (current - previous) / previous;
            rate.is_finite().then_some(rate)
        })
        .collect()
}

/// Add `{col}_change_rate` for every configured column present.
/// A single-row frame has no previous row, so nothing is added.
pub fn add_change_rates(frame: &mut FeatureFrame, columns: &[String]) {
    if frame.len() < 2 {
        debug!("Change rates skipped for a single row");
        return;
    }
    for name in columns {
        let Some(values) = frame.column(name) else {
            debug!("Change-rate source '{}' absent, skipped", name);
            continue;
        };
        let rates = change_rate(values);
        frame.insert_column(format!("{}_change_rate", name), rates);
    }
}

/// Add the fixed interaction products whose inputs are both present
pub fn add_interactions(frame: &mut FeatureFrame) {
    for (output, left, right) in INTERACTIONS {
        let (Some(l), Some(r)) = (frame.column(left), frame.column(right)) else {
            debug!("Interaction '{}' skipped: input absent", output);
            continue;
        };
        let product: Column = l
            .iter()
            .zip(r)
            .map(|(a, b)| Some((*a)? * (*b)?))
            .collect();
        frame.insert_column(output, product);
    }
}

fn flag(frame: &FeatureFrame, column: &str, test: impl Fn(f64) -> bool) -> Column {
    match frame.column(column) {
        Some(values) => values
            .iter()
            .map(|v| Some(if v.is_some_and(&test) { 1.0 } else { 0.0 }))
            .collect(),
        None => vec![Some(0.0); frame.len()],
    }
}

/// Add the binary alert indicators; a missing input reads as 0
pub fn add_alert_flags(frame: &mut FeatureFrame, config: &FeatureConfig) {
    let ordinal = config.high_pollution_ordinal;
    let high_pollution = flag(frame, columns::AQI, |aqi| {
        AqiCategory::from_aqi(aqi).ordinal() > ordinal
    });
    let rain = flag(frame, columns::PRECIPITATION, |p| p > config.rain_threshold);
    let high_pm = flag(frame, columns::PM2_5, |pm| pm > config.high_pm2_5_threshold);
    let high_temp = flag(frame, columns::TEMPERATURE, |t| t > config.high_temp_threshold);

    frame.insert_column("high_pollution_alert", high_pollution);
    frame.insert_column("rain_alert", rain);
    frame.insert_column("high_pm2_5_alert", high_pm);
    frame.insert_column("high_temp_alert", high_temp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use observation::Observation;

    fn frame(rows: &[(f64, Option<f64>, Option<f64>)]) -> FeatureFrame {
        let base = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap();
        let observations: Vec<Observation> = rows
            .iter()
            .enumerate()
            .map(|(i, &(aqi, pm2_5, temperature))| {
                let mut o = Observation::new(base + Duration::hours(i as i64));
                o.aqi = aqi;
                o.pm2_5 = pm2_5;
                o.temperature = temperature;
                o
            })
            .collect();
        FeatureFrame::from_observations(&observations).unwrap()
    }

    #[test]
    fn test_change_rate_edges() {
        let values = [Some(10.0), Some(15.0), Some(0.0), Some(5.0), None, Some(1.0)];
        assert_eq!(
            change_rate(&values),
            vec![None, Some(0.5), Some(-1.0), None, None, None]
        );
    }

    #[test]
    fn test_interactions_need_both_inputs() {
        let mut f = frame(&[(50.0, Some(10.0), Some(20.0))]);
        add_interactions(&mut f);
        // no humidity or wind speed column
        assert!(!f.has_column("temp_humidity_interaction"));
        assert!(!f.has_column("wind_pm2_5_interaction"));
    }

    #[test]
    fn test_interaction_product() {
        let base = Utc.with_ymd_and_hms(2025, 11, 3, 0, 0, 0).unwrap();
        let mut o = Observation::new(base);
        o.temperature = Some(30.0);
        o.humidity = Some(50.0);
        let mut f = FeatureFrame::from_observations(&[o]).unwrap();
        add_interactions(&mut f);
        assert_eq!(f.column("temp_humidity_interaction").unwrap(), &[Some(1500.0)]);
    }

    #[test]
    fn test_alert_flags() {
        let mut f = frame(&[
            (151.0, Some(16.0), Some(36.0)),
            (150.0, Some(15.0), None),
            (40.0, None, Some(20.0)),
        ]);
        add_alert_flags(&mut f, &FeatureConfig::default());

        assert_eq!(
            f.column("high_pollution_alert").unwrap(),
            &[Some(1.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(
            f.column("high_pm2_5_alert").unwrap(),
            &[Some(1.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(
            f.column("high_temp_alert").unwrap(),
            &[Some(1.0), Some(0.0), Some(0.0)]
        );
        // no precipitation column at all
        assert_eq!(f.column("rain_alert").unwrap(), &[Some(0.0); 3]);
    }
}
