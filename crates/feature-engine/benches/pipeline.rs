use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{FeatureFrame, FeaturePipeline};
use observation::Observation;

fn month_of_hours() -> Vec<Observation> {
    let base = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
    (0..720)
        .map(|i| {
            let x = i as f64;
            let mut o = Observation::new(base + Duration::hours(i));
            o.temperature = Some(22.0 + (x / 12.0).sin() * 6.0);
            o.humidity = Some(50.0 + (x / 8.0).cos() * 15.0);
            o.wind_speed = Some(1.0 + (x % 6.0));
            o.precipitation = Some(0.0);
            o.pm2_5 = Some(25.0 + (x / 5.0).sin() * 10.0);
            o.pm10 = Some(60.0 + (x / 7.0).cos() * 20.0);
            o.co = Some(350.0 + x % 40.0);
            o.no2 = Some(18.0 + x % 9.0);
            o.aqi = 70.0 + (x / 5.0).sin() * 25.0;
            o
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let observations = month_of_hours();
    let pipeline = FeaturePipeline::default();

    c.bench_function("feature_pipeline_720_rows", |b| {
        b.iter(|| {
            let frame = FeatureFrame::from_observations(black_box(&observations)).unwrap();
            pipeline.apply(frame, true).unwrap()
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
