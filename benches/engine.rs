//! Benchmarks for normalization and the additive forecast.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use trendcast::core::{PeriodUnit, Series};
use trendcast::ingest::{normalize, RawTable};
use trendcast::{EngineConfig, ForecastEngine};

fn generate_interest(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            40.0 + 0.02 * i as f64
                + 8.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin()
                + 5.0 * (2.0 * std::f64::consts::PI * i as f64 / 365.25).cos()
        })
        .collect()
}

fn make_series(n: usize) -> Series {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    let dates = (0..n).map(|i| start + Duration::days(i as i64)).collect();
    Series::from_parts(dates, generate_interest(n)).unwrap()
}

fn make_table(n: usize) -> RawTable {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    let rows: Vec<_> = generate_interest(n)
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            json!({
                "date": (start + Duration::days(i as i64)).to_string(),
                "YouTube": v.round(),
                "isPartial": i + 1 == n,
            })
        })
        .collect();
    RawTable::from_json_records(&serde_json::Value::Array(rows).to_string()).unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [365, 1825].iter() {
        let table = make_table(*size);
        group.bench_with_input(BenchmarkId::new("daily", size), size, |b, _| {
            b.iter(|| normalize(black_box(&table), "date", "YouTube"))
        });
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");
    group.sample_size(10);

    for size in [90, 365, 1825].iter() {
        let series = make_series(*size);

        group.bench_with_input(BenchmarkId::new("sampled_bands", size), size, |b, _| {
            let engine = ForecastEngine::default();
            b.iter(|| engine.forecast(black_box(&series), 30, PeriodUnit::Day))
        });

        group.bench_with_input(BenchmarkId::new("analytic_bands", size), size, |b, _| {
            let config = EngineConfig::default().with_uncertainty_samples(0);
            let engine = ForecastEngine::new(config).unwrap();
            b.iter(|| engine.forecast(black_box(&series), 30, PeriodUnit::Day))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_forecast);
criterion_main!(benches);
