//! Criterion benchmarks for the classification hot paths.
//!
//! Benchmarks:
//! 1. Full classify pass over series of increasing length
//! 2. Incremental sparkline maintenance (parse + append + serialize)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fishbowl_core::domain::{PricePoint, SparklinePoint};
use fishbowl_core::signal::classify;
use fishbowl_core::sparkline;

fn make_points(n: usize) -> Vec<PricePoint> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            PricePoint::new(base + chrono::Duration::days(i as i64), close)
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    for n in [250usize, 1000, 5000] {
        let points = make_points(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &points, |b, points| {
            b.iter(|| classify(black_box("BENCH"), black_box(points)).unwrap());
        });
    }
    group.finish();
}

fn bench_sparkline_roundtrip(c: &mut Criterion) {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut window = Vec::new();
    for i in 0..sparkline::MAX_POINTS {
        window = sparkline::append(
            window,
            SparklinePoint::new(
                base + chrono::Duration::days(i as i64),
                100.0 + i as f64 * 0.1,
                100.0,
            ),
            sparkline::MAX_POINTS,
        );
    }
    let blob = sparkline::to_json(&window);
    let today = base + chrono::Duration::days(sparkline::MAX_POINTS as i64);

    c.bench_function("sparkline_daily_update", |b| {
        b.iter(|| {
            let window = sparkline::parse_window(Some(black_box(&blob)));
            let window = sparkline::append(
                window,
                SparklinePoint::new(today, 125.5, 112.3),
                sparkline::MAX_POINTS,
            );
            sparkline::to_json(black_box(&window))
        });
    });
}

criterion_group!(benches, bench_classify, bench_sparkline_roundtrip);
criterion_main!(benches);
