use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ql_math::{CubicDerivativeApprox, CubicInterpolation, Interpolation1D, LinearInterpolation, LogInterpolation};
use std::hint::black_box;

fn nodes() -> (Vec<f64>, Vec<f64>) {
    let ts = vec![0.0, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0];
    let dfs = ts.iter().map(|t: &f64| (-0.03 * t - 0.0005 * t * t).exp()).collect();
    (ts, dfs)
}

fn bench_interpolations(c: &mut Criterion) {
    let (ts, dfs) = nodes();
    let queries: Vec<f64> = (1..=10_000).map(|i| 30.0 * i as f64 / 10_000.0).collect();

    let schemes: Vec<(&str, Box<dyn Interpolation1D>)> = vec![
        ("linear", Box::new(LinearInterpolation::new(&ts, &dfs).unwrap())),
        ("log_linear", Box::new(LogInterpolation::log_linear(&ts, &dfs).unwrap())),
        (
            "monotonic_cubic_spline",
            Box::new(CubicInterpolation::new(&ts, &dfs, CubicDerivativeApprox::Spline, true).unwrap()),
        ),
        (
            "log_parabolic",
            Box::new(LogInterpolation::log_cubic(&ts, &dfs, CubicDerivativeApprox::Parabolic, false).unwrap()),
        ),
    ];

    let mut group = c.benchmark_group("interpolation_value");
    group.throughput(Throughput::Elements(queries.len() as u64));
    for (name, f) in &schemes {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let mut acc = 0.0;
                for &t in &queries {
                    acc += f.operator(black_box(t));
                }
                black_box(acc)
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("interpolation_primitive");
    for (name, f) in &schemes {
        group.bench_function(*name, |b| b.iter(|| f.primitive(black_box(17.3))));
    }
    group.finish();
}

criterion_group!(benches, bench_interpolations);
criterion_main!(benches);
