use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rationalvol::bachelier::inverse_phi_tilde;
use rationalvol::special::{erf, erfc, erfcx, erfinv, inverse_norm_cdf, norm_cdf};

/// Logarithmically spaced points in `[lo, hi]`.
fn log_grid(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let (a, b) = (lo.ln(), hi.ln());
    (0..n)
        .map(|i| (a + (b - a) * (i as f64 / (n - 1) as f64)).exp())
        .collect()
}

fn error_function_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_function");
    let grid = log_grid(1e-3, 25.0, 256);

    group.bench_function("erf_256", |b| {
        b.iter(|| grid.iter().map(|&z| erf(black_box(z))).sum::<f64>())
    });
    group.bench_function("erfc_256", |b| {
        b.iter(|| grid.iter().map(|&z| erfc(black_box(z))).sum::<f64>())
    });
    group.bench_function("erfcx_256", |b| {
        b.iter(|| grid.iter().map(|&z| erfcx(black_box(z))).sum::<f64>())
    });

    group.finish();
}

fn normal_distribution_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("normal_distribution");

    group.bench_function("norm_cdf_tail", |b| b.iter(|| norm_cdf(black_box(-12.5))));
    group.bench_function("inverse_norm_cdf_central", |b| {
        b.iter(|| inverse_norm_cdf(black_box(0.3)))
    });
    group.bench_function("inverse_norm_cdf_tail", |b| {
        b.iter(|| inverse_norm_cdf(black_box(1e-200)))
    });
    group.bench_function("erfinv", |b| b.iter(|| erfinv(black_box(0.7))));
    group.bench_function("inverse_phi_tilde", |b| {
        b.iter(|| inverse_phi_tilde(black_box(-0.01)))
    });

    group.finish();
}

criterion_group!(benches, error_function_benchmarks, normal_distribution_benchmarks);
criterion_main!(benches);
