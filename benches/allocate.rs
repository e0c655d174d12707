//! Allocation benchmarks: full pipeline and the clustering stages alone.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hrpalloc::distance::correlation_distance;
use hrpalloc::linkage::single_linkage;
use hrpalloc::stats::{correlation, covariance};
use hrpalloc::{HrpAllocator, ReturnSeriesTable};

/// Generate `n_assets` return series of `n_obs` observations in a few factor groups.
///
/// Uses a simple deterministic RNG so runs are comparable.
fn generate_returns(n_obs: usize, n_assets: usize) -> ReturnSeriesTable {
    // Simple deterministic PRNG (xorshift32)
    let mut rng_state: u32 = 42;
    let mut next = move || {
        rng_state ^= rng_state << 13;
        rng_state ^= rng_state >> 17;
        rng_state ^= rng_state << 5;
        (rng_state % 401) as f64 / 10_000.0 - 0.02 // -2%..+2%
    };

    let n_groups = 4;
    let factors: Vec<Vec<f64>> = (0..n_groups)
        .map(|_| (0..n_obs).map(|_| next()).collect())
        .collect();

    let cols = (0..n_assets)
        .map(|i| {
            let factor = &factors[i % n_groups];
            let series = factor.iter().map(|f| f + 0.5 * next()).collect();
            (format!("S{i:03}"), series)
        })
        .collect();

    ReturnSeriesTable::new(cols).expect("synthetic table is valid")
}

/// Benchmark: end-to-end allocation over growing universes (1 year daily)
fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("hrp/allocate");
    let allocator = HrpAllocator::default();

    for n in [10, 50, 100, 200] {
        let returns = generate_returns(252, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &returns, |b, r| {
            b.iter(|| black_box(allocator.allocate(black_box(r))))
        });
    }

    group.finish();
}

/// Benchmark: distance-of-distances and single linkage only
fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("hrp/clustering");

    for n in [50, 200] {
        let corr = correlation(&covariance(&generate_returns(252, n)));
        group.bench_with_input(BenchmarkId::new("distance", n), &corr, |b, corr| {
            b.iter(|| black_box(correlation_distance(black_box(corr))))
        });

        let dist = correlation_distance(&corr).expect("finite correlations");
        group.bench_with_input(BenchmarkId::new("linkage", n), &dist, |b, dist| {
            b.iter(|| black_box(single_linkage(black_box(dist))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_allocate, bench_clustering);
criterion_main!(benches);
