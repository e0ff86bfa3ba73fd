use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use clusterguard_core::detector::clustering::{flag_outliers, form_clusters, score_clusters};
use clusterguard_core::kernel::{Statistics, Vector4};
use clusterguard_core::{ClusterHead, EngineConfig, Reading};

/// Window of lab-like rows with a little deterministic jitter
fn rows(n: usize) -> Vec<Vector4> {
    (0..n)
        .map(|i| {
            let j = (i * 7 % 11) as f64;
            [22.0 + j * 0.2, 38.0 - j * 0.5, 300.0 + j * 9.0, 2.6 + (i % 3) as f64 * 0.01]
        })
        .collect()
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_statistics");

    for size in [5usize, 20, 50].iter() {
        let window = rows(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &window, |b, window| {
            b.iter(|| {
                let stats = Statistics::compute(black_box(window), 0.001).unwrap();
                black_box(stats.distance(&window[0]))
            })
        });
    }

    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_width_clustering");

    for size in [20usize, 100].iter() {
        let batch = rows(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| {
                let mut clusters = form_clusters(black_box(batch), 50.0);
                score_clusters(&mut clusters);
                black_box(flag_outliers(&mut clusters, 15.0))
            })
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let readings: Vec<Reading> = rows(1000)
        .into_iter()
        .enumerate()
        .map(|(i, row)| Reading::from_features(36 + (i % 3) as u32, row))
        .collect();

    let mut group = c.benchmark_group("cluster_head");
    group.throughput(Throughput::Elements(readings.len() as u64));

    for config in [EngineConfig::odamd(), EngineConfig::od()] {
        group.bench_function(config.algorithm.name(), |b| {
            b.iter(|| {
                let mut head = ClusterHead::new(config.clone()).unwrap();
                for reading in &readings {
                    black_box(head.handle_reading(*reading));
                }
                head.shutdown(0.0)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_statistics, bench_clustering, bench_engine);
criterion_main!(benches);
