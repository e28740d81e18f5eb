//! Benchmarks for the topology store
//!
//! Measures performance of:
//! - Building ring and full-mesh topologies (duplicate checks on every insert)
//! - Neighbor lookups
//! - Router removal with incident-link purge

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linkstate_topology::Topology;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("R{i}")).collect()
}

fn full_mesh(n: usize) -> Topology {
    let names = names(n);
    let mut topo = Topology::new();
    for name in &names {
        topo.add_router(name).unwrap();
    }
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            topo.add_link(a, b, 1).unwrap();
        }
    }
    topo
}

/// Benchmark building a ring of N routers
fn bench_build_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_ring");

    for &n in &[8usize, 32, 128] {
        let names = names(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &names, |b, names| {
            b.iter(|| {
                let mut topo = Topology::new();
                for name in names {
                    topo.add_router(name).unwrap();
                }
                for i in 0..names.len() {
                    let next = (i + 1) % names.len();
                    let _ = topo.add_link(&names[i], &names[next], 1);
                }
                black_box(topo)
            })
        });
    }
    group.finish();
}

/// Benchmark neighbor lookup in a full mesh
fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors");

    for &n in &[8usize, 16, 32] {
        let topo = full_mesh(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &topo, |b, topo| {
            b.iter(|| topo.neighbors(black_box("R0")))
        });
    }
    group.finish();
}

/// Benchmark removing a router from a full mesh
fn bench_remove_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_router");

    for &n in &[8usize, 16, 32] {
        let topo = full_mesh(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &topo, |b, topo| {
            b.iter_batched(
                || topo.clone(),
                |mut topo| topo.remove_router(black_box("R0")).unwrap(),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_ring, bench_neighbors, bench_remove_router);
criterion_main!(benches);
