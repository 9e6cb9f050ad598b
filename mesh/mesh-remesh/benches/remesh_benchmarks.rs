//! Benchmarks for mesh-remesh operations.
//!
//! Run with: cargo bench -p mesh-remesh
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-remesh -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-remesh -- --baseline main

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mesh_remesh::{EdgeStatistics, RemeshParams, remesh};
use mesh_types::{cylinder, unit_cube};

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_remesh_cylinder(c: &mut Criterion) {
    let mut group = c.benchmark_group("remesh_cylinder");
    group.sample_size(10);
    let surface = cylinder(1.0, 5.0, 32, 10);
    for (hmin, hmax) in [(0.4, 0.6), (0.3, 0.5), (0.15, 0.25)] {
        let params = RemeshParams::new(hmin, hmax);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{hmin}-{hmax}")),
            &params,
            |b, params| b.iter(|| remesh(black_box(&surface), params)),
        );
    }
    group.finish();
}

fn bench_refine_cube(c: &mut Criterion) {
    let cube = unit_cube();
    let params = RemeshParams::new(0.05, 0.1).with_iterations(5);
    c.bench_function("remesh_cube_refine", |b| {
        b.iter(|| remesh(black_box(&cube), &params));
    });
}

fn bench_edge_statistics(c: &mut Criterion) {
    let surface = cylinder(1.0, 5.0, 96, 60);
    c.bench_function("edge_statistics", |b| {
        b.iter(|| EdgeStatistics::from_mesh(black_box(&surface)));
    });
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(
    benches,
    bench_remesh_cylinder,
    bench_refine_cube,
    bench_edge_statistics
);
criterion_main!(benches);
