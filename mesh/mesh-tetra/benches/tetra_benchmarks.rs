//! Benchmarks for mesh-tetra operations.
//!
//! Run with: cargo bench -p mesh-tetra
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-tetra -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-tetra -- --baseline main

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mesh_tetra::{MeshQuality, MeshingStrategy, TetGenOptions, VolumeMesher};
use mesh_types::{FaceTags, IndexedMesh, cylinder};

fn mesher(strategy: MeshingStrategy, surface: &IndexedMesh) -> VolumeMesher {
    let mut mesher = VolumeMesher::new(strategy);
    mesher
        .set_surface(surface.clone(), FaceTags::from_vec(vec![1; surface.faces.len()]))
        .unwrap();
    mesher
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_delaunay_cylinder(c: &mut Criterion) {
    let mut group = c.benchmark_group("delaunay_cylinder");
    group.sample_size(10);
    let mesher = mesher(MeshingStrategy::Delaunay, &cylinder(1.0, 5.0, 32, 12));
    for size in [0.6, 0.4] {
        let options = TetGenOptions::new(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &options, |b, options| {
            b.iter(|| mesher.generate(black_box(options)));
        });
    }
    group.finish();
}

fn bench_advancing_front_cylinder(c: &mut Criterion) {
    let mut group = c.benchmark_group("advancing_front_cylinder");
    group.sample_size(10);
    let mesher = mesher(MeshingStrategy::AdvancingFront, &cylinder(1.0, 2.0, 16, 4));
    let options = TetGenOptions::new(0.5);
    group.bench_function("0.5", |b| b.iter(|| mesher.generate(black_box(&options))));
    group.finish();
}

fn bench_quality(c: &mut Criterion) {
    let mesh = mesher(MeshingStrategy::Delaunay, &cylinder(1.0, 5.0, 32, 12))
        .generate(&TetGenOptions::new(0.3))
        .unwrap();
    c.bench_function("mesh_quality", |b| {
        b.iter(|| MeshQuality::from_mesh(black_box(&mesh)));
    });
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(
    benches,
    bench_delaunay_cylinder,
    bench_advancing_front_cylinder,
    bench_quality
);
criterion_main!(benches);
