//! Benchmarks for mesh-validate operations.
//!
//! Run with: cargo bench -p mesh-validate
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-validate -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-validate -- --baseline main

#![allow(missing_docs, clippy::cast_possible_truncation)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_types::{IndexedMesh, cylinder};
use mesh_validate::{
    ImportParams, find_self_intersections, import_surface, validate_mesh, weld_vertices,
};

// =============================================================================
// Test Mesh Generation
// =============================================================================

fn create_soup(mesh: &IndexedMesh) -> IndexedMesh {
    let mut out = IndexedMesh::with_capacity(mesh.faces.len() * 3, mesh.faces.len());
    for face in &mesh.faces {
        let base = out.vertices.len() as u32;
        out.vertices
            .extend(face.iter().map(|&v| mesh.vertices[v as usize]));
        out.faces.push([base, base + 1, base + 2]);
    }
    out
}

fn sizes() -> [(usize, usize); 3] {
    [(16, 8), (48, 24), (96, 60)]
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_mesh");
    for (segments, rows) in sizes() {
        let mesh = cylinder(1.0, 5.0, segments, rows);
        group.throughput(Throughput::Elements(mesh.faces.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(mesh.faces.len()),
            &mesh,
            |b, mesh| b.iter(|| validate_mesh(black_box(mesh))),
        );
    }
    group.finish();
}

fn bench_weld(c: &mut Criterion) {
    let mut group = c.benchmark_group("weld_vertices");
    for (segments, rows) in sizes() {
        let soup = create_soup(&cylinder(1.0, 5.0, segments, rows));
        group.throughput(Throughput::Elements(soup.vertices.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(soup.faces.len()),
            &soup,
            |b, soup| {
                b.iter(|| {
                    let mut mesh = soup.clone();
                    weld_vertices(black_box(&mut mesh), 1e-6)
                });
            },
        );
    }
    group.finish();
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("self_intersection");
    for (segments, rows) in sizes() {
        let mesh = cylinder(1.0, 5.0, segments, rows);
        group.bench_with_input(
            BenchmarkId::from_parameter(mesh.faces.len()),
            &mesh,
            |b, mesh| b.iter(|| find_self_intersections(black_box(mesh), 1)),
        );
    }
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let soup = create_soup(&cylinder(1.0, 5.0, 48, 24));
    let params = ImportParams::default();
    c.bench_function("import_surface", |b| {
        b.iter(|| import_surface(black_box(&soup), &params));
    });
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(
    benches,
    bench_validation,
    bench_weld,
    bench_intersection,
    bench_import
);
criterion_main!(benches);
