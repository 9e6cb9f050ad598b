//! Benchmarks for mesh-io operations.
//!
//! Run with: cargo bench -p mesh-io
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-io -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-io -- --baseline main

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_io::{load_stl, read_vtu, save_stl, write_vtu};
use mesh_types::{TetMesh, Vertex, cylinder};
use tempfile::tempdir;

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Kuhn subdivision of an `n`³ cube grid: six tetrahedra per cell.
fn create_block(n: u32) -> TetMesh {
    let mut mesh = TetMesh::new();
    let side = n + 1;
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                mesh.vertices.push(Vertex::from_coords(
                    f64::from(i),
                    f64::from(j),
                    f64::from(k),
                ));
            }
        }
    }
    let id = |i: u32, j: u32, k: u32| i + side * (j + side * k);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let c = [
                    id(i, j, k),
                    id(i + 1, j, k),
                    id(i + 1, j + 1, k),
                    id(i, j + 1, k),
                    id(i, j, k + 1),
                    id(i + 1, j, k + 1),
                    id(i + 1, j + 1, k + 1),
                    id(i, j + 1, k + 1),
                ];
                for path in [[1, 2], [3, 2], [3, 7], [4, 7], [4, 5], [1, 5]] {
                    mesh.tetrahedra.push([c[0], c[path[0]], c[path[1]], c[6]]);
                }
            }
        }
    }
    mesh.boundary_faces = mesh.extract_boundary();
    mesh.boundary_ids = vec![1; mesh.boundary_faces.len()];
    mesh
}

// =============================================================================
// I/O Benchmarks
// =============================================================================

fn bench_stl(c: &mut Criterion) {
    let mut group = c.benchmark_group("STL");

    let surface = cylinder(1.0, 5.0, 64, 40);
    let temp_dir = tempdir().expect("failed to create temp dir");
    let stl_path = temp_dir.path().join("bench_cylinder.stl");
    save_stl(&surface, &stl_path, true).expect("failed to save STL");

    group.throughput(Throughput::Elements(surface.faces.len() as u64));
    group.bench_function("load_binary", |b| b.iter(|| load_stl(black_box(&stl_path))));

    let out = temp_dir.path().join("bench_out.stl");
    group.bench_function("save_binary", |b| {
        b.iter(|| save_stl(black_box(&surface), black_box(&out), true));
    });

    group.finish();
}

fn bench_vtu(c: &mut Criterion) {
    let mut group = c.benchmark_group("VTU");

    let block = create_block(12);
    let mut text = Vec::new();
    write_vtu(&block, &mut text).expect("failed to write VTU");

    group.throughput(Throughput::Elements(block.tetrahedra.len() as u64));
    group.bench_function("write", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(text.len());
            write_vtu(black_box(&block), &mut buf)
        });
    });
    group.bench_function("read", |b| b.iter(|| read_vtu(black_box(text.as_slice()))));

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_stl, bench_vtu);
criterion_main!(benches);
