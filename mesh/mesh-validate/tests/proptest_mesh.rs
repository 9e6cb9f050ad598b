//! Property-based tests for surface validation.
//!
//! These tests use proptest to generate random meshes and verify invariants.
//!
//! Run with: cargo test -p mesh-validate -- proptest

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use mesh_types::{IndexedMesh, MeshTopology, Vector3, Vertex, cylinder};
use mesh_validate::{
    ImportParams, ValidationOptions, check_mesh, import_surface, validate_mesh, weld_vertices,
};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random meshes
// =============================================================================

/// Generate a random vertex in a bounded range.
fn arb_vertex() -> impl Strategy<Value = Vertex> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(Vertex::from)
}

/// Generate a mesh whose face indices are all in range.
fn arb_mesh(max_vertices: usize, max_faces: usize) -> impl Strategy<Value = IndexedMesh> {
    (3..=max_vertices).prop_flat_map(move |num_vertices| {
        let n = num_vertices as u32;
        (
            prop::collection::vec(arb_vertex(), num_vertices),
            prop::collection::vec(prop::array::uniform3(0..n), 1..=max_faces),
        )
            .prop_map(|(vertices, faces)| IndexedMesh { vertices, faces })
    })
}

/// Split every face into its own three corners, as STL stores them.
fn to_soup(mesh: &IndexedMesh) -> IndexedMesh {
    let mut out = IndexedMesh::new();
    for face in &mesh.faces {
        let base = out.vertices.len() as u32;
        out.vertices
            .extend(face.iter().map(|&v| mesh.vertices[v as usize]));
        out.faces.push([base, base + 1, base + 2]);
    }
    out
}

// =============================================================================
// Property Tests: Validation
// =============================================================================

proptest! {
    /// Validation never panics on meshes with valid indices.
    #[test]
    fn validation_never_panics(mesh in arb_mesh(40, 80)) {
        let _ = validate_mesh(&mesh);
        let _ = check_mesh(&mesh, &ValidationOptions::default());
    }

    /// A surface that passes the fail-fast check is reported as valid.
    #[test]
    fn passing_check_implies_valid_report(mesh in arb_mesh(12, 24)) {
        if check_mesh(&mesh, &ValidationOptions::default()).is_ok() {
            prop_assert!(validate_mesh(&mesh).is_valid());
        }
    }

    /// Validation is deterministic.
    #[test]
    fn validation_is_deterministic(mesh in arb_mesh(30, 50)) {
        let a = validate_mesh(&mesh);
        let b = validate_mesh(&mesh);
        prop_assert_eq!(a.issue_count(), b.issue_count());
        prop_assert_eq!(a.is_manifold, b.is_manifold);
        prop_assert_eq!(a.is_watertight, b.is_watertight);
        prop_assert_eq!(
            check_mesh(&mesh, &ValidationOptions::default()),
            check_mesh(&mesh, &ValidationOptions::default())
        );
    }
}

// =============================================================================
// Property Tests: Vertex Welding
// =============================================================================

proptest! {
    /// Welding never increases the vertex count and keeps indices valid.
    #[test]
    fn weld_keeps_indices_valid(mesh in arb_mesh(30, 50), epsilon in 1e-9..1.0f64) {
        let mut welded = mesh.clone();
        weld_vertices(&mut welded, epsilon);

        prop_assert!(welded.vertices.len() <= mesh.vertices.len());
        prop_assert!(welded.faces.len() <= mesh.faces.len());
        prop_assert!(welded.indices_valid());
    }
}

// =============================================================================
// Property Tests: Import
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A moved and scaled cylinder soup always imports as the welded
    /// cylinder, oriented outward.
    #[test]
    fn cylinder_soup_imports(
        segments in 6usize..32,
        rows in 1usize..6,
        scale in 0.1..10.0f64,
        offset in prop::array::uniform3(-50.0..50.0f64),
        flip in any::<bool>(),
    ) {
        let mut shape = cylinder(scale, 3.0 * scale, segments, rows);
        shape.translate(Vector3::from(offset));
        if flip {
            shape.flip_normals();
        }

        let surface = import_surface(&to_soup(&shape), &ImportParams::default()).unwrap();
        prop_assert_eq!(surface.vertex_count(), shape.vertex_count());
        prop_assert_eq!(surface.face_count(), shape.face_count());
        prop_assert!(surface.signed_volume() > 0.0);
    }
}
