//! Property-based tests for boundary classification.
//!
//! Run with: cargo test -p mesh-classify -- proptest

#![allow(clippy::unwrap_used)]

use mesh_classify::{ClassifyParams, FaceAdjacency, compute_boundary_faces, extract_face};
use mesh_types::{IndexedMesh, Vector3, cylinder};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A closed cylinder with random proportions and tessellation.
fn arb_cylinder() -> impl Strategy<Value = IndexedMesh> {
    (0.2..5.0f64, 0.2..10.0f64, 3usize..40, 1usize..12)
        .prop_map(|(radius, height, segments, rows)| cylinder(radius, height, segments, rows))
}

fn arb_threshold() -> impl Strategy<Value = f64> {
    1.0..=180.0f64
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every triangle is tagged and IDs run from 1 without gaps.
    #[test]
    fn tags_are_complete_and_contiguous(mesh in arb_cylinder(), degrees in arb_threshold()) {
        let params = ClassifyParams::default().with_angle_threshold(degrees);
        let result = compute_boundary_faces(&mesh, &params).unwrap();

        prop_assert!(result.tags.is_complete());
        prop_assert_eq!(result.tags.len(), mesh.faces.len());
        let expected: Vec<u32> = (1..=result.face_count as u32).collect();
        prop_assert_eq!(result.face_ids(), expected);
        prop_assert_eq!(result.sizes.values().sum::<usize>(), mesh.faces.len());
    }

    /// The same surface and threshold always give the same tags.
    #[test]
    fn classification_is_deterministic(mesh in arb_cylinder(), degrees in arb_threshold()) {
        let params = ClassifyParams::default().with_angle_threshold(degrees);
        let first = compute_boundary_faces(&mesh, &params).unwrap();
        let second = compute_boundary_faces(&mesh, &params).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Each face is one connected patch of triangles.
    #[test]
    fn faces_are_connected(mesh in arb_cylinder(), degrees in arb_threshold()) {
        let params = ClassifyParams::default().with_angle_threshold(degrees);
        let result = compute_boundary_faces(&mesh, &params).unwrap();
        for id in result.face_ids() {
            let face = extract_face(&mesh, &result.tags, id);
            prop_assert_eq!(FaceAdjacency::from_mesh(&face).connected_components().len(), 1);
        }
    }

    /// A larger threshold never splits a surface into more faces.
    #[test]
    fn face_count_is_monotone(mesh in arb_cylinder(), a in arb_threshold(), b in arb_threshold()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let fine = compute_boundary_faces(&mesh, &ClassifyParams::default().with_angle_threshold(low)).unwrap();
        let coarse = compute_boundary_faces(&mesh, &ClassifyParams::default().with_angle_threshold(high)).unwrap();
        prop_assert!(coarse.face_count <= fine.face_count);
    }

    /// Rigid motion and uniform scaling leave the tags unchanged.
    #[test]
    fn tags_ignore_placement(
        mesh in arb_cylinder(),
        offset in prop::array::uniform3(-50.0..50.0f64),
        scale in 0.1..10.0f64,
    ) {
        let params = ClassifyParams::default();
        let before = compute_boundary_faces(&mesh, &params).unwrap();

        let mut moved = mesh.clone();
        for v in &mut moved.vertices {
            v.position.coords *= scale;
        }
        moved.translate(Vector3::new(offset[0], offset[1], offset[2]));
        let after = compute_boundary_faces(&moved, &params).unwrap();

        prop_assert_eq!(before.tags, after.tags);
    }

    /// Cylinders fine enough for a smooth wall split into wall and two caps.
    #[test]
    fn smooth_cylinders_have_three_faces(
        radius in 0.2..5.0f64,
        height in 0.2..10.0f64,
        segments in 7usize..64,
        rows in 1usize..12,
    ) {
        let mesh = cylinder(radius, height, segments, rows);
        let result = compute_boundary_faces(&mesh, &ClassifyParams::default()).unwrap();
        prop_assert_eq!(result.face_count, 3);
        prop_assert_eq!(result.sizes[&1], segments * rows * 2);
    }
}
