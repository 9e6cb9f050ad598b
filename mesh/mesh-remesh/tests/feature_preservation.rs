//! Faces found before remeshing are found again afterwards.

#![allow(clippy::unwrap_used)]

use mesh_classify::{ClassifyParams, compute_boundary_faces, feature_edges};
use mesh_remesh::{RemeshParams, remesh};
use mesh_types::{cylinder, unit_cube};

#[test]
fn cylinder_keeps_wall_and_caps() {
    let surface = cylinder(1.0, 5.0, 32, 10);
    let params = RemeshParams::new(0.3, 0.5);
    let result = remesh(&surface, &params).unwrap();

    let faces = compute_boundary_faces(&result.mesh, &ClassifyParams::default()).unwrap();
    assert_eq!(faces.face_count, 3);

    // Two of the faces are flat discs, one at z = 0 and one at z = 5.
    let mut cap_heights: Vec<f64> = faces
        .face_ids()
        .into_iter()
        .filter_map(|id| {
            let heights: Vec<f64> = faces
                .tags
                .triangles_with(id)
                .into_iter()
                .flat_map(|t| result.mesh.faces[t])
                .map(|v| result.mesh.vertices[v as usize].position.z)
                .collect();
            let z = heights[0];
            heights.iter().all(|h| (h - z).abs() < 1e-9).then_some(z)
        })
        .collect();
    cap_heights.sort_by(f64::total_cmp);
    assert_eq!(cap_heights.len(), 2);
    assert!(cap_heights[0].abs() < 1e-9);
    assert!((cap_heights[1] - 5.0).abs() < 1e-9);

    // Both rims are closed loops of feature edges.
    let rims = feature_edges(&result.mesh, &faces.tags);
    assert!(rims.len() >= 2 * 8);
}

#[test]
fn cube_keeps_six_sides() {
    let result = remesh(&unit_cube(), &RemeshParams::new(0.15, 0.25)).unwrap();
    let faces = compute_boundary_faces(&result.mesh, &ClassifyParams::default()).unwrap();
    assert_eq!(faces.face_count, 6);
    assert!(faces.sizes.values().all(|&n| n >= 2));
}
