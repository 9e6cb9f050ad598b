//! Dihedral-angle flood fill.

use std::collections::VecDeque;

use mesh_types::{FaceTags, IndexedMesh, MeshTopology, UNASSIGNED};
use mesh_validate::{ValidationError, ValidationResult};
use nalgebra::Vector3;
use tracing::debug;

use crate::adjacency::FaceAdjacency;
use crate::params::ClassifyParams;
use crate::result::Classification;

/// Group the triangles of a closed surface into faces.
///
/// Adjacent triangles belong to the same face when the angle between their
/// normals is below the threshold. Faces are flood-filled from the lowest
/// unassigned triangle and numbered from 1 in discovery order, so the same
/// surface and threshold always yield the same tags. Disconnected shells
/// never share a face.
///
/// # Errors
///
/// - [`ValidationError::InvalidAngle`] for a threshold outside `(0, 180]`
/// - [`ValidationError::EmptyMesh`] for a surface without triangles
/// - [`ValidationError::InvalidIndex`] for out-of-range vertex indices
/// - [`ValidationError::DegenerateTriangle`] for a triangle without a
///   normal
///
/// # Example
///
/// ```
/// use mesh_types::cylinder;
/// use mesh_classify::{compute_boundary_faces, ClassifyParams};
///
/// let surface = cylinder(1.0, 5.0, 32, 10);
/// let result = compute_boundary_faces(&surface, &ClassifyParams::default()).unwrap();
///
/// // Lateral wall, bottom cap, top cap.
/// assert_eq!(result.face_count, 3);
/// ```
pub fn compute_boundary_faces(
    mesh: &IndexedMesh,
    params: &ClassifyParams,
) -> ValidationResult<Classification> {
    params.validate()?;
    if mesh.faces.is_empty() {
        return Err(ValidationError::EmptyMesh);
    }
    let normals = face_normals(mesh, params.degenerate_area_threshold)?;
    let cos_threshold = params.angle_threshold_rad().cos();
    let adjacency = FaceAdjacency::from_mesh(mesh);

    let mut tags = FaceTags::new(mesh.face_count());
    let mut next_id: u32 = 1;
    let mut queue = VecDeque::new();

    for seed in 0..mesh.face_count() {
        if tags.get(seed) != Some(UNASSIGNED) {
            continue;
        }
        tags.set(seed, next_id);
        queue.push_back(seed);
        while let Some(face) = queue.pop_front() {
            for neighbor in adjacency.neighbors(face) {
                if tags.get(neighbor) == Some(UNASSIGNED)
                    && same_face(&normals[face], &normals[neighbor], cos_threshold)
                {
                    tags.set(neighbor, next_id);
                    queue.push_back(neighbor);
                }
            }
        }
        next_id += 1;
    }

    let result = Classification::new(tags, params.angle_threshold_deg);
    debug!(
        faces = result.face_count,
        triangles = mesh.face_count(),
        threshold = params.angle_threshold_deg,
        "classified boundary faces"
    );
    Ok(result)
}

/// Dihedral test: the angle between unit normals is below the threshold.
#[inline]
fn same_face(a: &Vector3<f64>, b: &Vector3<f64>, cos_threshold: f64) -> bool {
    a.dot(b) > cos_threshold
}

fn face_normals(mesh: &IndexedMesh, area_threshold: f64) -> ValidationResult<Vec<Vector3<f64>>> {
    let vertex_count = mesh.vertex_count();
    (0..mesh.face_count())
        .map(|face| {
            let f = mesh.faces[face];
            if let Some(&index) = f.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(ValidationError::InvalidIndex {
                    face,
                    index,
                    vertex_count,
                });
            }
            mesh.triangle(face)
                .filter(|t| !t.is_degenerate(area_threshold))
                .and_then(|t| t.normal())
                .ok_or(ValidationError::DegenerateTriangle { face })
        })
        .collect()
}

/// Edges separating two different faces, as sorted `(min, max)` pairs.
///
/// These are the curves the remesher must keep and the volume mesher
/// reproduces between tagged regions.
#[must_use]
pub fn feature_edges(mesh: &IndexedMesh, tags: &FaceTags) -> Vec<(u32, u32)> {
    let adjacency = FaceAdjacency::from_mesh(mesh);
    let mut edges: Vec<(u32, u32)> = (0..adjacency.face_count())
        .flat_map(|face| {
            adjacency
                .neighbor_edges(face)
                .iter()
                .filter(move |&&(other, _)| other > face && tags.get(other) != tags.get(face))
                .map(|&(_, edge)| edge)
        })
        .collect();
    edges.sort_unstable();
    edges
}

/// The triangles of one face as a compacted surface ("face polydata").
///
/// Empty when no triangle carries `id`.
///
/// # Example
///
/// ```
/// use mesh_types::cylinder;
/// use mesh_classify::{compute_boundary_faces, extract_face, ClassifyParams};
///
/// let surface = cylinder(1.0, 5.0, 16, 4);
/// let faces = compute_boundary_faces(&surface, &ClassifyParams::default()).unwrap();
/// let wall = extract_face(&surface, &faces.tags, 1);
/// assert_eq!(wall.faces.len(), 16 * 4 * 2);
/// ```
#[must_use]
pub fn extract_face(mesh: &IndexedMesh, tags: &FaceTags, id: u32) -> IndexedMesh {
    mesh.submesh(tags.triangles_with(id))
}

/// The triangles of several faces combined into one compacted surface,
/// in triangle order.
#[must_use]
pub fn extract_faces(mesh: &IndexedMesh, tags: &FaceTags, ids: &[u32]) -> IndexedMesh {
    let selected = tags
        .as_slice()
        .iter()
        .enumerate()
        .filter(|&(_, id)| ids.contains(id))
        .map(|(i, _)| i);
    mesh.submesh(selected)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{Vertex, cylinder, unit_cube, unit_tetrahedron};

    fn classify(mesh: &IndexedMesh, degrees: f64) -> Classification {
        compute_boundary_faces(mesh, &ClassifyParams::default().with_angle_threshold(degrees))
            .unwrap()
    }

    #[test]
    fn cylinder_has_three_faces() {
        let surface = cylinder(1.0, 5.0, 32, 10);
        let result = classify(&surface, 60.0);

        assert_eq!(result.face_count, 3);
        // Wall triangles come first, then caps alternate bottom, top.
        assert_eq!(result.sizes[&1], 32 * 10 * 2);
        assert_eq!(result.sizes[&2], 32);
        assert_eq!(result.sizes[&3], 32);
        assert_eq!(result.tags.get(32 * 20), Some(2));
        assert_eq!(result.tags.get(32 * 20 + 1), Some(3));
        assert!(result.tags.is_complete());
    }

    #[test]
    fn coarse_segments_split_the_wall() {
        // Six segments turn 60 degrees per step.
        let surface = cylinder(1.0, 5.0, 6, 2);
        assert_eq!(classify(&surface, 59.0).face_count, 2 + 6);
        assert_eq!(classify(&surface, 61.0).face_count, 3);
    }

    #[test]
    fn cube_has_six_faces() {
        assert_eq!(classify(&unit_cube(), 60.0).face_count, 6);
        assert_eq!(classify(&unit_cube(), 91.0).face_count, 1);
        assert_eq!(classify(&unit_tetrahedron(), 60.0).face_count, 4);
    }

    #[test]
    fn ids_follow_discovery_order() {
        let tags = classify(&unit_cube(), 60.0).tags;
        assert_eq!(tags.as_slice(), &[1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6]);
    }

    #[test]
    fn classification_is_deterministic_and_idempotent() {
        let surface = cylinder(2.0, 3.0, 24, 6);
        let params = ClassifyParams::default();
        let first = compute_boundary_faces(&surface, &params).unwrap();
        let second = compute_boundary_faces(&surface, &params).unwrap();
        assert_eq!(first, second);

        // Each extracted face is a single face on its own.
        for id in first.face_ids() {
            let face = extract_face(&surface, &first.tags, id);
            let again = compute_boundary_faces(&face, &params).unwrap();
            assert_eq!(again.face_count, 1);
        }
    }

    #[test]
    fn disconnected_shells_do_not_share_faces() {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(5.0, 0.0, 0.0));
        mesh.merge(&other);

        let result = classify(&mesh, 60.0);
        assert_eq!(result.face_count, 12);
        // Coplanar bottoms of both cubes still get different IDs.
        assert_ne!(result.tags.get(0), result.tags.get(12));
        assert_eq!(classify(&mesh, 180.0).face_count, 2);
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let mut mesh = unit_cube();
        mesh.vertices.push(Vertex::from_coords(0.5, 0.0, 0.0));
        mesh.faces.push([0, 1, 8]);
        let err = compute_boundary_faces(&mesh, &ClassifyParams::default()).unwrap_err();
        assert_eq!(err, ValidationError::DegenerateTriangle { face: 12 });
    }

    #[test]
    fn invalid_input_is_rejected() {
        assert_eq!(
            compute_boundary_faces(&IndexedMesh::new(), &ClassifyParams::default()),
            Err(ValidationError::EmptyMesh)
        );
        assert!(matches!(
            compute_boundary_faces(&unit_cube(), &ClassifyParams::default().with_angle_threshold(0.0)),
            Err(ValidationError::InvalidAngle { .. })
        ));
        let mut mesh = unit_cube();
        mesh.faces[4] = [0, 1, 9];
        assert!(matches!(
            compute_boundary_faces(&mesh, &ClassifyParams::default()),
            Err(ValidationError::InvalidIndex { face: 4, index: 9, .. })
        ));
    }

    #[test]
    fn feature_edges_of_cylinder_are_the_rims() {
        let surface = cylinder(1.0, 5.0, 20, 3);
        let tags = classify(&surface, 60.0).tags;
        let edges = feature_edges(&surface, &tags);
        assert_eq!(edges.len(), 40);
        assert!(feature_edges(&surface, &FaceTags::from_vec(vec![1; surface.faces.len()])).is_empty());
    }

    #[test]
    fn extracting_faces() {
        let surface = cylinder(1.0, 5.0, 16, 4);
        let tags = classify(&surface, 60.0).tags;

        let bottom = extract_face(&surface, &tags, 2);
        assert_eq!(bottom.faces.len(), 16);
        assert_eq!(bottom.vertices.len(), 17);

        let caps = extract_faces(&surface, &tags, &[2, 3]);
        assert_eq!(caps.faces.len(), 32);
        assert!(extract_face(&surface, &tags, 9).faces.is_empty());
    }
}
