//! Tetrahedral volume mesh.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::predicates::orient3d;
use crate::{Aabb, FaceTags, IndexedMesh, MeshBounds, Vertex};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Local vertex slots of the face opposite each tetrahedron vertex.
///
/// For a positively oriented tetrahedron, face `i` is wound
/// counter-clockwise when seen from outside the tetrahedron.
pub const TET_FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// The four outward faces of a tetrahedron.
#[inline]
#[must_use]
pub fn tet_faces(tet: [u32; 4]) -> [[u32; 3]; 4] {
    TET_FACES.map(|[a, b, c]| [tet[a], tet[b], tet[c]])
}

/// Rotate a triangle so its smallest index comes first, keeping winding.
///
/// Two triangles are the same oriented triangle iff their canonical forms
/// are equal.
#[inline]
#[must_use]
pub fn canonical_triangle(f: [u32; 3]) -> [u32; 3] {
    if f[0] <= f[1] && f[0] <= f[2] {
        f
    } else if f[1] <= f[2] {
        [f[1], f[2], f[0]]
    } else {
        [f[2], f[0], f[1]]
    }
}

/// Orientation-free key of a triangle (sorted indices).
#[inline]
#[must_use]
pub fn triangle_key(f: [u32; 3]) -> [u32; 3] {
    let mut k = f;
    k.sort_unstable();
    k
}

/// A tetrahedral volume mesh with tagged boundary triangles.
///
/// Tetrahedra are positively oriented (see
/// [`orient3d`](crate::predicates::orient3d)). `boundary_faces` holds the
/// boundary triangles with outward winding, and `boundary_ids` holds one face
/// ID per boundary triangle. When the mesh was generated from a surface, the
/// first vertices are the surface vertices in their original order.
///
/// # Example
///
/// ```
/// use mesh_types::{TetMesh, Vertex};
///
/// let mut mesh = TetMesh::new();
/// mesh.vertices = vec![
///     Vertex::from_coords(0.0, 0.0, 0.0),
///     Vertex::from_coords(1.0, 0.0, 0.0),
///     Vertex::from_coords(0.0, 1.0, 0.0),
///     Vertex::from_coords(0.0, 0.0, 1.0),
/// ];
/// mesh.tetrahedra.push([0, 1, 2, 3]);
///
/// assert_eq!(mesh.element_count(), 1);
/// assert!((mesh.volume() - 1.0 / 6.0).abs() < 1e-12);
/// assert_eq!(mesh.extract_boundary().len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TetMesh {
    /// Node positions.
    pub vertices: Vec<Vertex>,
    /// Tetrahedra as four vertex indices.
    pub tetrahedra: Vec<[u32; 4]>,
    /// Boundary triangles, outward winding.
    pub boundary_faces: Vec<[u32; 3]>,
    /// Face ID of each boundary triangle.
    pub boundary_ids: Vec<u32>,
}

impl TetMesh {
    /// Create an empty volume mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tetrahedra: Vec::new(),
            boundary_faces: Vec::new(),
            boundary_ids: Vec::new(),
        }
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of tetrahedra.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Check if the mesh has no tetrahedra and no boundary triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tetrahedra.is_empty() && self.boundary_faces.is_empty()
    }

    /// Corner positions of a tetrahedron.
    #[must_use]
    pub fn tet_points(&self, index: usize) -> Option<[Point3<f64>; 4]> {
        let tet = self.tetrahedra.get(index)?;
        let mut pts = [Point3::origin(); 4];
        for (slot, &vi) in pts.iter_mut().zip(tet) {
            *slot = self.vertices.get(vi as usize)?.position;
        }
        Some(pts)
    }

    /// Signed volume of a tetrahedron (positive when correctly oriented).
    #[must_use]
    pub fn tet_volume(&self, index: usize) -> Option<f64> {
        let [a, b, c, d] = self.tet_points(index)?;
        Some((b - a).cross(&(c - a)).dot(&(d - a)) / 6.0)
    }

    /// Sum of the signed tetrahedron volumes.
    #[must_use]
    pub fn volume(&self) -> f64 {
        (0..self.tetrahedra.len())
            .filter_map(|i| self.tet_volume(i))
            .sum()
    }

    /// Number of tetrahedra that are flat or inverted (exact test).
    #[must_use]
    pub fn inverted_count(&self) -> usize {
        (0..self.tetrahedra.len())
            .filter(|&i| {
                self.tet_points(i)
                    .is_none_or(|[a, b, c, d]| orient3d(&a, &b, &c, &d) <= 0.0)
            })
            .count()
    }

    /// Faces used by exactly one tetrahedron, outward wound, canonical and
    /// sorted.
    #[must_use]
    pub fn extract_boundary(&self) -> Vec<[u32; 3]> {
        let mut uses: HashMap<[u32; 3], ([u32; 3], u32)> =
            HashMap::with_capacity(self.tetrahedra.len() * 2);
        for &tet in &self.tetrahedra {
            for face in tet_faces(tet) {
                uses.entry(triangle_key(face))
                    .and_modify(|(_, n)| *n += 1)
                    .or_insert((face, 1));
            }
        }
        let mut boundary: Vec<[u32; 3]> = uses
            .into_values()
            .filter(|&(_, n)| n == 1)
            .map(|(face, _)| canonical_triangle(face))
            .collect();
        boundary.sort_unstable();
        boundary
    }

    /// Check that the boundary of the tetrahedra equals `faces` exactly,
    /// including winding.
    #[must_use]
    pub fn boundary_matches(&self, faces: &[[u32; 3]]) -> bool {
        let mut expected: Vec<[u32; 3]> = faces.iter().map(|&f| canonical_triangle(f)).collect();
        expected.sort_unstable();
        expected == self.extract_boundary()
    }

    /// Sorted unique face IDs of the boundary triangles.
    #[must_use]
    pub fn face_ids(&self) -> Vec<u32> {
        self.boundary_tags().face_ids()
    }

    /// Boundary face IDs as [`FaceTags`] over `boundary_faces`.
    #[must_use]
    pub fn boundary_tags(&self) -> FaceTags {
        FaceTags::from_vec(self.boundary_ids.clone())
    }

    /// The boundary triangles as a surface mesh sharing this mesh's nodes.
    fn boundary_as_surface(&self) -> IndexedMesh {
        IndexedMesh::from_parts(self.vertices.clone(), self.boundary_faces.clone())
    }

    /// The whole boundary as a compacted surface mesh.
    #[must_use]
    pub fn surface(&self) -> IndexedMesh {
        self.boundary_as_surface()
            .submesh(0..self.boundary_faces.len())
    }

    /// The boundary triangles of one face as a compacted surface mesh.
    ///
    /// Empty when no boundary triangle carries `id`.
    #[must_use]
    pub fn face_polydata(&self, id: u32) -> IndexedMesh {
        let selected = self
            .boundary_ids
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f == id)
            .map(|(i, _)| i);
        self.boundary_as_surface().submesh(selected)
    }
}

impl MeshBounds for TetMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::MeshTopology;

    fn corner_points() -> Vec<Vertex> {
        vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
            Vertex::from_coords(0.0, 0.0, 1.0),
            Vertex::from_coords(1.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn tet_faces_point_outward() {
        let verts = corner_points();
        let tet = [0, 1, 2, 3];
        for (i, face) in tet_faces(tet).iter().enumerate() {
            let p = |k: u32| verts[k as usize].position;
            let opposite = p(tet[i]);
            assert!(orient3d(&p(face[0]), &p(face[1]), &p(face[2]), &opposite) < 0.0);
        }
    }

    #[test]
    fn canonical_form_keeps_winding() {
        assert_eq!(canonical_triangle([5, 2, 9]), [2, 9, 5]);
        assert_eq!(canonical_triangle([9, 5, 2]), [2, 9, 5]);
        assert_ne!(canonical_triangle([2, 5, 9]), canonical_triangle([2, 9, 5]));
        assert_eq!(triangle_key([9, 2, 5]), [2, 5, 9]);
    }

    #[test]
    fn two_tets_share_an_interior_face() {
        let mut mesh = TetMesh::new();
        mesh.vertices = corner_points();
        // Both tetrahedra contain the face (1, 2, 3); the second lies beyond it.
        mesh.tetrahedra = vec![[0, 1, 2, 3], [1, 3, 2, 4]];
        assert_eq!(mesh.inverted_count(), 1);
        mesh.tetrahedra[1] = [1, 2, 3, 4];
        assert_eq!(mesh.inverted_count(), 0);

        let boundary = mesh.extract_boundary();
        assert_eq!(boundary.len(), 6);
        assert!(!boundary.contains(&canonical_triangle([1, 2, 3])));
        assert!(mesh.volume() > 1.0 / 6.0);
    }

    #[test]
    fn face_polydata_selects_by_id() {
        let mut mesh = TetMesh::new();
        mesh.vertices = corner_points();
        mesh.tetrahedra = vec![[0, 1, 2, 3]];
        mesh.boundary_faces = tet_faces([0, 1, 2, 3]).to_vec();
        mesh.boundary_ids = vec![1, 2, 2, 3];

        assert!(mesh.boundary_matches(&mesh.boundary_faces.clone()));
        assert_eq!(mesh.face_ids(), vec![1, 2, 3]);
        let face = mesh.face_polydata(2);
        assert_eq!(face.face_count(), 2);
        assert_eq!(face.vertex_count(), 4);
        assert!(mesh.face_polydata(7).is_empty());
        assert_eq!(mesh.surface().face_count(), 4);
        assert!((mesh.surface().signed_volume() - 1.0 / 6.0).abs() < 1e-12);
    }
}
