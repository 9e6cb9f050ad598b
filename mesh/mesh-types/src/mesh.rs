//! Indexed triangle surface mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh describing a closed boundary surface.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index.
///
/// # Winding Order
///
/// Faces use counter-clockwise winding when viewed from outside, so normals
/// point out of the enclosed volume.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// Returns an empty mesh if either array length is not a multiple of 3.
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, MeshTopology};
    ///
    /// let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Self { vertices, faces }
    }

    /// Vertex positions as a plain vector.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Check that every face references existing, distinct vertices.
    #[must_use]
    pub fn indices_valid(&self) -> bool {
        let n = self.vertices.len();
        self.faces.iter().all(|&[a, b, c]| {
            (a as usize) < n && (b as usize) < n && (c as usize) < n && a != b && b != c && a != c
        })
    }

    /// Signed enclosed volume (divergence theorem over the faces).
    ///
    /// Positive for outward-facing closed meshes, negative when inside-out.
    /// Not meaningful for open meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize].position;
            let v1 = &self.vertices[i1 as usize].position;
            let v2 = &self.vertices[i2 as usize].position;

            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }
        volume / 6.0
    }

    /// Absolute enclosed volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check if the signed volume is negative.
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Reverse the winding of every face.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            v.position += offset;
        }
    }

    /// Append another mesh, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }

    /// Unique undirected edges as `(min, max)` index pairs, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut set: HashSet<(u32, u32)> = HashSet::with_capacity(self.faces.len() * 3 / 2);
        for face in &self.faces {
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                set.insert((a.min(b), a.max(b)));
            }
        }
        let mut edges: Vec<_> = set.into_iter().collect();
        edges.sort_unstable();
        edges
    }

    /// Length of every unique edge.
    #[must_use]
    pub fn edge_lengths(&self) -> Vec<f64> {
        self.edges()
            .into_iter()
            .map(|(a, b)| {
                (self.vertices[a as usize].position - self.vertices[b as usize].position).norm()
            })
            .collect()
    }

    /// Copy a subset of faces into a new, compacted mesh.
    ///
    /// Vertices are renumbered in first-use order; face order is kept.
    /// Out-of-range face indices are skipped.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32
    #[must_use]
    pub fn submesh(&self, face_indices: impl IntoIterator<Item = usize>) -> Self {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut out = Self::new();
        for fi in face_indices {
            let Some(face) = self.faces.get(fi) else {
                continue;
            };
            let mut new_face = [0u32; 3];
            for (slot, &vi) in new_face.iter_mut().zip(face) {
                *slot = *remap.entry(vi).or_insert_with(|| {
                    out.vertices.push(self.vertices[vi as usize]);
                    (out.vertices.len() - 1) as u32
                });
            }
            out.faces.push(new_face);
        }
        out
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let &[i0, i1, i2] = self.faces.get(face_index)?;
        Some(Triangle::new(
            self.vertices.get(i0 as usize)?.position,
            self.vertices.get(i1 as usize)?.position,
            self.vertices.get(i2 as usize)?.position,
        ))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}
