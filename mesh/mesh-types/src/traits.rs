//! Read-only views shared by the mesh types.

use crate::{Aabb, Triangle};

/// Counts and resolved triangles of a triangle mesh.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// True without vertices or without triangles.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// The corner positions of triangle `face_index`.
    ///
    /// `None` when the face or one of its vertices does not exist.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Every resolvable triangle, in face order.
    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.face_count()).filter_map(|i| self.triangle(i))
    }
}

/// Meshes with a spatial extent.
pub trait MeshBounds {
    /// Box around every vertex; empty for a mesh without vertices.
    fn bounds(&self) -> Aabb;
}
