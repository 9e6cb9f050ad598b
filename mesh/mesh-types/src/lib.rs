//! Core mesh types for tetrahedral mesh generation.
//!
//! This crate provides the data model shared by every pipeline stage:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`IndexedMesh`] - A closed triangle surface with indexed vertices
//! - [`FaceTags`] - Per-triangle face IDs assigned by the boundary classifier
//! - [`TetMesh`] - A tetrahedral volume mesh with tagged boundary triangles
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`predicates`] - Exact orientation and in-sphere tests
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Conventions
//!
//! Surface faces are wound **counter-clockwise (CCW) when viewed from
//! outside**, so normals point out of the enclosed volume. Tetrahedra are
//! positively oriented: `predicates::orient3d(v0, v1, v2, v3) > 0`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{cylinder, FaceTags, MeshTopology};
//!
//! let surface = cylinder(1.0, 5.0, 24, 8);
//! let tags = FaceTags::new(surface.face_count());
//!
//! assert!(surface.signed_volume() > 0.0);
//! assert_eq!(tags.len(), surface.face_count());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod mesh;
pub mod predicates;
mod shapes;
mod tags;
mod traits;
mod triangle;
mod vertex;
mod volume;

pub use bounds::Aabb;
pub use mesh::IndexedMesh;
pub use shapes::{cylinder, unit_cube, unit_tetrahedron};
pub use tags::{FaceTags, UNASSIGNED};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;
pub use volume::{TET_FACES, TetMesh, canonical_triangle, tet_faces, triangle_key};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
