//! Error types for surface validation.

use thiserror::Error;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reasons a surface cannot be meshed.
///
/// Each variant names the first offending element so callers can point at
/// it; the non-failing [`MeshReport`](crate::MeshReport) gives full counts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// The invalid vertex index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A triangle with (near) zero area.
    #[error("triangle {face} is degenerate")]
    DegenerateTriangle {
        /// Offending face.
        face: usize,
    },

    /// Two faces use the same three vertices.
    #[error("triangles {first} and {second} are duplicates")]
    DuplicateTriangle {
        /// Face seen first.
        first: usize,
        /// Its duplicate.
        second: usize,
    },

    /// An edge shared by more than two faces.
    #[error("edge ({v0}, {v1}) is shared by {faces} faces")]
    NonManifoldEdge {
        /// Lower vertex index.
        v0: u32,
        /// Higher vertex index.
        v1: u32,
        /// Number of faces on the edge.
        faces: usize,
    },

    /// An edge used by a single face: the surface has a hole.
    #[error("surface is open along edge ({v0}, {v1})")]
    OpenBoundary {
        /// Lower vertex index.
        v0: u32,
        /// Higher vertex index.
        v1: u32,
    },

    /// The faces around a vertex form more than one fan.
    #[error("vertex {vertex} is non-manifold")]
    NonManifoldVertex {
        /// Offending vertex.
        vertex: u32,
    },

    /// Two faces traverse a shared edge in the same direction.
    #[error("inconsistent winding across edge ({v0}, {v1})")]
    InconsistentWinding {
        /// Edge start in both faces.
        v0: u32,
        /// Edge end in both faces.
        v1: u32,
    },

    /// Two non-adjacent parts of the surface cross or overlap.
    #[error("triangles {first} and {second} intersect")]
    SelfIntersection {
        /// Lower face index.
        first: usize,
        /// Higher face index.
        second: usize,
    },

    /// The surface encloses no volume.
    #[error("surface encloses zero volume (signed volume {volume:e})")]
    ZeroVolume {
        /// Signed volume that was computed.
        volume: f64,
    },

    /// A dihedral angle threshold outside `(0, 180]` degrees.
    #[error("invalid angle threshold: {degrees} degrees")]
    InvalidAngle {
        /// The rejected threshold.
        degrees: f64,
    },
}
