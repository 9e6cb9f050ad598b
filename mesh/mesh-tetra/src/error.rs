//! Error types for volume mesh generation.

use mesh_validate::ValidationError;
use thiserror::Error;

/// Result type for volume meshing operations.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Reasons a tetrahedral mesh cannot be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The surface failed an input check.
    #[error("invalid surface: {0}")]
    Validation(#[from] ValidationError),

    /// Generation options are out of range.
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// What is wrong with the options.
        reason: String,
    },

    /// `generate` or `set_walls` was called before `set_surface`.
    #[error("no surface set")]
    NoSurface,

    /// Face tags and surface triangles differ in number.
    #[error("face tags cover {tags} triangles but the surface has {faces}")]
    TagMismatch {
        /// Number of tags.
        tags: usize,
        /// Number of surface triangles.
        faces: usize,
    },

    /// A face ID that no surface triangle carries.
    #[error("unknown face id {id}")]
    UnknownFaceId {
        /// The requested ID.
        id: u32,
    },

    /// Part of the domain could neither be filled by the front nor by a
    /// star decomposition.
    #[error("meshing stalled with {remaining} open front faces")]
    Stalled {
        /// Front faces left unmeshed.
        remaining: usize,
    },

    /// More interior points are needed than the caller allows.
    #[error("mesh needs {required} steiner points but the limit is {limit}")]
    SteinerLimit {
        /// Configured maximum.
        limit: usize,
        /// Points the mesh would need.
        required: usize,
    },

    /// The tetrahedra do not reproduce the input surface.
    #[error("volume mesh does not conform to the surface: {reason}")]
    ConformityViolated {
        /// The failed check.
        reason: String,
    },
}
