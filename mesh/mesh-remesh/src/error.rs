//! Error types for remeshing.

use thiserror::Error;

/// Result type for remeshing operations.
pub type SizingResult<T> = std::result::Result<T, SizingError>;

/// Edge-size targets that cannot be applied to a surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A bound is zero, negative or not finite.
    #[error("invalid edge length bounds [{min}, {max}] (must be finite and > 0)")]
    InvalidBounds {
        /// Requested minimum edge length.
        min: f64,
        /// Requested maximum edge length.
        max: f64,
    },

    /// The minimum exceeds the maximum.
    #[error("minimum edge length {min} exceeds maximum {max}")]
    InvertedBounds {
        /// Requested minimum edge length.
        min: f64,
        /// Requested maximum edge length.
        max: f64,
    },

    /// The target length cannot resolve the model's smallest dimension.
    #[error("target edge length {target} is too coarse for a model {extent} thick")]
    TooCoarse {
        /// Target edge length, the mean of the bounds.
        target: f64,
        /// Smallest bounding box extent of the model.
        extent: f64,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references missing vertex {index}")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// The invalid vertex index.
        index: u32,
    },

    /// Zero iterations requested.
    #[error("invalid iteration count: {0} (must be >= 1)")]
    InvalidIterations(u32),

    /// The input is not a closed two-manifold.
    #[error("surface is not closed and manifold ({open} open, {non_manifold} non-manifold edges)")]
    NonManifold {
        /// Edges with a single face.
        open: usize,
        /// Edges with more than two faces.
        non_manifold: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(SizingError::EmptyMesh.to_string(), "mesh is empty");

        let err = SizingError::TooCoarse {
            target: 4.0,
            extent: 2.0,
        };
        assert!(err.to_string().contains("too coarse"));

        let err = SizingError::InvertedBounds { min: 2.0, max: 1.0 };
        assert!(err.to_string().contains("exceeds"));
    }
}
