//! Errors raised by the pipeline stages.

use mesh_io::IoError;
use mesh_remesh::SizingError;
use mesh_tetra::GenerationError;
use mesh_validate::ValidationError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The stage that failed and why.
///
/// Every failure is terminal for the run; adjust parameters and call again.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The surface is not a closed, manifold, non-intersecting solid.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Edge-size targets do not fit the model.
    #[error("remeshing failed: {0}")]
    Sizing(#[from] SizingError),

    /// No valid tetrahedralization was produced.
    #[error("volume meshing failed: {0}")]
    Generation(GenerationError),

    /// Reading the surface or writing the volume mesh failed.
    #[error("i/o failed: {0}")]
    Io(#[from] IoError),
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Validation(inner) => Self::Validation(inner),
            other => Self::Generation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesher_validation_is_flattened() {
        let err = PipelineError::from(GenerationError::Validation(ValidationError::EmptyMesh));
        assert!(matches!(err, PipelineError::Validation(ValidationError::EmptyMesh)));

        let err = PipelineError::from(GenerationError::NoSurface);
        assert!(matches!(err, PipelineError::Generation(GenerationError::NoSurface)));
        assert_eq!(err.to_string(), "volume meshing failed: no surface set");
    }
}
