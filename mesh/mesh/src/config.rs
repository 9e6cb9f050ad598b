//! Configuration of a full pipeline run.

use mesh_classify::ClassifyParams;
use mesh_remesh::RemeshParams;
use mesh_tetra::{MeshingStrategy, TetGenOptions};
use mesh_validate::ImportParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

/// Parameters for every stage of [`Pipeline`](crate::Pipeline).
///
/// # Example
///
/// ```
/// use mesh::{MeshingStrategy, PipelineConfig};
///
/// let config = PipelineConfig::new(0.4)
///     .with_remesh_bounds(0.3, 0.5)
///     .with_strategy(MeshingStrategy::AdvancingFront)
///     .with_walls(vec![1]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Welding and validation of the input.
    pub import: ImportParams,

    /// Dihedral angle threshold used to split faces.
    pub classify: ClassifyParams,

    /// Target edge bounds. `None` meshes the surface as imported.
    ///
    /// Default: `None`
    pub remesh: Option<RemeshParams>,

    /// Edge size and output selection of the volume mesher.
    pub tetgen: TetGenOptions,

    /// Volume meshing strategy.
    ///
    /// Default: [`MeshingStrategy::Delaunay`]
    pub strategy: MeshingStrategy,

    /// Face IDs marked as walls, resolved after the final classification.
    ///
    /// Default: empty
    pub walls: Vec<u32>,
}

impl PipelineConfig {
    /// Mesh the imported surface with tetrahedra of edge size `size`.
    #[must_use]
    pub fn new(size: f64) -> Self {
        Self {
            tetgen: TetGenOptions::new(size),
            ..Self::default()
        }
    }

    /// Remesh to `[hmin, hmax]` before volume meshing.
    #[must_use]
    pub fn with_remesh_bounds(mut self, hmin: f64, hmax: f64) -> Self {
        self.remesh = Some(RemeshParams::new(hmin, hmax));
        self
    }

    /// Set the remeshing parameters.
    #[must_use]
    pub fn with_remesh(mut self, params: Option<RemeshParams>) -> Self {
        self.remesh = params;
        self
    }

    /// Set the face classification parameters.
    #[must_use]
    pub fn with_classify(mut self, params: ClassifyParams) -> Self {
        self.classify = params;
        self
    }

    /// Set the import parameters.
    #[must_use]
    pub fn with_import(mut self, params: ImportParams) -> Self {
        self.import = params;
        self
    }

    /// Set the volume meshing options.
    #[must_use]
    pub fn with_tetgen(mut self, options: TetGenOptions) -> Self {
        self.tetgen = options;
        self
    }

    /// Set the volume meshing strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: MeshingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Mark faces as walls.
    #[must_use]
    pub fn with_walls(mut self, walls: Vec<u32>) -> Self {
        self.walls = walls;
        self
    }

    /// Check every stage's parameters before any work is done.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage whose parameters are invalid.
    pub fn validate(&self) -> PipelineResult<()> {
        self.classify.validate()?;
        if let Some(remesh) = &self.remesh {
            remesh.validate()?;
        }
        self.tetgen.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineError;

    #[test]
    fn default_skips_remeshing() {
        let config = PipelineConfig::default();
        assert!(config.remesh.is_none());
        assert!(config.walls.is_empty());
        assert_eq!(config.strategy, MeshingStrategy::Delaunay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_stages_are_reported() {
        let config = PipelineConfig::new(0.0);
        assert!(matches!(config.validate(), Err(PipelineError::Generation(_))));

        let config = PipelineConfig::new(0.4).with_remesh_bounds(0.5, 0.3);
        assert!(matches!(config.validate(), Err(PipelineError::Sizing(_))));

        let config = PipelineConfig::new(0.4)
            .with_classify(ClassifyParams::default().with_angle_threshold(-1.0));
        assert!(matches!(config.validate(), Err(PipelineError::Validation(_))));
    }
}
