//! The full run: import, classify, remesh, classify, generate, export.

use std::path::Path;

use mesh_io::{load_stl, save_vtu};
use mesh_remesh::RemeshStats;
use mesh_tetra::{MeshQuality, VolumeMesher};
use mesh_types::{IndexedMesh, TetMesh};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::model::SurfaceModel;

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The surface that was meshed, with its final face IDs.
    pub model: SurfaceModel,
    /// The tetrahedral mesh.
    pub volume: TetMesh,
    /// Boundary triangles of the wall faces. Empty without walls.
    pub wall: IndexedMesh,
    /// Quality of the tetrahedra.
    pub quality: MeshQuality,
    /// Remeshing counts, when remeshing ran.
    pub remesh: Option<RemeshStats>,
}

impl std::fmt::Display for PipelineOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.model)?;
        if let Some(stats) = &self.remesh {
            writeln!(f, "{stats}")?;
        }
        write!(
            f,
            "Volume: {} nodes, {} tetrahedra, {} boundary triangles\n{}",
            self.volume.node_count(),
            self.volume.element_count(),
            self.volume.boundary_faces.len(),
            self.quality
        )
    }
}

/// Runs every stage with one configuration.
///
/// Each stage owns the mesh the previous stage produced; nothing is shared
/// between runs, so a pipeline can be reused for any number of inputs.
///
/// # Example
///
/// ```
/// use mesh::{Pipeline, PipelineConfig};
/// use mesh::types::cylinder;
///
/// let pipeline = Pipeline::new(PipelineConfig::new(0.5).with_walls(vec![1]));
/// let output = pipeline.run(&cylinder(1.0, 3.0, 16, 6))?;
///
/// assert_eq!(output.model.face_count(), 3);
/// assert!(output.volume.element_count() > 0);
/// assert_eq!(output.wall.faces.len(), 16 * 6 * 2);
/// # Ok::<(), mesh::PipelineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Import, classify and optionally remesh raw triangles.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input and a sizing error when the
    /// remeshing bounds do not fit the model.
    pub fn prepare(&self, raw: &IndexedMesh) -> PipelineResult<(SurfaceModel, Option<RemeshStats>)> {
        self.config.validate()?;
        let model = SurfaceModel::import(raw, &self.config.import, &self.config.classify)?;
        match &self.config.remesh {
            Some(params) => {
                let (model, stats) = model.remeshed(params, &self.config.classify)?;
                Ok((model, Some(stats)))
            }
            None => Ok((model, None)),
        }
    }

    /// A mesher loaded with the model and the configured walls.
    ///
    /// # Errors
    ///
    /// Returns an error when the surface is rejected or a wall ID does not
    /// name a face of the model.
    pub fn mesher(&self, model: &SurfaceModel) -> PipelineResult<VolumeMesher> {
        let mut mesher = VolumeMesher::new(self.config.strategy);
        mesher.set_surface(model.surface().clone(), model.tags().clone())?;
        if !self.config.walls.is_empty() {
            mesher.set_walls(&self.config.walls)?;
        }
        Ok(mesher)
    }

    /// Run every stage except export.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn run(&self, raw: &IndexedMesh) -> PipelineResult<PipelineOutput> {
        let (model, remesh) = self.prepare(raw)?;
        debug!(strategy = %self.config.strategy, "{model}");

        let mesher = self.mesher(&model)?;
        let volume = mesher.generate(&self.config.tetgen)?;
        let wall = mesher.wall_surface(&volume);
        let quality = MeshQuality::from_mesh(&volume);

        let output = PipelineOutput {
            model,
            volume,
            wall,
            quality,
            remesh,
        };
        info!("{output}");
        Ok(output)
    }

    /// Read an STL file, run every stage and write the volume mesh as VTU.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`](crate::PipelineError::Io) when either
    /// file cannot be accessed, otherwise the error of the failing stage.
    /// Nothing is written when a stage fails.
    pub fn run_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> PipelineResult<PipelineOutput> {
        let raw = load_stl(input)?;
        let result = self.run(&raw)?;
        save_vtu(&result.volume, output)?;
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PipelineError;
    use mesh_tetra::{GenerationError, MeshingStrategy};
    use mesh_types::{cylinder, unit_cube};

    #[test]
    fn cube_without_remeshing() {
        let pipeline = Pipeline::new(PipelineConfig::new(0.4));
        let output = pipeline.run(&unit_cube()).unwrap();
        assert!(output.remesh.is_none());
        assert_eq!(output.model.face_count(), 6);
        assert!(output.volume.boundary_matches(&unit_cube().faces));
        assert!(output.wall.faces.is_empty());
        assert_eq!(output.quality.inverted_count, 0);
    }

    #[test]
    fn advancing_front_strategy_is_used() {
        let config = PipelineConfig::new(0.5).with_strategy(MeshingStrategy::AdvancingFront);
        let output = Pipeline::new(config).run(&cylinder(0.8, 2.0, 12, 4)).unwrap();
        assert_eq!(output.volume.inverted_count(), 0);
        assert_eq!(output.volume.face_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn unknown_wall_is_refused() {
        let config = PipelineConfig::new(0.5).with_walls(vec![4]);
        let err = Pipeline::new(config).run(&cylinder(1.0, 2.0, 16, 4)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Generation(GenerationError::UnknownFaceId { id: 4 })
        ));
    }

    #[test]
    fn coarse_remeshing_is_a_sizing_error() {
        let config = PipelineConfig::new(0.4).with_remesh_bounds(3.0, 4.0);
        let err = Pipeline::new(config).run(&unit_cube()).unwrap_err();
        assert!(matches!(err, PipelineError::Sizing(_)));
    }

    #[test]
    fn invalid_options_fail_before_import() {
        let config = PipelineConfig::new(-1.0);
        let err = Pipeline::new(config).run(&IndexedMesh::new()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Generation(GenerationError::InvalidOptions { .. })
        ));
    }
}
