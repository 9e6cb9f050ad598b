//! A validated surface together with its face IDs.

use mesh_classify::{Classification, ClassifyParams, compute_boundary_faces, extract_face, extract_faces};
use mesh_remesh::{RemeshParams, RemeshStats, remesh};
use mesh_types::{FaceTags, IndexedMesh};
use mesh_validate::{ImportParams, import_surface};
use tracing::info;

use crate::error::PipelineResult;

/// A closed surface and the faces it was split into.
///
/// A model is never edited in place. Remeshing consumes it and returns a
/// new, reclassified model, since face IDs do not survive remeshing.
///
/// # Example
///
/// ```
/// use mesh::{ClassifyParams, SurfaceModel};
/// use mesh::types::cylinder;
///
/// let model = SurfaceModel::classify(cylinder(1.0, 5.0, 32, 10), &ClassifyParams::default())?;
/// assert_eq!(model.face_ids(), vec![1, 2, 3]);
///
/// let wall = model.face_polydata(1);
/// assert_eq!(wall.faces.len(), 32 * 10 * 2);
/// # Ok::<(), mesh::PipelineError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceModel {
    surface: IndexedMesh,
    classification: Classification,
}

impl SurfaceModel {
    /// Weld, validate and orient raw triangles, then classify them.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`](crate::PipelineError::Validation)
    /// when the triangles do not form a closed, manifold solid.
    pub fn import(
        raw: &IndexedMesh,
        import: &ImportParams,
        classify: &ClassifyParams,
    ) -> PipelineResult<Self> {
        let surface = import_surface(raw, import)?;
        Self::classify(surface, classify)
    }

    /// Classify an already validated surface.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`](crate::PipelineError::Validation)
    /// for an empty surface, degenerate triangles or invalid params.
    pub fn classify(surface: IndexedMesh, params: &ClassifyParams) -> PipelineResult<Self> {
        let classification = compute_boundary_faces(&surface, params)?;
        info!("{classification}");
        Ok(Self {
            surface,
            classification,
        })
    }

    /// Remesh to `params` and classify the result with `classify`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Sizing`](crate::PipelineError::Sizing) when
    /// the edge bounds do not fit the model, or a validation error from
    /// reclassification.
    pub fn remeshed(
        self,
        params: &RemeshParams,
        classify: &ClassifyParams,
    ) -> PipelineResult<(Self, RemeshStats)> {
        let output = remesh(&self.surface, params)?;
        info!("{}", output.stats);
        let model = Self::classify(output.mesh, classify)?;
        Ok((model, output.stats))
    }

    /// The surface.
    #[must_use]
    pub const fn surface(&self) -> &IndexedMesh {
        &self.surface
    }

    /// Face ID of every triangle.
    #[must_use]
    pub const fn tags(&self) -> &FaceTags {
        &self.classification.tags
    }

    /// The full classification result.
    #[must_use]
    pub const fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Number of faces.
    #[must_use]
    pub const fn face_count(&self) -> usize {
        self.classification.face_count
    }

    /// Face IDs in ascending order.
    #[must_use]
    pub fn face_ids(&self) -> Vec<u32> {
        self.classification.face_ids()
    }

    /// The triangles of one face as a standalone surface.
    ///
    /// Empty for an unknown ID.
    #[must_use]
    pub fn face_polydata(&self, id: u32) -> IndexedMesh {
        extract_face(&self.surface, self.tags(), id)
    }

    /// The triangles of several faces combined into one surface.
    #[must_use]
    pub fn faces_polydata(&self, ids: &[u32]) -> IndexedMesh {
        extract_faces(&self.surface, self.tags(), ids)
    }

    /// Split into surface and tags.
    #[must_use]
    pub fn into_parts(self) -> (IndexedMesh, FaceTags) {
        (self.surface, self.classification.tags)
    }
}

impl std::fmt::Display for SurfaceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model: {} vertices, {} triangles, {} faces",
            self.surface.vertices.len(),
            self.surface.faces.len(),
            self.classification.face_count
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PipelineError;
    use mesh_types::{cylinder, unit_cube};

    #[test]
    fn cube_has_six_faces() {
        let model = SurfaceModel::classify(unit_cube(), &ClassifyParams::default()).unwrap();
        assert_eq!(model.face_count(), 6);
        for id in model.face_ids() {
            assert_eq!(model.face_polydata(id).faces.len(), 2);
        }
        assert_eq!(model.faces_polydata(&[1, 2]).faces.len(), 4);
        assert!(model.face_polydata(7).faces.is_empty());
    }

    #[test]
    fn import_orients_outward() {
        let mut raw = cylinder(1.0, 2.0, 16, 4);
        raw.flip_normals();
        let model =
            SurfaceModel::import(&raw, &ImportParams::default(), &ClassifyParams::default())
                .unwrap();
        assert!(model.surface().signed_volume() > 0.0);
        assert_eq!(model.face_count(), 3);
    }

    #[test]
    fn remeshing_reclassifies() {
        let model =
            SurfaceModel::classify(cylinder(1.0, 5.0, 32, 10), &ClassifyParams::default())
                .unwrap();
        let (model, stats) = model
            .remeshed(&RemeshParams::new(0.3, 0.5), &ClassifyParams::default())
            .unwrap();
        assert!(stats.was_remeshed());
        assert_eq!(model.face_count(), 3);
        assert_eq!(model.tags().len(), model.surface().faces.len());
    }

    #[test]
    fn open_surface_is_refused() {
        let mut open = unit_cube();
        open.faces.pop();
        let err = SurfaceModel::import(&open, &ImportParams::default(), &ClassifyParams::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
