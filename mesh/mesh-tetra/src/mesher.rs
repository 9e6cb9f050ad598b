//! The volume mesher: a surface with face tags in, a conforming
//! tetrahedral mesh out.

use mesh_types::{FaceTags, IndexedMesh, TetMesh, Vertex};
use mesh_validate::{ValidationOptions, check_mesh};
use tracing::{info, warn};

use crate::delaunay;
use crate::error::{GenerationError, GenerationResult};
use crate::front;
use crate::options::{MeshingStrategy, TetGenOptions};
use crate::quality::MeshQuality;

/// Relative tolerance of the volume comparison in the conformity check.
const VOLUME_TOLERANCE: f64 = 1e-9;

/// Fills a tagged surface with tetrahedra.
///
/// The strategy is fixed at construction. The surface is validated when it
/// is set; generation never modifies it, so every surface triangle appears
/// unchanged as a boundary triangle of the result.
///
/// # Example
///
/// ```
/// use mesh_tetra::{MeshingStrategy, TetGenOptions, VolumeMesher};
/// use mesh_types::{FaceTags, unit_cube};
///
/// let cube = unit_cube();
/// let tags = FaceTags::from_vec(vec![1; cube.faces.len()]);
///
/// let mut mesher = VolumeMesher::new(MeshingStrategy::Delaunay);
/// mesher.set_surface(cube.clone(), tags)?;
/// let mesh = mesher.generate(&TetGenOptions::new(0.4))?;
///
/// assert!(mesh.element_count() > 0);
/// assert!(mesh.boundary_matches(&cube.faces));
/// # Ok::<(), mesh_tetra::GenerationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolumeMesher {
    strategy: MeshingStrategy,
    surface: Option<IndexedMesh>,
    tags: FaceTags,
    walls: Vec<u32>,
}

impl VolumeMesher {
    /// Create a mesher using `strategy`.
    #[must_use]
    pub fn new(strategy: MeshingStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// The strategy chosen at construction.
    #[must_use]
    pub const fn strategy(&self) -> MeshingStrategy {
        self.strategy
    }

    /// Set the surface to fill and its per-triangle face IDs.
    ///
    /// The surface must be closed, manifold, consistently wound, free of
    /// self-intersections and enclose a volume. An inward-facing surface
    /// is flipped. Previously selected walls are cleared.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::TagMismatch`] when there is not one tag per
    ///   triangle
    /// - [`GenerationError::Validation`] when the surface fails a check
    pub fn set_surface(&mut self, mut mesh: IndexedMesh, tags: FaceTags) -> GenerationResult<()> {
        if tags.len() != mesh.faces.len() {
            return Err(GenerationError::TagMismatch {
                tags: tags.len(),
                faces: mesh.faces.len(),
            });
        }
        check_mesh(&mesh, &ValidationOptions::default())?;
        if mesh.is_inside_out() {
            warn!("surface faces inwards, flipping");
            mesh.flip_normals();
        }

        self.surface = Some(mesh);
        self.tags = tags;
        self.walls.clear();
        Ok(())
    }

    /// The current surface, if any.
    #[must_use]
    pub const fn surface(&self) -> Option<&IndexedMesh> {
        self.surface.as_ref()
    }

    /// Face IDs of the current surface.
    #[must_use]
    pub const fn tags(&self) -> &FaceTags {
        &self.tags
    }

    /// Sorted unique face IDs carried by the surface triangles.
    #[must_use]
    pub fn model_face_ids(&self) -> Vec<u32> {
        self.tags.face_ids()
    }

    /// Select the face IDs that form the wall.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::NoSurface`] before [`set_surface`](Self::set_surface)
    /// - [`GenerationError::UnknownFaceId`] for an ID no triangle carries
    pub fn set_walls(&mut self, ids: &[u32]) -> GenerationResult<()> {
        if self.surface.is_none() {
            return Err(GenerationError::NoSurface);
        }
        if let Some(&id) = ids.iter().find(|&&id| !self.tags.contains(id)) {
            return Err(GenerationError::UnknownFaceId { id });
        }
        let mut walls = ids.to_vec();
        walls.sort_unstable();
        walls.dedup();
        self.walls = walls;
        Ok(())
    }

    /// The selected wall IDs, sorted.
    #[must_use]
    pub fn walls(&self) -> &[u32] {
        &self.walls
    }

    /// Boundary triangles of `mesh` that carry a wall ID, as one compacted
    /// surface.
    #[must_use]
    pub fn wall_surface(&self, mesh: &TetMesh) -> IndexedMesh {
        let boundary = IndexedMesh::from_parts(mesh.vertices.clone(), mesh.boundary_faces.clone());
        let selected = mesh
            .boundary_ids
            .iter()
            .enumerate()
            .filter(|&(_, id)| self.walls.binary_search(id).is_ok())
            .map(|(i, _)| i);
        boundary.submesh(selected)
    }

    /// Generate the volume mesh.
    ///
    /// The result starts with the surface vertices in their original order.
    /// With `surface_mesh_flag` the surface triangles are emitted as
    /// boundary triangles with their face IDs; with `volume_mesh_flag` the
    /// enclosed volume is filled with positively oriented tetrahedra whose
    /// boundary is exactly the surface.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::InvalidOptions`] from [`TetGenOptions::validate`]
    /// - [`GenerationError::NoSurface`] before [`set_surface`](Self::set_surface)
    /// - [`GenerationError::SteinerLimit`] when the target size needs more
    ///   interior points than allowed
    /// - [`GenerationError::Stalled`] when part of the volume cannot be filled
    /// - [`GenerationError::ConformityViolated`] when the tetrahedra fail the
    ///   final check
    pub fn generate(&self, options: &TetGenOptions) -> GenerationResult<TetMesh> {
        options.validate()?;
        let surface = self.surface.as_ref().ok_or(GenerationError::NoSurface)?;

        info!(
            strategy = %self.strategy,
            faces = surface.faces.len(),
            edge_size = options.global_edge_size,
            "generating volume mesh"
        );

        let mut mesh = TetMesh::new();
        mesh.vertices.clone_from(&surface.vertices);

        if options.volume_mesh_flag {
            let output = match self.strategy {
                MeshingStrategy::Delaunay => delaunay::tetrahedralize(surface, options)?,
                MeshingStrategy::AdvancingFront => {
                    let grown = front::advance(surface, options)?;
                    delaunay::refine_to_size(surface, grown, options)?
                }
            };
            mesh.vertices = output.points.into_iter().map(Vertex::new).collect();
            mesh.tetrahedra = output.tetrahedra;
            verify(&mesh, surface)?;
        }

        if options.surface_mesh_flag {
            mesh.boundary_faces.clone_from(&surface.faces);
            mesh.boundary_ids = self.tags.as_slice().to_vec();
        }

        if mesh.tetrahedra.is_empty() {
            info!(
                nodes = mesh.node_count(),
                triangles = mesh.boundary_faces.len(),
                "surface mesh only"
            );
        } else {
            info!(
                nodes = mesh.node_count(),
                tets = mesh.element_count(),
                "{}",
                MeshQuality::from_mesh(&mesh)
            );
        }
        Ok(mesh)
    }
}

/// Positive orientation, boundary equality and volume equality.
fn verify(mesh: &TetMesh, surface: &IndexedMesh) -> GenerationResult<()> {
    let inverted = mesh.inverted_count();
    if inverted > 0 {
        return Err(GenerationError::ConformityViolated {
            reason: format!("{inverted} tetrahedra are flat or inverted"),
        });
    }
    if !mesh.boundary_matches(&surface.faces) {
        return Err(GenerationError::ConformityViolated {
            reason: "tetrahedra boundary differs from the surface".to_string(),
        });
    }
    let expected = surface.signed_volume();
    let volume = mesh.volume();
    if (volume - expected).abs() > VOLUME_TOLERANCE * expected.abs() {
        return Err(GenerationError::ConformityViolated {
            reason: format!("tetrahedra volume {volume} differs from enclosed volume {expected}"),
        });
    }
    Ok(())
}
