//! Tetrahedral mesh generation from closed triangulated surfaces.
//!
//! This umbrella crate re-exports the stage crates and ties them together
//! in a [`Pipeline`]:
//!
//! 1. import an STL surface, weld and validate it ([`validate`])
//! 2. group triangles into faces by dihedral angle ([`classify`])
//! 3. optionally remesh to `[hmin, hmax]` and classify again ([`remesh`])
//! 4. fill the volume with boundary-conforming tetrahedra ([`tetra`])
//! 5. export points, cells and face IDs as VTU ([`io`])
//!
//! State lives in explicit values: a [`SurfaceModel`] owns a surface and its
//! face IDs, a [`VolumeMesher`] owns the strategy it was built with.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! let config = PipelineConfig::new(0.4)
//!     .with_remesh_bounds(0.3, 0.5)
//!     .with_walls(vec![1]);
//! let output = Pipeline::new(config).run_file("cylinder.stl", "cylinder.vtu")?;
//! println!("{output}");
//! # Ok::<(), mesh::PipelineError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core data structures: `IndexedMesh`, `FaceTags`, `TetMesh`
//! - [`io`] - STL import, VTU export and import
//! - [`validate`] - Welding, manifold and self-intersection checks
//! - [`classify`] - Face classification by dihedral angle
//! - [`remesh`] - Feature-preserving isotropic remeshing
//! - [`tetra`] - Boundary-conforming volume meshing
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for meshes, params and
//!   [`PipelineConfig`]

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod error;
mod model;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use model::SurfaceModel;
pub use pipeline::{Pipeline, PipelineOutput};

pub use mesh_classify::ClassifyParams;
pub use mesh_remesh::RemeshParams;
pub use mesh_tetra::{MeshQuality, MeshingStrategy, TetGenOptions, VolumeMesher};
pub use mesh_validate::ImportParams;

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `FaceTags`, `TetMesh`.
pub use mesh_types as types;

/// STL and VTU file formats.
pub use mesh_io as io;

/// Surface import and validation.
pub use mesh_validate as validate;

/// Face classification by dihedral angle.
pub use mesh_classify as classify;

/// Feature-preserving isotropic remeshing.
pub use mesh_remesh as remesh;

/// Boundary-conforming tetrahedral meshing.
pub use mesh_tetra as tetra;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for mesh generation.
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{FaceTags, IndexedMesh, MeshBounds, MeshTopology, TetMesh, Vertex};

    // I/O
    pub use mesh_io::{load_stl, load_vtu, save_stl, save_vtu};

    // Stages
    pub use mesh_classify::{ClassifyParams, compute_boundary_faces};
    pub use mesh_remesh::{RemeshParams, remesh};
    pub use mesh_tetra::{MeshQuality, MeshingStrategy, TetGenOptions, VolumeMesher};
    pub use mesh_validate::{ImportParams, import_surface};

    // Pipeline
    pub use crate::{Pipeline, PipelineConfig, PipelineError, PipelineOutput, SurfaceModel};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let mesh = IndexedMesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(TetMesh::new().element_count(), 0);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::IndexedMesh::new();
        let _ = validate::ValidationOptions::default();
        let _ = classify::ClassifyParams::default();
        let _ = tetra::TetGenOptions::default();
    }
}
