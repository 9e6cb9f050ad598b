//! Boundary-conforming tetrahedral volume meshing.
//!
//! [`VolumeMesher`] fills a closed, tagged surface with tetrahedra. Every
//! surface triangle survives unchanged as a face of exactly one
//! tetrahedron, so face IDs assigned on the surface carry over to the
//! volume mesh boundary.
//!
//! Two strategies are available, chosen when the mesher is built:
//!
//! - [`MeshingStrategy::Delaunay`] - seed tetrahedralization refined by
//!   constrained Bowyer-Watson point insertion
//! - [`MeshingStrategy::AdvancingFront`] - tetrahedra grown inwards from the
//!   surface
//!
//! Interior points are only ever inserted strictly inside tetrahedra, and
//! cavities are kept star-shaped from the inserted point. The result is
//! checked before it is returned: positive orientation, boundary equal to
//! the surface, and total volume equal to the enclosed volume.
//!
//! # Example
//!
//! ```
//! use mesh_tetra::{MeshQuality, MeshingStrategy, TetGenOptions, VolumeMesher};
//! use mesh_types::{FaceTags, cylinder};
//!
//! let surface = cylinder(1.0, 3.0, 16, 6);
//! let tags = FaceTags::from_vec(vec![1; surface.faces.len()]);
//!
//! let mut mesher = VolumeMesher::new(MeshingStrategy::Delaunay);
//! mesher.set_surface(surface.clone(), tags)?;
//! let mesh = mesher.generate(&TetGenOptions::new(0.5))?;
//!
//! assert!(mesh.boundary_matches(&surface.faces));
//! assert_eq!(MeshQuality::from_mesh(&mesh).inverted_count, 0);
//! # Ok::<(), mesh_tetra::GenerationError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod complex;
mod delaunay;
mod error;
mod front;
mod kernel;
mod mesher;
mod options;
mod quality;
mod spatial;

pub use error::{GenerationError, GenerationResult};
pub use mesher::VolumeMesher;
pub use options::{MeshingStrategy, TetGenOptions};
pub use quality::{MeshQuality, circumsphere, radius_edge_ratio, radius_ratio};
