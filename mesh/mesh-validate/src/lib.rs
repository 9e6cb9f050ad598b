//! Surface import and validation for tetrahedral meshing.
//!
//! A volume mesher can only fill a surface that is closed, manifold,
//! consistently wound and free of self-intersections. This crate checks
//! those properties and prepares raw triangles for meshing:
//!
//! - Vertex welding (merge coincident STL corners)
//! - Unreferenced vertex removal
//! - Validation report (manifold, watertight, degenerate, duplicate,
//!   winding, self-intersection and volume checks)
//! - Fail-fast checking with a typed [`ValidationError`]
//! - Outward orientation
//!
//! # Example
//!
//! ```
//! use mesh_types::cylinder;
//! use mesh_validate::{import_surface, validate_mesh, ImportParams};
//!
//! let raw = cylinder(1.0, 5.0, 24, 8);
//! let report = validate_mesh(&raw);
//! println!("{report}");
//!
//! let surface = import_surface(&raw, &ImportParams::default()).unwrap();
//! assert!(surface.signed_volume() > 0.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
mod import;
mod intersect;
mod validate;
mod weld;

pub use adjacency::{MeshAdjacency, inconsistent_edges};
pub use error::{ValidationError, ValidationResult};
pub use import::{ImportParams, import_surface};
pub use intersect::{find_self_intersections, has_self_intersections};
pub use validate::{
    MeshReport, ValidationOptions, check_mesh, validate_mesh, validate_mesh_with_options,
};
pub use weld::{remove_unreferenced_vertices, weld_vertices};
