//! Feature-preserving isotropic surface remeshing.
//!
//! Volume meshers fill a surface with tetrahedra whose size follows the
//! boundary triangles, so the surface is first brought to a uniform edge
//! length between `hmin` and `hmax`. Each iteration performs:
//! - **Split**: Long edges are split at their midpoint
//! - **Collapse**: Short edges are collapsed to a single vertex
//! - **Flip**: Edges are flipped to equalize vertex valences
//! - **Smooth**: Vertices are relaxed tangentially and projected back onto
//!   the input surface
//!
//! Sharp edges (above the feature angle) survive: the surface stays closed,
//! and the faces a classifier finds before remeshing are found again after
//! it. The triangle-level face tags themselves are not carried over.
//!
//! # Example
//!
//! ```
//! use mesh_types::cylinder;
//! use mesh_remesh::{remesh, RemeshParams};
//!
//! let surface = cylinder(1.0, 5.0, 32, 10);
//! let params = RemeshParams::new(0.3, 0.5);
//! let result = remesh(&surface, &params)?;
//!
//! println!("{result}");
//! assert!(result.stats.final_edges.fraction_within_bounds(&params) > 0.5);
//! # Ok::<(), mesh_remesh::SizingError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod params;
mod project;
mod remesh;
mod result;
mod surface;

pub use error::{SizingError, SizingResult};
pub use params::RemeshParams;
pub use remesh::remesh;
pub use result::{EdgeStatistics, RemeshOutput, RemeshStats};
