//! Boundary face classification for closed surfaces.
//!
//! A CAD surface arrives as one bag of triangles. Downstream stages need to
//! know which triangles make up each logical face (a cap, a wall) so they
//! can keep its boundary and tag the volume mesh. This crate recovers those
//! faces from geometry alone:
//!
//! - Adjacent triangles belong to the same face when their normals differ
//!   by less than an angle threshold (60° by default)
//! - Faces are flood-filled and numbered from 1 in discovery order
//! - Feature edges (between faces) and per-face surfaces can be extracted
//!
//! # Example
//!
//! ```
//! use mesh_types::cylinder;
//! use mesh_classify::{compute_boundary_faces, extract_face, ClassifyParams};
//!
//! let surface = cylinder(1.0, 5.0, 32, 10);
//! let result = compute_boundary_faces(&surface, &ClassifyParams::default()).unwrap();
//! assert_eq!(result.face_count, 3);
//!
//! let bottom = extract_face(&surface, &result.tags, 2);
//! println!("bottom cap: {} triangles", bottom.faces.len());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod classify;
mod params;
mod result;

pub use adjacency::FaceAdjacency;
pub use classify::{compute_boundary_faces, extract_face, extract_faces, feature_edges};
pub use params::ClassifyParams;
pub use result::Classification;
