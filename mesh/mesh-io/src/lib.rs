//! Surface import and volume-mesh export for the tetrahedral meshing
//! pipeline.
//!
//! - **STL** (Stereolithography), binary and ASCII: loads the input surface
//!   as a triangle soup and writes surfaces back out
//! - **VTU** (VTK XML unstructured grid): writes the generated tetrahedra
//!   together with the tagged boundary triangles, and reads them back
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_stl, load_vtu};
//!
//! let soup = load_stl("cylinder.stl").unwrap();
//! println!("{} triangles", soup.faces.len());
//!
//! let volume = load_vtu("cylinder-mesh.vtu").unwrap();
//! println!("{} tetrahedra", volume.element_count());
//! ```
//!
//! # Round Trip
//!
//! A mesh written with [`save_vtu`] and read with [`load_vtu`] has the same
//! node count, the same tetrahedra and the same boundary face IDs.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod stl;
mod vtu;

pub use error::{IoError, IoResult};
pub use stl::{load_stl, parse_stl, save_stl, write_stl};
pub use vtu::{
    MODEL_FACE_ID, VTK_TETRA, VTK_TRIANGLE, load_vtu, read_vtu, save_vtu, write_vtu,
};
