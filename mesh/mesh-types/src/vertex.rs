//! Mesh vertex.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node shared by surface and volume meshes.
///
/// Only the position is stored. Volume meshes start with the vertices of
/// the surface they were generated from, in the same order, so a surface
/// vertex index is also a volume node index.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Vertex};
///
/// let v: Vertex = [1.0, 2.0, 3.0].into();
/// assert_eq!(v, Vertex::new(Point3::new(1.0, 2.0, 3.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in 3D space.
    pub position: Point3<f64>,
}

impl Vertex {
    /// A vertex at `position`.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// A vertex at `(x, y, z)`.
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

impl From<[f64; 3]> for Vertex {
    fn from(coords: [f64; 3]) -> Self {
        Self::new(Point3::from(coords))
    }
}
