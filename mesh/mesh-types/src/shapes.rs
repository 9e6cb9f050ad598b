//! Closed reference surfaces.
//!
//! All shapes are watertight, outward-facing and welded.

use std::f64::consts::TAU;

use crate::{IndexedMesh, Vertex};

/// Unit cube from `(0,0,0)` to `(1,1,1)`, two triangles per side.
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity(8, 12);
    for &(x, y, z) in &[
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ] {
        mesh.vertices.push(Vertex::from_coords(x, y, z));
    }
    mesh.faces.extend_from_slice(&[
        // z = 0
        [0, 2, 1],
        [0, 3, 2],
        // z = 1
        [4, 5, 6],
        [4, 6, 7],
        // y = 0
        [0, 1, 5],
        [0, 5, 4],
        // y = 1
        [3, 7, 6],
        [3, 6, 2],
        // x = 0
        [0, 4, 7],
        [0, 7, 3],
        // x = 1
        [1, 2, 6],
        [1, 6, 5],
    ]);
    mesh
}

/// Corner tetrahedron spanning the unit axes.
#[must_use]
pub fn unit_tetrahedron() -> IndexedMesh {
    IndexedMesh::from_raw(
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        &[0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
    )
}

/// Closed cylinder along +Z with its base centered at the origin.
///
/// The lateral wall has `segments` vertices per ring and `rows` rings of
/// quads split into two triangles each. Each end cap is a fan around a
/// center vertex, the way most CAD exporters tessellate planar discs.
/// `segments` is clamped to at least 3 and `rows` to at least 1.
///
/// ```
/// use mesh_types::{cylinder, MeshTopology};
///
/// let cyl = cylinder(1.0, 5.0, 32, 10);
/// assert_eq!(cyl.face_count(), 32 * 10 * 2 + 2 * 32);
/// assert!(cyl.signed_volume() > 0.0);
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
// Truncation: mesh indices are u32; ring sizes are small
#[must_use]
pub fn cylinder(radius: f64, height: f64, segments: usize, rows: usize) -> IndexedMesh {
    let segments = segments.max(3);
    let rows = rows.max(1);
    let ring_len = segments as u32;
    let mut mesh = IndexedMesh::with_capacity(segments * (rows + 1) + 2, segments * (rows + 1) * 2);

    for r in 0..=rows {
        let z = height * r as f64 / rows as f64;
        for j in 0..segments {
            let theta = TAU * j as f64 / segments as f64;
            mesh.vertices.push(Vertex::from_coords(
                radius * theta.cos(),
                radius * theta.sin(),
                z,
            ));
        }
    }
    let bottom_center = mesh.vertices.len() as u32;
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    let top_center = bottom_center + 1;
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, height));

    let at = |r: usize, j: usize| r as u32 * ring_len + (j % segments) as u32;

    for r in 0..rows {
        for j in 0..segments {
            let a = at(r, j);
            let b = at(r, j + 1);
            let c = at(r + 1, j + 1);
            let d = at(r + 1, j);
            mesh.faces.push([a, b, c]);
            mesh.faces.push([a, c, d]);
        }
    }
    for j in 0..segments {
        mesh.faces.push([bottom_center, at(0, j + 1), at(0, j)]);
        mesh.faces.push([top_center, at(rows, j), at(rows, j + 1)]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeshBounds, MeshTopology};
    use std::f64::consts::PI;

    #[test]
    fn tetrahedron_is_closed_and_outward() {
        let tet = unit_tetrahedron();
        assert_eq!(tet.face_count(), 4);
        assert!((tet.signed_volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn cylinder_volume_approaches_analytic() {
        let cyl = cylinder(1.0, 5.0, 128, 4);
        let exact = PI * 5.0;
        let v = cyl.signed_volume();
        assert!(v > 0.0);
        assert!((v - exact).abs() / exact < 0.01);
        let b = cyl.bounds();
        assert!((b.max.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn cylinder_parameters_are_clamped() {
        let cyl = cylinder(1.0, 1.0, 1, 0);
        assert_eq!(cyl.vertex_count(), 3 * 2 + 2);
        assert!(cyl.indices_valid());
    }
}
