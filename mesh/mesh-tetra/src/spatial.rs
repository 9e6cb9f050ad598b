//! Uniform grids for the proximity queries of point placement.

use std::f64::consts::PI;

use hashbrown::HashMap;
use mesh_types::{Aabb, IndexedMesh, MeshBounds, Triangle};
use nalgebra::{Point3, Vector3};

pub(crate) type Cell = (i64, i64, i64);

/// Most cells a grid spans along its longest axis.
const MAX_CELLS_PER_AXIS: f64 = 256.0;

#[allow(clippy::cast_possible_truncation)]
// Truncation: coordinates divided by the cell size stay far inside i64
pub(crate) fn cell_of(p: &Point3<f64>, size: f64) -> Cell {
    (
        (p.x / size).floor() as i64,
        (p.y / size).floor() as i64,
        (p.z / size).floor() as i64,
    )
}

/// Every cell overlapped by a box.
pub(crate) fn cells_in(bounds: &Aabb, size: f64) -> impl Iterator<Item = Cell> {
    let lo = cell_of(&bounds.min, size);
    let hi = cell_of(&bounds.max, size);
    (lo.0..=hi.0).flat_map(move |x| {
        (lo.1..=hi.1).flat_map(move |y| (lo.2..=hi.2).map(move |z| (x, y, z)))
    })
}

/// A cell size of about `target` that keeps the grid over `bounds` small.
pub(crate) fn grid_cell_size(bounds: &Aabb, target: f64) -> f64 {
    target.max(bounds.max_extent() / MAX_CELLS_PER_AXIS)
}

/// Point indices bucketed by cell.
#[derive(Debug, Clone)]
pub(crate) struct PointGrid {
    size: f64,
    cells: HashMap<Cell, Vec<u32>>,
}

impl PointGrid {
    pub(crate) fn new(size: f64) -> Self {
        Self {
            size,
            cells: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, index: u32, p: &Point3<f64>) {
        self.cells.entry(cell_of(p, self.size)).or_default().push(index);
    }

    /// Indices of points possibly within `radius` of `p`, in insertion
    /// order per cell.
    pub(crate) fn near(&self, p: &Point3<f64>, radius: f64) -> Vec<u32> {
        let query = Aabb::new(p - Vector3::repeat(radius), p + Vector3::repeat(radius));
        let mut found = Vec::new();
        for cell in cells_in(&query, self.size) {
            if let Some(bucket) = self.cells.get(&cell) {
                found.extend_from_slice(bucket);
            }
        }
        found
    }

    /// Check if any point passing `filter` lies closer than `radius`.
    pub(crate) fn any_within(
        &self,
        p: &Point3<f64>,
        radius: f64,
        points: &[Point3<f64>],
        filter: impl Fn(u32) -> bool,
    ) -> bool {
        let r2 = radius * radius;
        self.near(p, radius)
            .into_iter()
            .any(|i| filter(i) && (points[i as usize] - p).norm_squared() < r2)
    }
}

/// Closed surface prepared for inside and clearance tests.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceIndex {
    triangles: Vec<Triangle>,
    size: f64,
    cells: HashMap<Cell, Vec<usize>>,
}

impl SurfaceIndex {
    pub(crate) fn new(mesh: &IndexedMesh, target: f64) -> Self {
        let size = grid_cell_size(&mesh.bounds(), target);
        let triangles: Vec<Triangle> = mesh
            .faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|v| mesh.vertices[v as usize].position);
                Triangle::new(a, b, c)
            })
            .collect();

        let mut cells: HashMap<Cell, Vec<usize>> = HashMap::new();
        for (i, t) in triangles.iter().enumerate() {
            let bounds = Aabb::from_points([t.v0, t.v1, t.v2].iter());
            for cell in cells_in(&bounds, size) {
                cells.entry(cell).or_default().push(i);
            }
        }
        Self {
            triangles,
            size,
            cells,
        }
    }

    /// Check that no triangle comes closer to `p` than `clearance`.
    pub(crate) fn is_clear(&self, p: &Point3<f64>, clearance: f64) -> bool {
        let query = Aabb::new(p - Vector3::repeat(clearance), p + Vector3::repeat(clearance));
        cells_in(&query, self.size)
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .all(|&i| self.triangles[i].distance_to(p) >= clearance)
    }

    /// Generalized winding number: about 1 inside an outward surface, 0
    /// outside.
    pub(crate) fn winding_number(&self, p: &Point3<f64>) -> f64 {
        let total: f64 = self
            .triangles
            .iter()
            .map(|t| solid_angle(&(t.v0 - p), &(t.v1 - p), &(t.v2 - p)))
            .sum();
        total / (4.0 * PI)
    }

    /// Inside the surface and at least `clearance` away from it.
    pub(crate) fn admits(&self, p: &Point3<f64>, clearance: f64) -> bool {
        self.is_clear(p, clearance) && self.winding_number(p) > 0.5
    }
}

/// Signed solid angle of a triangle seen from the origin.
fn solid_angle(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    let (la, lb, lc) = (a.norm(), b.norm(), c.norm());
    let numerator = a.dot(&b.cross(c));
    let denominator = la * lb * lc + a.dot(b) * lc + a.dot(c) * lb + b.dot(c) * la;
    2.0 * numerator.atan2(denominator)
}
