//! Back-projection onto the input surface.

// Grid cell coordinates are small integers
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use mesh_types::{Aabb, IndexedMesh, Point3, Triangle, Vector3};

type Cell = (i64, i64, i64);

/// Uniform grid bucketing items by their bounding boxes.
struct Grid {
    cell_size: f64,
    origin: Point3<f64>,
    cells: HashMap<Cell, Vec<usize>>,
}

impl Grid {
    fn build(boxes: &[Aabb], cell_size: f64, origin: Point3<f64>) -> Self {
        let mut grid = Self {
            cell_size,
            origin,
            cells: HashMap::new(),
        };
        for (index, bounds) in boxes.iter().enumerate() {
            let (lo, hi) = (grid.cell_of(&bounds.min), grid.cell_of(&bounds.max));
            for x in lo.0..=hi.0 {
                for y in lo.1..=hi.1 {
                    for z in lo.2..=hi.2 {
                        grid.cells.entry((x, y, z)).or_default().push(index);
                    }
                }
            }
        }
        grid
    }

    fn cell_of(&self, p: &Point3<f64>) -> Cell {
        let q = (p - self.origin) / self.cell_size;
        (q.x.floor() as i64, q.y.floor() as i64, q.z.floor() as i64)
    }

    /// Closest candidate within `max_distance`, searching rings of cells
    /// outwards from `p`. `eval` maps an item to its closest point, or
    /// `None` to skip it.
    fn nearest(
        &self,
        p: &Point3<f64>,
        max_distance: f64,
        eval: impl Fn(usize) -> Option<Point3<f64>>,
    ) -> Option<Point3<f64>> {
        let center = self.cell_of(p);
        let max_ring = (max_distance / self.cell_size).ceil() as i64 + 1;
        let mut best: Option<(f64, Point3<f64>)> = None;

        for ring in 0..=max_ring {
            if let Some((dist_sq, _)) = best {
                let reach = (ring - 1).max(0) as f64 * self.cell_size;
                if reach * reach > dist_sq {
                    break;
                }
            }
            for x in center.0 - ring..=center.0 + ring {
                for y in center.1 - ring..=center.1 + ring {
                    for z in center.2 - ring..=center.2 + ring {
                        let on_shell = [x - center.0, y - center.1, z - center.2]
                            .iter()
                            .any(|d| d.abs() == ring);
                        if !on_shell {
                            continue;
                        }
                        let Some(items) = self.cells.get(&(x, y, z)) else {
                            continue;
                        };
                        for &item in items {
                            let Some(q) = eval(item) else {
                                continue;
                            };
                            let dist_sq = (q - p).norm_squared();
                            if best.is_none_or(|(d, _)| dist_sq < d) {
                                best = Some((dist_sq, q));
                            }
                        }
                    }
                }
            }
        }

        best.filter(|&(d, _)| d <= max_distance * max_distance)
            .map(|(_, q)| q)
    }
}

/// The input surface and its feature lines, kept for projection.
pub(crate) struct Reference {
    triangles: Vec<(Triangle, Option<Vector3<f64>>)>,
    triangle_grid: Grid,
    segments: Vec<(Point3<f64>, Point3<f64>)>,
    segment_grid: Grid,
    max_distance: f64,
    cos_normal: f64,
}

impl Reference {
    /// Index `mesh` and its feature edges.
    ///
    /// Points farther than `max_distance` from the surface are left alone;
    /// a smooth point only lands on triangles whose normal is within the
    /// angle given by `cos_normal` of its own.
    pub(crate) fn new(
        mesh: &IndexedMesh,
        features: &[(u32, u32)],
        cell_size: f64,
        max_distance: f64,
        cos_normal: f64,
    ) -> Self {
        let at = |v: u32| mesh.vertices[v as usize].position;
        let origin = Aabb::from_points(mesh.vertices.iter().map(|v| &v.position)).min;

        let triangles: Vec<(Triangle, Option<Vector3<f64>>)> = mesh
            .faces
            .iter()
            .map(|f| {
                let t = Triangle::new(at(f[0]), at(f[1]), at(f[2]));
                (t, t.normal())
            })
            .collect();
        let boxes: Vec<Aabb> = triangles
            .iter()
            .map(|(t, _)| Aabb::from_points([t.v0, t.v1, t.v2].iter()))
            .collect();
        let triangle_grid = Grid::build(&boxes, cell_size, origin);

        let segments: Vec<(Point3<f64>, Point3<f64>)> =
            features.iter().map(|&(a, b)| (at(a), at(b))).collect();
        let boxes: Vec<Aabb> = segments
            .iter()
            .map(|(a, b)| Aabb::from_points([*a, *b].iter()))
            .collect();
        let segment_grid = Grid::build(&boxes, cell_size, origin);

        Self {
            triangles,
            triangle_grid,
            segments,
            segment_grid,
            max_distance,
            cos_normal,
        }
    }

    /// Closest point on a triangle facing the same way as `normal`.
    pub(crate) fn project(&self, p: &Point3<f64>, normal: &Vector3<f64>) -> Option<Point3<f64>> {
        self.triangle_grid.nearest(p, self.max_distance, |i| {
            let (triangle, facing) = &self.triangles[i];
            facing
                .filter(|n| n.dot(normal) >= self.cos_normal)
                .map(|_| triangle.closest_point(p))
        })
    }

    /// Closest point on an input feature edge.
    pub(crate) fn project_to_features(&self, p: &Point3<f64>) -> Option<Point3<f64>> {
        self.segment_grid.nearest(p, self.max_distance, |i| {
            let (a, b) = self.segments[i];
            Some(closest_on_segment(p, &a, &b))
        })
    }
}

fn closest_on_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::MIN_POSITIVE {
        return *a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
