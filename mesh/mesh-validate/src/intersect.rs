//! Self-intersection detection.
//!
//! A uniform grid over triangle bounding boxes finds candidate pairs; each
//! candidate is then decided exactly with
//! [`triangles_intersect`](mesh_types::predicates::triangles_intersect), so
//! adjacent triangles touching along their shared edge or vertex never
//! count.

use hashbrown::{HashMap, HashSet};
use mesh_types::predicates::triangles_intersect;
use mesh_types::{Aabb, IndexedMesh, MeshBounds, Point3};
use tracing::debug;

/// Find intersecting triangle pairs.
///
/// Returns up to `limit` pairs `(i, j)` with `i < j`, sorted. Face indices
/// must be valid.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_validate::find_self_intersections;
///
/// assert!(find_self_intersections(&unit_cube(), 10).is_empty());
/// ```
#[must_use]
pub fn find_self_intersections(mesh: &IndexedMesh, limit: usize) -> Vec<(usize, usize)> {
    if mesh.faces.len() < 2 || limit == 0 {
        return Vec::new();
    }

    let points = mesh.positions();
    let boxes: Vec<Aabb> = mesh
        .faces
        .iter()
        .map(|f| Aabb::from_points(f.iter().map(|&v| &points[v as usize])))
        .collect();

    let cell = cell_size(mesh, &boxes);
    let origin = mesh.bounds().min;
    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (fi, bb) in boxes.iter().enumerate() {
        let lo = grid_cell(&bb.min, &origin, cell);
        let hi = grid_cell(&bb.max, &origin, cell);
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    grid.entry((x, y, z)).or_default().push(fi);
                }
            }
        }
    }

    let mut tested: HashSet<(usize, usize)> = HashSet::new();
    let mut hits: Vec<(usize, usize)> = Vec::new();
    for bucket in grid.values() {
        for (k, &a) in bucket.iter().enumerate() {
            for &b in &bucket[k + 1..] {
                let pair = (a.min(b), a.max(b));
                if !boxes[a].intersects(&boxes[b]) || !tested.insert(pair) {
                    continue;
                }
                if triangles_intersect(mesh.faces[pair.0], mesh.faces[pair.1], &points) {
                    hits.push(pair);
                }
            }
        }
    }

    hits.sort_unstable();
    hits.truncate(limit);
    debug!(
        candidates = tested.len(),
        intersections = hits.len(),
        "self-intersection scan"
    );
    hits
}

/// Check if any two triangles intersect.
#[must_use]
pub fn has_self_intersections(mesh: &IndexedMesh) -> bool {
    !find_self_intersections(mesh, 1).is_empty()
}

#[allow(clippy::cast_precision_loss)]
// Precision: face counts are far below 2^52
fn cell_size(mesh: &IndexedMesh, boxes: &[Aabb]) -> f64 {
    let mean_extent =
        boxes.iter().map(Aabb::max_extent).sum::<f64>() / boxes.len() as f64;
    let fallback = mesh.bounds().max_extent();
    if mean_extent > 0.0 {
        (mean_extent * 2.0).max(fallback / 64.0)
    } else if fallback > 0.0 {
        fallback
    } else {
        1.0
    }
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: cell coordinates of finite meshes fit in i64
fn grid_cell(p: &Point3<f64>, origin: &Point3<f64>, cell: f64) -> (i64, i64, i64) {
    (
        ((p.x - origin.x) / cell).floor() as i64,
        ((p.y - origin.y) / cell).floor() as i64,
        ((p.z - origin.z) / cell).floor() as i64,
    )
}
