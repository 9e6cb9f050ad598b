//! Kernel points and star decompositions.
//!
//! A point that sees every triangle of a closed, outward surface from the
//! inside lies in the surface's kernel. Coning the triangles to such a point
//! fills the enclosed volume with positively oriented tetrahedra whose
//! outer faces are exactly the input triangles.

use mesh_types::Aabb;
use mesh_types::predicates::orient3d;
use nalgebra::{Point3, Vector3};

/// Relaxation steps per margin.
const MAX_STEPS: usize = 400;

/// Margins tried, as fractions of the smallest bounding box extent.
const MARGINS: [f64; 6] = [0.25, 0.1, 0.04, 0.01, 1e-3, 1e-5];

/// Check if `k` sees every outward triangle strictly from the inside.
pub(crate) fn is_kernel_point(points: &[Point3<f64>], faces: &[[u32; 3]], k: &Point3<f64>) -> bool {
    faces.iter().all(|&[a, b, c]| {
        orient3d(
            &points[a as usize],
            &points[b as usize],
            &points[c as usize],
            k,
        ) < 0.0
    })
}

/// Search the kernel of a closed, outward surface.
///
/// Starts from the volume centroid and projects onto the most violated
/// face plane until every plane is cleared by a margin, trying smaller
/// margins when the kernel is thin. `None` when the surface is not
/// star-shaped (or its kernel is too thin to find).
pub(crate) fn find_kernel_point(points: &[Point3<f64>], faces: &[[u32; 3]]) -> Option<Point3<f64>> {
    let planes: Vec<(Vector3<f64>, f64)> = faces
        .iter()
        .filter_map(|&[a, b, c]| {
            let pa = points[a as usize];
            let n = (points[b as usize] - pa).cross(&(points[c as usize] - pa));
            let n = n.try_normalize(0.0)?;
            Some((n, n.dot(&pa.coords)))
        })
        .collect();
    if planes.is_empty() {
        return None;
    }

    let bounds = Aabb::from_points(faces.iter().flatten().map(|&v| &points[v as usize]));
    let extent = bounds.min_extent();
    let start = volume_centroid(points, faces).unwrap_or_else(|| bounds.center());

    for fraction in MARGINS {
        let margin = fraction * extent;
        let mut k = start;
        for _ in 0..MAX_STEPS {
            let worst = planes
                .iter()
                .map(|(n, d)| (n, n.dot(&k.coords) - d + margin))
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let Some((n, violation)) = worst else {
                break;
            };
            if violation <= 0.0 {
                break;
            }
            k -= n * violation;
        }
        if is_kernel_point(points, faces, &k) {
            return Some(k);
        }
    }
    None
}

/// Tetrahedra joining each outward triangle to `apex`.
///
/// Positively oriented when `apex` is a kernel point.
pub(crate) fn cone(faces: &[[u32; 3]], apex: u32) -> Vec<[u32; 4]> {
    faces.iter().map(|&[a, b, c]| [a, c, b, apex]).collect()
}

fn volume_centroid(points: &[Point3<f64>], faces: &[[u32; 3]]) -> Option<Point3<f64>> {
    let mut volume = 0.0;
    let mut moment = Vector3::zeros();
    for &[a, b, c] in faces {
        let (pa, pb, pc) = (
            points[a as usize].coords,
            points[b as usize].coords,
            points[c as usize].coords,
        );
        let v = pa.dot(&pb.cross(&pc)) / 6.0;
        volume += v;
        moment += (pa + pb + pc) * (v / 4.0);
    }
    (volume.abs() > f64::MIN_POSITIVE).then(|| Point3::from(moment / volume))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{TetMesh, Vertex, cylinder, unit_cube};

    #[test]
    fn cube_centroid_is_in_kernel() {
        let cube = unit_cube();
        let points = cube.positions();
        let k = find_kernel_point(&points, &cube.faces).unwrap();
        assert!((k - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-9);
    }

    #[test]
    fn cone_fills_cylinder() {
        let surface = cylinder(1.0, 5.0, 16, 4);
        let mut points = surface.positions();
        let k = find_kernel_point(&points, &surface.faces).unwrap();
        points.push(k);
        let apex = u32::try_from(points.len() - 1).unwrap();

        let mut mesh = TetMesh::new();
        mesh.vertices = points.iter().map(|p| Vertex::new(*p)).collect();
        mesh.tetrahedra = cone(&surface.faces, apex);
        assert_eq!(mesh.inverted_count(), 0);
        assert!(mesh.boundary_matches(&surface.faces));
        assert!((mesh.volume() - surface.signed_volume()).abs() < 1e-9);
    }

    #[test]
    fn disconnected_boxes_have_no_kernel() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(3.0, 0.0, 0.0));
        a.merge(&b);
        assert!(find_kernel_point(&a.positions(), &a.faces).is_none());
    }

    #[test]
    fn touching_boxes_share_no_interior_view() {
        // Two closed cubes touching along a face: the faces at x = 1 face
        // each other, so no point sees both from inside.
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(1.0, 0.0, 0.0));
        a.merge(&b);
        assert!(find_kernel_point(&a.positions(), &a.faces).is_none());
    }
}
