//! Element quality measures and the mesh quality report.

use std::fmt;

use mesh_types::TetMesh;
use mesh_types::predicates::orient3d;
use nalgebra::Point3;

/// Radius ratios below this count as degenerate.
const DEGENERATE_RADIUS_RATIO: f64 = 1e-3;

/// Center and radius of the sphere through four points.
///
/// `None` for flat tetrahedra.
#[must_use]
pub fn circumsphere(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<(Point3<f64>, f64)> {
    let u = b - a;
    let v = c - a;
    let w = d - a;
    let det = 2.0 * u.dot(&v.cross(&w));
    if det.abs() <= f64::MIN_POSITIVE {
        return None;
    }
    let offset = (v.cross(&w) * u.norm_squared()
        + w.cross(&u) * v.norm_squared()
        + u.cross(&v) * w.norm_squared())
        / det;
    offset
        .iter()
        .all(|x| x.is_finite())
        .then(|| (a + offset, offset.norm()))
}

/// Normalized radius ratio `3 r / R` in `[0, 1]`.
///
/// 1 for the regular tetrahedron, 0 for a flat one. Orientation is ignored.
///
/// ```
/// use mesh_tetra::radius_ratio;
/// use nalgebra::Point3;
///
/// let s = 1.0 / 2f64.sqrt();
/// let q = radius_ratio(
///     &Point3::new(1.0, 0.0, -s),
///     &Point3::new(-1.0, 0.0, -s),
///     &Point3::new(0.0, 1.0, s),
///     &Point3::new(0.0, -1.0, s),
/// );
/// assert!((q - 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn radius_ratio(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let Some((_, circumradius)) = circumsphere(a, b, c, d) else {
        return 0.0;
    };
    let volume = ((b - a).cross(&(c - a)).dot(&(d - a)) / 6.0).abs();
    let area = |p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>| (q - p).cross(&(r - p)).norm() / 2.0;
    let total_area = area(a, b, c) + area(a, b, d) + area(a, c, d) + area(b, c, d);
    if total_area <= 0.0 || circumradius <= 0.0 {
        return 0.0;
    }
    let inradius = 3.0 * volume / total_area;
    (3.0 * inradius / circumradius).clamp(0.0, 1.0)
}

/// Circumradius divided by the shortest edge.
///
/// `sqrt(6) / 4` for the regular tetrahedron; infinite when flat.
#[must_use]
pub fn radius_edge_ratio(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let Some((_, circumradius)) = circumsphere(a, b, c, d) else {
        return f64::INFINITY;
    };
    let shortest = [(a, b), (a, c), (a, d), (b, c), (b, d), (c, d)]
        .iter()
        .map(|(p, q)| (*q - *p).norm())
        .fold(f64::INFINITY, f64::min);
    if shortest > 0.0 {
        circumradius / shortest
    } else {
        f64::INFINITY
    }
}

/// Quality summary of a tetrahedral mesh.
///
/// # Example
///
/// ```
/// use mesh_tetra::MeshQuality;
/// use mesh_types::{TetMesh, Vertex};
///
/// let mut mesh = TetMesh::new();
/// mesh.vertices = vec![
///     Vertex::from_coords(0.0, 0.0, 0.0),
///     Vertex::from_coords(1.0, 0.0, 0.0),
///     Vertex::from_coords(0.0, 1.0, 0.0),
///     Vertex::from_coords(0.0, 0.0, 1.0),
/// ];
/// mesh.tetrahedra.push([0, 1, 2, 3]);
///
/// let quality = MeshQuality::from_mesh(&mesh);
/// assert_eq!(quality.inverted_count, 0);
/// assert!(quality.min_radius_ratio > 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshQuality {
    /// Number of tetrahedra measured.
    pub element_count: usize,
    /// Worst normalized radius ratio.
    pub min_radius_ratio: f64,
    /// Best normalized radius ratio.
    pub max_radius_ratio: f64,
    /// Mean normalized radius ratio.
    pub mean_radius_ratio: f64,
    /// Largest circumradius to shortest edge ratio.
    pub max_radius_edge_ratio: f64,
    /// Smallest signed tetrahedron volume.
    pub min_volume: f64,
    /// Largest signed tetrahedron volume.
    pub max_volume: f64,
    /// Tetrahedra that are flat or negatively oriented (exact test).
    pub inverted_count: usize,
    /// Tetrahedra with a radius ratio below `1e-3`.
    pub degenerate_count: usize,
}

impl MeshQuality {
    /// Measure every tetrahedron of `mesh`.
    ///
    /// Tetrahedra with out-of-range indices are skipped.
    #[must_use]
    pub fn from_mesh(mesh: &TetMesh) -> Self {
        let mut quality = Self {
            min_radius_ratio: f64::INFINITY,
            max_radius_ratio: f64::NEG_INFINITY,
            min_volume: f64::INFINITY,
            max_volume: f64::NEG_INFINITY,
            ..Self::default()
        };
        let mut ratio_sum = 0.0;

        for [a, b, c, d] in (0..mesh.element_count()).filter_map(|i| mesh.tet_points(i)) {
            let ratio = radius_ratio(&a, &b, &c, &d);
            let volume = (b - a).cross(&(c - a)).dot(&(d - a)) / 6.0;

            quality.element_count += 1;
            ratio_sum += ratio;
            quality.min_radius_ratio = quality.min_radius_ratio.min(ratio);
            quality.max_radius_ratio = quality.max_radius_ratio.max(ratio);
            quality.max_radius_edge_ratio = quality
                .max_radius_edge_ratio
                .max(radius_edge_ratio(&a, &b, &c, &d));
            quality.min_volume = quality.min_volume.min(volume);
            quality.max_volume = quality.max_volume.max(volume);
            if orient3d(&a, &b, &c, &d) <= 0.0 {
                quality.inverted_count += 1;
            }
            if ratio < DEGENERATE_RADIUS_RATIO {
                quality.degenerate_count += 1;
            }
        }

        if quality.element_count == 0 {
            return Self::default();
        }
        #[allow(clippy::cast_precision_loss)]
        // Precision: element counts stay far below 2^52
        {
            quality.mean_radius_ratio = ratio_sum / quality.element_count as f64;
        }
        quality
    }

    /// Check that no tetrahedron is inverted or degenerate.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.inverted_count == 0 && self.degenerate_count == 0
    }
}

impl fmt::Display for MeshQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quality: {} tets, radius ratio {:.3}..{:.3} (mean {:.3}), max radius-edge {:.2}, {} inverted, {} degenerate",
            self.element_count,
            self.min_radius_ratio,
            self.max_radius_ratio,
            self.mean_radius_ratio,
            self.max_radius_edge_ratio,
            self.inverted_count,
            self.degenerate_count
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::Vertex;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn circumsphere_of_corner_tet() {
        let (center, radius) = circumsphere(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
            &p(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert!((center - p(0.5, 0.5, 0.5)).norm() < 1e-12);
        assert!((radius - 0.75f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn flat_tets_have_no_quality() {
        let (a, b, c, d) = (
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
        );
        assert!(circumsphere(&a, &b, &c, &d).is_none());
        assert!(radius_ratio(&a, &b, &c, &d) < 1e-12);
        assert!(radius_edge_ratio(&a, &b, &c, &d).is_infinite());
    }

    #[test]
    fn regular_tet_radius_edge_ratio() {
        let s = 1.0 / 2f64.sqrt();
        let ratio = radius_edge_ratio(
            &p(1.0, 0.0, -s),
            &p(-1.0, 0.0, -s),
            &p(0.0, 1.0, s),
            &p(0.0, -1.0, s),
        );
        assert!((ratio - 6f64.sqrt() / 4.0).abs() < 1e-9);
    }

    #[test]
    fn sliver_scores_low() {
        let q = radius_ratio(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(1.0, 1.0, 0.01),
            &p(0.0, 1.0, 0.0),
        );
        assert!(q < 0.1);
    }

    #[test]
    fn report_counts_inverted() {
        let mut mesh = TetMesh::new();
        mesh.vertices = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
            Vertex::from_coords(0.0, 0.0, 1.0),
        ];
        mesh.tetrahedra = vec![[0, 1, 2, 3], [0, 2, 1, 3]];
        let quality = MeshQuality::from_mesh(&mesh);
        assert_eq!(quality.element_count, 2);
        assert_eq!(quality.inverted_count, 1);
        assert!(!quality.is_valid());
        assert!(quality.min_volume < 0.0);
        assert!(quality.to_string().starts_with("Quality: 2 tets"));
    }

    #[test]
    fn empty_report() {
        let quality = MeshQuality::from_mesh(&TetMesh::new());
        assert_eq!(quality, MeshQuality::default());
        assert!(quality.is_valid());
    }
}
