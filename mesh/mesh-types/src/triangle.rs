//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle with concrete vertex positions.
///
/// Winding is counter-clockwise when viewed from the front, so the normal
/// points toward the viewer.
///
/// # Example
///
/// ```
/// use mesh_types::{Triangle, Point3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
///
/// assert!((tri.area() - 0.5).abs() < 1e-10);
/// let normal = tri.normal().unwrap();
/// assert!((normal.z - 1.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal; its length is twice the area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit face normal, or `None` for a zero-area triangle.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len = n.norm();
        if len > f64::EPSILON * 1e-6 {
            Some(n / len)
        } else {
            None
        }
    }

    /// Triangle area.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Centroid.
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Edge lengths in the order `v0v1`, `v1v2`, `v2v0`.
    #[must_use]
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            (self.v1 - self.v0).norm(),
            (self.v2 - self.v1).norm(),
            (self.v0 - self.v2).norm(),
        ]
    }

    /// Length of the longest edge.
    #[must_use]
    pub fn max_edge_length(&self) -> f64 {
        let [a, b, c] = self.edge_lengths();
        a.max(b).max(c)
    }

    /// Ratio of the longest edge to the shortest altitude.
    ///
    /// Equilateral triangles give about `1.15`; degenerate ones give infinity.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return f64::INFINITY;
        }
        let longest = self.max_edge_length();
        let min_altitude = 2.0 * area / longest;
        longest / min_altitude
    }

    /// Check if the area is at or below a threshold.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self, area_threshold: f64) -> bool {
        self.area() <= area_threshold
    }

    /// Same triangle with reversed winding.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self {
            v0: self.v0,
            v1: self.v2,
            v2: self.v1,
        }
    }

    /// Closest point on the (closed) triangle to `p`.
    ///
    /// Region-based evaluation over vertices, edges and the interior.
    #[must_use]
    pub fn closest_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() < f64::MIN_POSITIVE {
            return a;
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }

    /// Distance from `p` to the closed triangle.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, p: &Point3<f64>) -> f64 {
        (self.closest_point(p) - p).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn area_and_normal() {
        let tri = right_triangle();
        assert!((tri.area() - 0.5).abs() < 1e-12);
        let n = tri.normal().unwrap_or_else(Vector3::zeros);
        assert!((n.z - 1.0).abs() < 1e-12);
        let flipped = tri.reversed().normal().unwrap_or_else(Vector3::zeros);
        assert!((flipped.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_triangle() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
        assert!(tri.is_degenerate(1e-12));
        assert!(tri.aspect_ratio().is_infinite());
    }

    #[test]
    fn equilateral_aspect_ratio() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 3.0_f64.sqrt(), 0.0),
        );
        let ar = tri.aspect_ratio();
        assert!(ar > 1.1 && ar < 1.2);
    }

    #[test]
    fn closest_point_regions() {
        let tri = right_triangle();

        // Above the interior
        let p = tri.closest_point(&Point3::new(0.25, 0.25, 3.0));
        assert!((p - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-12);

        // Vertex region
        let p = tri.closest_point(&Point3::new(-1.0, -1.0, 0.0));
        assert!((p - Point3::new(0.0, 0.0, 0.0)).norm() < 1e-12);

        // Hypotenuse region
        let p = tri.closest_point(&Point3::new(1.0, 1.0, 0.0));
        assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);

        // Edge along x
        assert!((tri.distance_to(&Point3::new(0.5, -2.0, 0.0)) - 2.0).abs() < 1e-12);
    }
}
