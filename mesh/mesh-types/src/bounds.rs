//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned box, used to size spatial grids and to cull
/// triangle pairs before exact tests.
///
/// A box built from no points has `min > max` on every axis and reports
/// [`is_empty`](Self::is_empty).
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
///
/// let corners = [Point3::new(0.0, 4.0, 0.0), Point3::new(2.0, 0.0, 5.0)];
/// let aabb = Aabb::from_points(corners.iter());
///
/// assert!((aabb.min_extent() - 2.0).abs() < 1e-12);
/// assert!((aabb.max_extent() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Lower corner.
    pub min: Point3<f64>,
    /// Upper corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// The box spanned by two opposite corners, in any order.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// The smallest box holding every point.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        points.fold(Self::default(), |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        })
    }

    /// True when the box holds no point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Side lengths.
    #[must_use]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Longest side.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        self.extent().max()
    }

    /// Shortest side.
    #[must_use]
    pub fn min_extent(&self) -> f64 {
        self.extent().min()
    }

    /// Closed-interval overlap on all three axes.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// The box grown by `margin` in every direction.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        let pad = Vector3::repeat(margin);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Point3::from(Vector3::repeat(f64::INFINITY)),
            max: Point3::from(Vector3::repeat(f64::NEG_INFINITY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_points_give_an_empty_box() {
        let aabb = Aabb::from_points(std::iter::empty());
        assert!(aabb.is_empty());
        assert_eq!(aabb, Aabb::default());
    }

    #[test]
    fn corners_may_come_in_any_order() {
        let a = Aabb::new(Point3::new(1.0, 0.0, 1.0), Point3::new(0.0, 1.0, 0.0));
        assert_eq!(a.min, Point3::origin());
        assert_eq!(a.max, Point3::new(1.0, 1.0, 1.0));
        assert!((a.center().z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.expanded(0.5).intersects(&c));
    }
}
