//! Classification parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use mesh_validate::{ValidationError, ValidationResult};

/// Parameters for dihedral-angle face classification.
///
/// # Example
///
/// ```
/// use mesh_classify::ClassifyParams;
///
/// let params = ClassifyParams::default();
/// assert_eq!(params.angle_threshold_deg, 60.0);
///
/// let fine = ClassifyParams::default().with_angle_threshold(20.0);
/// assert_eq!(fine.angle_threshold_deg, 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassifyParams {
    /// Adjacent triangles whose normals differ by less than this angle (in
    /// degrees) belong to the same face.
    ///
    /// Default: `60.0`
    pub angle_threshold_deg: f64,

    /// Triangles with area at or below this are rejected as degenerate.
    ///
    /// Default: `1e-12`
    pub degenerate_area_threshold: f64,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            angle_threshold_deg: 60.0,
            degenerate_area_threshold: 1e-12,
        }
    }
}

impl ClassifyParams {
    /// Split faces at gentle creases too (30 degrees).
    #[must_use]
    pub fn fine() -> Self {
        Self {
            angle_threshold_deg: 30.0,
            ..Self::default()
        }
    }

    /// Only split faces at sharp corners (85 degrees).
    #[must_use]
    pub fn coarse() -> Self {
        Self {
            angle_threshold_deg: 85.0,
            ..Self::default()
        }
    }

    /// Set the dihedral angle threshold in degrees.
    #[must_use]
    pub const fn with_angle_threshold(mut self, degrees: f64) -> Self {
        self.angle_threshold_deg = degrees;
        self
    }

    /// Set the degenerate area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Threshold in radians.
    #[must_use]
    pub fn angle_threshold_rad(&self) -> f64 {
        self.angle_threshold_deg.to_radians()
    }

    /// Check the threshold lies in `(0, 180]` degrees.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAngle`] otherwise.
    pub fn validate(&self) -> ValidationResult<()> {
        let deg = self.angle_threshold_deg;
        if deg.is_finite() && deg > 0.0 && deg <= 180.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidAngle { degrees: deg })
        }
    }
}
