//! Remeshing parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SizingError, SizingResult};

const SPLIT_RATIO: f64 = 4.0 / 3.0;
const MIN_SPLIT_RATIO: f64 = 5.0 / 4.0;
const COLLAPSE_RATIO: f64 = 4.0 / 5.0;

/// Parameters for feature-preserving isotropic remeshing.
///
/// Edges are driven towards the target length `(hmin + hmax) / 2`. Edges
/// longer than [`split_length`](Self::split_length) are split, edges shorter
/// than [`collapse_length`](Self::collapse_length) are collapsed.
///
/// # Example
///
/// ```
/// use mesh_remesh::RemeshParams;
///
/// let params = RemeshParams::new(0.3, 0.5).with_iterations(8);
/// assert!((params.target_length() - 0.4).abs() < 1e-12);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemeshParams {
    /// Smallest acceptable edge length (hmin).
    pub min_edge_length: f64,

    /// Largest acceptable edge length (hmax).
    pub max_edge_length: f64,

    /// Number of split/collapse/flip/smooth rounds.
    pub iterations: u32,

    /// Edges whose dihedral angle exceeds this (degrees) are feature
    /// edges: never flipped, only split or collapsed along their line.
    pub feature_angle_deg: f64,

    /// Relative slack used by
    /// [`EdgeStatistics::fraction_within_bounds`](crate::EdgeStatistics::fraction_within_bounds).
    pub length_tolerance: f64,

    /// Step size of tangential smoothing, in `[0, 1]`.
    pub smoothing_weight: f64,
}

impl Default for RemeshParams {
    fn default() -> Self {
        Self {
            min_edge_length: 0.8,
            max_edge_length: 1.2,
            iterations: 10,
            feature_angle_deg: 45.0,
            length_tolerance: 0.25,
            smoothing_weight: 0.5,
        }
    }
}

impl RemeshParams {
    /// Parameters for edge lengths between `hmin` and `hmax`.
    #[must_use]
    pub fn new(hmin: f64, hmax: f64) -> Self {
        Self {
            min_edge_length: hmin,
            max_edge_length: hmax,
            ..Self::default()
        }
    }

    /// Parameters centred on one edge length (±20%).
    #[must_use]
    pub fn with_edge_length(target: f64) -> Self {
        Self::new(target * 0.8, target * 1.2)
    }

    /// Few rounds, for previews.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            iterations: 3,
            ..Self::default()
        }
    }

    /// Many rounds with gentler smoothing.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            iterations: 20,
            smoothing_weight: 0.3,
            ..Self::default()
        }
    }

    /// Set both edge length bounds.
    #[must_use]
    pub const fn with_bounds(mut self, hmin: f64, hmax: f64) -> Self {
        self.min_edge_length = hmin;
        self.max_edge_length = hmax;
        self
    }

    /// Set number of iterations.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the feature angle in degrees.
    #[must_use]
    pub const fn with_feature_angle(mut self, degrees: f64) -> Self {
        self.feature_angle_deg = degrees;
        self
    }

    /// Set the tolerance band for edge statistics.
    #[must_use]
    pub const fn with_length_tolerance(mut self, tolerance: f64) -> Self {
        self.length_tolerance = tolerance;
        self
    }

    /// Set the smoothing step size.
    #[must_use]
    pub const fn with_smoothing_weight(mut self, weight: f64) -> Self {
        self.smoothing_weight = weight;
        self
    }

    /// Target edge length, the mean of the bounds.
    #[must_use]
    pub fn target_length(&self) -> f64 {
        0.5 * (self.min_edge_length + self.max_edge_length)
    }

    /// Edges longer than this are split.
    ///
    /// `4/3` of the target, pulled down to `hmax` while it stays at least
    /// `5/4` of the target. Narrower bands keep the `5/4` floor so that
    /// halves of a split edge are not collapsed straight back.
    #[must_use]
    pub fn split_length(&self) -> f64 {
        let target = self.target_length();
        (target * SPLIT_RATIO)
            .min(self.max_edge_length)
            .max(target * MIN_SPLIT_RATIO)
    }

    /// Edges shorter than this are collapsed: `4/5` of the target.
    #[must_use]
    pub fn collapse_length(&self) -> f64 {
        self.target_length() * COLLAPSE_RATIO
    }

    /// Check the bounds and iteration count.
    ///
    /// # Errors
    ///
    /// - [`SizingError::InvalidBounds`] for non-finite or non-positive bounds
    /// - [`SizingError::InvertedBounds`] when `hmin > hmax`
    /// - [`SizingError::InvalidIterations`] for zero iterations
    pub fn validate(&self) -> SizingResult<()> {
        let (min, max) = (self.min_edge_length, self.max_edge_length);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0) {
            return Err(SizingError::InvalidBounds { min, max });
        }
        if min > max {
            return Err(SizingError::InvertedBounds { min, max });
        }
        if self.iterations == 0 {
            return Err(SizingError::InvalidIterations(0));
        }
        Ok(())
    }
}
