//! Volume meshing options.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

/// How the volume is filled.
///
/// Both strategies keep every input triangle as a tetrahedron face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshingStrategy {
    /// Seed tetrahedralization followed by constrained Bowyer-Watson
    /// insertion of interior points.
    #[default]
    Delaunay,

    /// Tetrahedra grown inwards from the surface at the target size, with
    /// leftover cavities closed by a star decomposition and unresolved
    /// cores filled by constrained insertion.
    AdvancingFront,
}

impl MeshingStrategy {
    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Delaunay => "delaunay",
            Self::AdvancingFront => "advancing-front",
        }
    }
}

impl fmt::Display for MeshingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for [`VolumeMesher::generate`](crate::VolumeMesher::generate).
///
/// # Example
///
/// ```
/// use mesh_tetra::TetGenOptions;
///
/// let options = TetGenOptions::new(0.4).with_max_steiner_points(Some(50_000));
/// assert!(options.validate().is_ok());
///
/// let surface_only = TetGenOptions::surface_only(0.4);
/// assert!(!surface_only.volume_mesh_flag);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TetGenOptions {
    /// Target edge length of interior tetrahedra.
    pub global_edge_size: f64,

    /// Emit the boundary triangles with their face IDs.
    pub surface_mesh_flag: bool,

    /// Generate tetrahedra. When unset only the surface is emitted.
    pub volume_mesh_flag: bool,

    /// Upper bound on the circumradius to shortest edge ratio. Tetrahedra
    /// above it get their circumcenter inserted when there is room.
    /// `None` disables quality refinement.
    pub quality_ratio: Option<f64>,

    /// Maximum number of interior (Steiner) points. `None` means no limit.
    pub max_steiner_points: Option<usize>,
}

impl Default for TetGenOptions {
    fn default() -> Self {
        Self {
            global_edge_size: 1.0,
            surface_mesh_flag: true,
            volume_mesh_flag: true,
            quality_ratio: Some(2.0),
            max_steiner_points: None,
        }
    }
}

impl TetGenOptions {
    /// Surface and volume output at the given edge size.
    #[must_use]
    pub fn new(global_edge_size: f64) -> Self {
        Self {
            global_edge_size,
            ..Self::default()
        }
    }

    /// Boundary triangles only, no tetrahedra.
    #[must_use]
    pub fn surface_only(global_edge_size: f64) -> Self {
        Self {
            global_edge_size,
            volume_mesh_flag: false,
            ..Self::default()
        }
    }

    /// Set the target edge length.
    #[must_use]
    pub const fn with_edge_size(mut self, size: f64) -> Self {
        self.global_edge_size = size;
        self
    }

    /// Enable or disable boundary triangle output.
    #[must_use]
    pub const fn with_surface_mesh(mut self, enabled: bool) -> Self {
        self.surface_mesh_flag = enabled;
        self
    }

    /// Enable or disable tetrahedra.
    #[must_use]
    pub const fn with_volume_mesh(mut self, enabled: bool) -> Self {
        self.volume_mesh_flag = enabled;
        self
    }

    /// Set the quality bound.
    #[must_use]
    pub const fn with_quality_ratio(mut self, ratio: Option<f64>) -> Self {
        self.quality_ratio = ratio;
        self
    }

    /// Set the interior point limit.
    #[must_use]
    pub const fn with_max_steiner_points(mut self, limit: Option<usize>) -> Self {
        self.max_steiner_points = limit;
        self
    }

    /// Check that the options describe a mesh that can be generated.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidOptions`] when the edge size is not
    /// finite and positive, when both output flags are unset, or when the
    /// quality ratio is below 1.
    pub fn validate(&self) -> GenerationResult<()> {
        let size = self.global_edge_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(GenerationError::InvalidOptions {
                reason: format!("global edge size {size} must be finite and > 0"),
            });
        }
        if !self.surface_mesh_flag && !self.volume_mesh_flag {
            return Err(GenerationError::InvalidOptions {
                reason: "neither surface nor volume output requested".to_string(),
            });
        }
        if let Some(ratio) = self.quality_ratio {
            if !ratio.is_finite() || ratio < 1.0 {
                return Err(GenerationError::InvalidOptions {
                    reason: format!("quality ratio {ratio} must be finite and >= 1"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = TetGenOptions::default();
        assert!(options.surface_mesh_flag);
        assert!(options.volume_mesh_flag);
        assert!(options.validate().is_ok());
        assert_eq!(MeshingStrategy::default(), MeshingStrategy::Delaunay);
    }

    #[test]
    fn rejects_bad_edge_sizes() {
        for size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = TetGenOptions::new(size).validate().unwrap_err();
            assert!(matches!(err, GenerationError::InvalidOptions { .. }));
        }
    }

    #[test]
    fn needs_some_output() {
        let options = TetGenOptions::new(0.5)
            .with_surface_mesh(false)
            .with_volume_mesh(false);
        assert!(options.validate().is_err());
        assert!(options.with_surface_mesh(true).validate().is_ok());
    }

    #[test]
    fn quality_ratio_bounds() {
        let options = TetGenOptions::new(0.5).with_quality_ratio(Some(0.5));
        assert!(options.validate().is_err());
        let options = options.with_quality_ratio(None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn strategy_names() {
        assert_eq!(MeshingStrategy::Delaunay.to_string(), "delaunay");
        assert_eq!(
            MeshingStrategy::AdvancingFront.to_string(),
            "advancing-front"
        );
    }
}
