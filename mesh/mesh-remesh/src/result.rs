//! Result types for remeshing operations.

// Face/edge counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use mesh_types::IndexedMesh;

use crate::params::RemeshParams;

/// Statistics about edge lengths in a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeStatistics {
    /// Minimum edge length.
    pub min_length: f64,
    /// Maximum edge length.
    pub max_length: f64,
    /// Mean edge length.
    pub mean_length: f64,
    /// Standard deviation of edge lengths.
    pub std_dev: f64,
    /// Total number of unique edges.
    pub edge_count: usize,
    lengths: Vec<f64>,
}

impl EdgeStatistics {
    /// Measure every unique edge of a mesh.
    ///
    /// ```
    /// use mesh_types::unit_cube;
    /// use mesh_remesh::EdgeStatistics;
    ///
    /// let stats = EdgeStatistics::from_mesh(&unit_cube());
    /// assert_eq!(stats.edge_count, 18);
    /// assert!((stats.min_length - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_mesh(mesh: &IndexedMesh) -> Self {
        let mut lengths = mesh.edge_lengths();
        if lengths.is_empty() {
            return Self::default();
        }
        lengths.sort_by(f64::total_cmp);

        let n = lengths.len() as f64;
        let mean_length = lengths.iter().sum::<f64>() / n;
        let variance = lengths
            .iter()
            .map(|&l| (l - mean_length).powi(2))
            .sum::<f64>()
            / n;

        Self {
            min_length: lengths[0],
            max_length: lengths[lengths.len() - 1],
            mean_length,
            std_dev: variance.sqrt(),
            edge_count: lengths.len(),
            lengths,
        }
    }

    /// Fraction of edges with length in `[lo, hi]`. `0.0` without edges.
    #[must_use]
    pub fn fraction_within(&self, lo: f64, hi: f64) -> f64 {
        if self.lengths.is_empty() {
            return 0.0;
        }
        let start = self.lengths.partition_point(|&l| l < lo);
        let end = self.lengths.partition_point(|&l| l <= hi);
        end.saturating_sub(start) as f64 / self.lengths.len() as f64
    }

    /// Fraction of edges within `[hmin, hmax]` widened by the relative
    /// `length_tolerance` of `params`.
    #[must_use]
    pub fn fraction_within_bounds(&self, params: &RemeshParams) -> f64 {
        let tol = params.length_tolerance.max(0.0);
        self.fraction_within(
            params.min_edge_length * (1.0 - tol),
            params.max_edge_length * (1.0 + tol),
        )
    }

    /// Coefficient of variation (`std_dev / mean`).
    #[must_use]
    pub fn variation(&self) -> f64 {
        if self.mean_length > 0.0 {
            self.std_dev / self.mean_length
        } else {
            0.0
        }
    }
}

/// Counts gathered while remeshing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemeshStats {
    /// Number of faces in original mesh.
    pub original_faces: usize,
    /// Number of faces in remeshed mesh.
    pub final_faces: usize,
    /// Number of vertices in original mesh.
    pub original_vertices: usize,
    /// Number of vertices in remeshed mesh.
    pub final_vertices: usize,
    /// Number of iterations performed.
    pub iterations: u32,
    /// Number of edge splits performed.
    pub splits: usize,
    /// Number of edge collapses performed.
    pub collapses: usize,
    /// Number of edge flips performed.
    pub flips: usize,
    /// Number of feature edges found in the input.
    pub feature_edges: usize,
    /// Edge statistics for the original mesh.
    pub original_edges: EdgeStatistics,
    /// Edge statistics for the remeshed mesh.
    pub final_edges: EdgeStatistics,
}

impl RemeshStats {
    /// Get the face count change ratio.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// Check if any remeshing operations were performed.
    #[must_use]
    pub const fn was_remeshed(&self) -> bool {
        self.splits > 0 || self.collapses > 0 || self.flips > 0
    }

    /// Get the total number of operations performed.
    #[must_use]
    pub const fn total_operations(&self) -> usize {
        self.splits + self.collapses + self.flips
    }
}

impl std::fmt::Display for RemeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Remesh: {} → {} faces ({:.1}x), {} splits, {} collapses, {} flips, \
             edges {:.3}..{:.3} (mean {:.3})",
            self.original_faces,
            self.final_faces,
            self.face_ratio(),
            self.splits,
            self.collapses,
            self.flips,
            self.final_edges.min_length,
            self.final_edges.max_length,
            self.final_edges.mean_length
        )
    }
}

/// Result of remeshing: the new surface and what it took to get there.
///
/// Face IDs do not survive remeshing; classify the new surface again.
#[derive(Debug, Clone)]
pub struct RemeshOutput {
    /// The remeshed surface.
    pub mesh: IndexedMesh,
    /// Operation counts and edge statistics.
    pub stats: RemeshStats,
}

impl std::fmt::Display for RemeshOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.stats.fmt(f)
    }
}
