//! Surface validation and health reporting.
//!
//! [`validate_mesh`] counts every problem without failing;
//! [`check_mesh`] runs the same checks in a fixed order and turns the first
//! problem into a [`ValidationError`].

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, MeshTopology, triangle_key};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::{MeshAdjacency, inconsistent_edges};
use crate::error::{ValidationError, ValidationResult};
use crate::intersect::find_self_intersections;

/// Report of surface validation results.
#[derive(Debug, Clone, Default)]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Total number of edges.
    pub edge_count: usize,

    /// Faces referencing missing vertices. When non-zero, geometric checks
    /// are skipped.
    pub invalid_index_count: usize,
    /// Number of boundary edges (edges with only one adjacent face).
    pub boundary_edge_count: usize,
    /// Number of non-manifold edges (edges with more than two adjacent faces).
    pub non_manifold_edge_count: usize,
    /// Number of vertices whose faces form more than one fan.
    pub non_manifold_vertex_count: usize,
    /// Number of degenerate faces (zero or near-zero area).
    pub degenerate_face_count: usize,
    /// Number of duplicate faces.
    pub duplicate_face_count: usize,
    /// Number of directed edges walked twice in the same direction.
    pub inconsistent_edge_count: usize,
    /// Number of intersecting face pairs found (capped by
    /// [`ValidationOptions::max_intersections`]).
    pub self_intersection_count: usize,

    /// Signed enclosed volume.
    pub signed_volume: f64,
    /// Whether the surface is closed (no boundary edges).
    pub is_watertight: bool,
    /// Whether every edge has at most two faces.
    pub is_manifold: bool,
    /// Whether the signed volume is negative.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Check if the surface can be handed to the volume mesher.
    ///
    /// A valid surface is non-empty, closed, manifold, consistently wound,
    /// free of degenerate, duplicate and intersecting faces, and encloses a
    /// non-zero volume. Orientation is not required; import fixes it.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.face_count > 0
            && !self.has_issues()
            && self.is_watertight
            && self.is_manifold
            && self.signed_volume != 0.0
    }

    /// Check if the surface has any issues.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Get a count of total issues found.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.invalid_index_count
            + self.boundary_edge_count
            + self.non_manifold_edge_count
            + self.non_manifold_vertex_count
            + self.degenerate_face_count
            + self.duplicate_face_count
            + self.inconsistent_edge_count
            + self.self_intersection_count
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Volume: {:.6}", self.signed_volume)?;
        writeln!(f)?;
        writeln!(f, "  Status:")?;
        writeln!(f, "    Watertight: {}", yes_no(self.is_watertight))?;
        writeln!(f, "    Manifold: {}", yes_no(self.is_manifold))?;
        writeln!(
            f,
            "    Winding: {}",
            if self.is_inside_out {
                "Inside-out"
            } else {
                "Correct"
            }
        )?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            let issues = [
                ("Invalid indices", self.invalid_index_count),
                ("Boundary edges", self.boundary_edge_count),
                ("Non-manifold edges", self.non_manifold_edge_count),
                ("Non-manifold vertices", self.non_manifold_vertex_count),
                ("Degenerate faces", self.degenerate_face_count),
                ("Duplicate faces", self.duplicate_face_count),
                ("Inconsistent edges", self.inconsistent_edge_count),
                ("Self-intersections", self.self_intersection_count),
            ];
            for (label, count) in issues {
                if count > 0 {
                    writeln!(f, "    {label}: {count}")?;
                }
            }
        }

        Ok(())
    }
}

/// Options for surface validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationOptions {
    /// Area at or below which a face is considered degenerate.
    pub degenerate_area_threshold: f64,
    /// Whether to run the self-intersection scan.
    pub check_self_intersections: bool,
    /// Maximum number of intersecting pairs to collect.
    pub max_intersections: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            degenerate_area_threshold: 1e-12,
            check_self_intersections: true,
            max_intersections: 64,
        }
    }
}

impl ValidationOptions {
    /// Options that skip the self-intersection scan.
    #[must_use]
    pub fn topology_only() -> Self {
        Self {
            check_self_intersections: false,
            ..Self::default()
        }
    }

    /// Set the degenerate area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Enable or disable the self-intersection scan.
    #[must_use]
    pub const fn with_self_intersections(mut self, check: bool) -> Self {
        self.check_self_intersections = check;
        self
    }
}

/// Validate a surface and return a report of any issues.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_validate::validate_mesh;
///
/// let report = validate_mesh(&unit_cube());
/// assert!(report.is_valid());
/// assert_eq!(report.edge_count, 18);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    validate_mesh_with_options(mesh, &ValidationOptions::default())
}

/// Validate a surface with custom options.
#[must_use]
pub fn validate_mesh_with_options(mesh: &IndexedMesh, options: &ValidationOptions) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut report = MeshReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        edge_count: adjacency.edge_count(),
        invalid_index_count: invalid_faces(mesh).len(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        duplicate_face_count: duplicate_faces(&mesh.faces).len(),
        inconsistent_edge_count: inconsistent_edges(&mesh.faces).len(),
        is_watertight: adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        ..MeshReport::default()
    };
    if report.invalid_index_count > 0 {
        return report;
    }

    report.non_manifold_vertex_count = adjacency.non_manifold_vertices(&mesh.faces).len();
    report.degenerate_face_count =
        degenerate_faces(mesh, options.degenerate_area_threshold).len();
    if options.check_self_intersections {
        report.self_intersection_count =
            find_self_intersections(mesh, options.max_intersections).len();
    }
    report.signed_volume = mesh.signed_volume();
    report.is_inside_out = report.signed_volume < 0.0;
    report
}

/// Run every check and fail on the first problem.
///
/// Checks run in this order: emptiness, indices, degenerate triangles,
/// duplicates, non-manifold edges, open boundaries, non-manifold vertices,
/// winding, self-intersections, enclosed volume. Orientation is not
/// checked.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first failing check.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_validate::{ValidationError, ValidationOptions, check_mesh};
///
/// let mut open = unit_cube();
/// open.faces.pop();
/// let err = check_mesh(&open, &ValidationOptions::default()).unwrap_err();
/// assert!(matches!(err, ValidationError::OpenBoundary { .. }));
/// ```
pub fn check_mesh(mesh: &IndexedMesh, options: &ValidationOptions) -> ValidationResult<()> {
    if mesh.vertices.is_empty() || mesh.faces.is_empty() {
        return Err(ValidationError::EmptyMesh);
    }
    if let Some(&(face, index)) = invalid_faces(mesh).first() {
        return Err(ValidationError::InvalidIndex {
            face,
            index,
            vertex_count: mesh.vertices.len(),
        });
    }
    if let Some(&face) = degenerate_faces(mesh, options.degenerate_area_threshold).first() {
        return Err(ValidationError::DegenerateTriangle { face });
    }
    if let Some(&(first, second)) = duplicate_faces(&mesh.faces).first() {
        return Err(ValidationError::DuplicateTriangle { first, second });
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    if let Some(&(v0, v1)) = adjacency.non_manifold_edges().first() {
        let faces = adjacency.faces_for_edge(v0, v1).map_or(0, <[usize]>::len);
        return Err(ValidationError::NonManifoldEdge { v0, v1, faces });
    }
    if let Some(&(v0, v1)) = adjacency.boundary_edges().first() {
        return Err(ValidationError::OpenBoundary { v0, v1 });
    }
    if let Some(&vertex) = adjacency.non_manifold_vertices(&mesh.faces).first() {
        return Err(ValidationError::NonManifoldVertex { vertex });
    }
    if let Some(&(v0, v1)) = inconsistent_edges(&mesh.faces).first() {
        return Err(ValidationError::InconsistentWinding { v0, v1 });
    }
    if options.check_self_intersections {
        if let Some(&(first, second)) = find_self_intersections(mesh, 1).first() {
            return Err(ValidationError::SelfIntersection { first, second });
        }
    }

    let volume = mesh.signed_volume();
    let scale = mesh.surface_area().powf(1.5);
    if volume.abs() <= scale * 1e-12 {
        return Err(ValidationError::ZeroVolume { volume });
    }
    Ok(())
}

/// `(face, bad index)` for every face referencing a missing vertex.
fn invalid_faces(mesh: &IndexedMesh) -> Vec<(usize, u32)> {
    let n = mesh.vertices.len();
    mesh.faces
        .iter()
        .enumerate()
        .filter_map(|(fi, face)| face.iter().find(|&&v| v as usize >= n).map(|&v| (fi, v)))
        .collect()
}

/// Faces with area at or below the threshold, or repeating a vertex.
fn degenerate_faces(mesh: &IndexedMesh, area_threshold: f64) -> Vec<usize> {
    (0..mesh.faces.len())
        .filter(|&fi| {
            let [a, b, c] = mesh.faces[fi];
            a == b
                || b == c
                || a == c
                || mesh
                    .triangle(fi)
                    .is_none_or(|t| t.is_degenerate(area_threshold))
        })
        .collect()
}

/// `(first, duplicate)` pairs of faces with the same vertex set, in either
/// winding.
fn duplicate_faces(faces: &[[u32; 3]]) -> Vec<(usize, usize)> {
    let mut seen: HashMap<[u32; 3], usize> = HashMap::with_capacity(faces.len());
    let mut duplicates = Vec::new();
    for (fi, &face) in faces.iter().enumerate() {
        match seen.entry(triangle_key(face)) {
            hashbrown::hash_map::Entry::Occupied(first) => duplicates.push((*first.get(), fi)),
            hashbrown::hash_map::Entry::Vacant(slot) => {
                slot.insert(fi);
            }
        }
    }
    duplicates
}
