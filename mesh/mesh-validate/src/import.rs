//! Turning raw triangles into a meshable surface.

use mesh_types::IndexedMesh;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::validate::{ValidationOptions, check_mesh};
use crate::weld::{remove_unreferenced_vertices, weld_vertices};

/// Configuration for [`import_surface`].
///
/// # Example
///
/// ```
/// use mesh_validate::ImportParams;
///
/// let params = ImportParams::default()
///     .with_weld_epsilon(1e-4)
///     .with_self_intersection_check(false);
/// assert!(!params.validation.check_self_intersections);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImportParams {
    /// Distance below which vertices are merged.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Checks run after welding.
    pub validation: ValidationOptions,

    /// Flip every face when the surface encloses negative volume.
    ///
    /// Default: `true`
    pub orient_outward: bool,
}

impl Default for ImportParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            validation: ValidationOptions::default(),
            orient_outward: true,
        }
    }
}

impl ImportParams {
    /// Params for surfaces already known to be welded and clean.
    ///
    /// Skips welding and the self-intersection scan.
    #[must_use]
    pub fn trusted() -> Self {
        Self {
            weld_epsilon: 0.0,
            validation: ValidationOptions::topology_only(),
            orient_outward: true,
        }
    }

    /// Set the vertex welding distance.
    #[must_use]
    pub const fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Enable or disable the self-intersection scan.
    #[must_use]
    pub const fn with_self_intersection_check(mut self, check: bool) -> Self {
        self.validation.check_self_intersections = check;
        self
    }

    /// Set whether inside-out surfaces are flipped.
    #[must_use]
    pub const fn with_orient_outward(mut self, orient: bool) -> Self {
        self.orient_outward = orient;
        self
    }
}

/// Build a closed, manifold, outward-facing surface from raw triangles.
///
/// Steps: reject empty input and bad indices, weld coincident vertices,
/// drop unreferenced vertices, run [`check_mesh`], and flip the winding if
/// the enclosed volume is negative. The input is not modified.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first failing check.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
/// use mesh_validate::{import_surface, ImportParams};
///
/// let mut inside_out = unit_cube();
/// inside_out.flip_normals();
///
/// let surface = import_surface(&inside_out, &ImportParams::default()).unwrap();
/// assert!(surface.signed_volume() > 0.0);
/// assert_eq!(surface.face_count(), 12);
/// ```
pub fn import_surface(mesh: &IndexedMesh, params: &ImportParams) -> ValidationResult<IndexedMesh> {
    if mesh.vertices.is_empty() || mesh.faces.is_empty() {
        return Err(ValidationError::EmptyMesh);
    }
    let vertex_count = mesh.vertices.len();
    for (face, f) in mesh.faces.iter().enumerate() {
        if let Some(&index) = f.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(ValidationError::InvalidIndex {
                face,
                index,
                vertex_count,
            });
        }
    }

    let mut surface = mesh.clone();
    let input_faces = surface.faces.len();
    let welded = weld_vertices(&mut surface, params.weld_epsilon);
    let collapsed = input_faces - surface.faces.len();
    if collapsed > 0 {
        warn!(collapsed, "welding collapsed faces");
    }
    let unreferenced = remove_unreferenced_vertices(&mut surface);
    debug!(welded, unreferenced, "welded surface");

    check_mesh(&surface, &params.validation)?;

    let flipped = params.orient_outward && surface.is_inside_out();
    if flipped {
        surface.flip_normals();
    }

    info!(
        vertices = surface.vertices.len(),
        faces = surface.faces.len(),
        flipped,
        "surface imported"
    );
    Ok(surface)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, cylinder, unit_cube};

    fn soup(mesh: &IndexedMesh) -> IndexedMesh {
        let mut out = IndexedMesh::new();
        for face in &mesh.faces {
            let base = out.vertices.len() as u32;
            out.vertices
                .extend(face.iter().map(|&v| mesh.vertices[v as usize]));
            out.faces.push([base, base + 1, base + 2]);
        }
        out
    }

    #[test]
    fn soup_is_welded_and_validated() {
        let raw = soup(&cylinder(1.0, 5.0, 24, 6));
        let surface = import_surface(&raw, &ImportParams::default()).unwrap();

        assert_eq!(surface.vertex_count(), 24 * 7 + 2);
        assert_eq!(surface.face_count(), raw.face_count());
        assert!(surface.signed_volume() > 0.0);
    }

    #[test]
    fn inside_out_is_flipped_unless_disabled() {
        let mut cube = unit_cube();
        cube.flip_normals();

        let fixed = import_surface(&cube, &ImportParams::default()).unwrap();
        assert!((fixed.signed_volume() - 1.0).abs() < 1e-12);

        let kept = import_surface(&cube, &ImportParams::trusted().with_orient_outward(false)).unwrap();
        assert!(kept.is_inside_out());
    }

    #[test]
    fn unwelded_soup_fails_without_welding() {
        let raw = soup(&unit_cube());
        let err = import_surface(&raw, &ImportParams::trusted()).unwrap_err();
        assert!(matches!(err, ValidationError::OpenBoundary { .. }));
    }

    #[test]
    fn rejects_empty_and_bad_indices() {
        assert_eq!(
            import_surface(&IndexedMesh::new(), &ImportParams::default()),
            Err(ValidationError::EmptyMesh)
        );
        let mut cube = unit_cube();
        cube.faces[0][2] = 100;
        assert!(matches!(
            import_surface(&cube, &ImportParams::default()),
            Err(ValidationError::InvalidIndex { face: 0, index: 100, .. })
        ));
    }

    #[test]
    fn input_is_not_modified() {
        let raw = soup(&unit_cube());
        let before = raw.clone();
        let _ = import_surface(&raw, &ImportParams::default()).unwrap();
        assert_eq!(raw, before);
    }
}
