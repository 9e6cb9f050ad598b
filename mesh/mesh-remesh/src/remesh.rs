//! Core isotropic remeshing algorithm.

use mesh_types::{IndexedMesh, MeshBounds};
use mesh_validate::MeshAdjacency;
use tracing::{debug, info};

use crate::error::{SizingError, SizingResult};
use crate::params::RemeshParams;
use crate::project::Reference;
use crate::result::{EdgeStatistics, RemeshOutput, RemeshStats};
use crate::surface::{Surface, VertexKind};

/// Upper bound on split passes per iteration; each pass halves the
/// longest edges.
const MAX_SPLIT_PASSES: usize = 16;

/// Remesh a closed surface towards edge lengths in `[hmin, hmax]`.
///
/// Each iteration performs:
/// - Split edges longer than [`RemeshParams::split_length`]
/// - Collapse edges shorter than [`RemeshParams::collapse_length`]
/// - Flip edges to equalize valences
/// - Smooth vertices tangentially and project them back onto the input
///
/// Edges sharper than the feature angle are kept: they are never flipped,
/// and their vertices only slide along them. Corners stay in place. The
/// output is closed and manifold, but triangle face IDs are gone; classify
/// it again.
///
/// # Errors
///
/// - Parameter errors from [`RemeshParams::validate`]
/// - [`SizingError::EmptyMesh`] / [`SizingError::InvalidIndex`] for bad input
/// - [`SizingError::NonManifold`] for an open or non-manifold surface
/// - [`SizingError::TooCoarse`] when the target length exceeds half the
///   smallest bounding box extent
///
/// # Examples
///
/// ```
/// use mesh_types::cylinder;
/// use mesh_remesh::{remesh, RemeshParams};
///
/// let surface = cylinder(1.0, 5.0, 32, 10);
/// let params = RemeshParams::new(0.3, 0.5).with_iterations(5);
/// let result = remesh(&surface, &params)?;
///
/// assert!(result.stats.was_remeshed());
/// # Ok::<(), mesh_remesh::SizingError>(())
/// ```
pub fn remesh(mesh: &IndexedMesh, params: &RemeshParams) -> SizingResult<RemeshOutput> {
    params.validate()?;
    check_surface(mesh)?;

    let target = params.target_length();
    let extent = mesh.bounds().min_extent();
    if target > 0.5 * extent {
        return Err(SizingError::TooCoarse { target, extent });
    }

    let cos_feature = params.feature_angle_deg.to_radians().cos();
    let mut surface = Surface::from_mesh(mesh);
    let feature_edges = surface.mark_features(cos_feature);
    let reference = Reference::new(
        mesh,
        &surface.feature_edges(),
        2.0 * target,
        2.0 * target,
        cos_feature,
    );

    let mut stats = RemeshStats {
        original_faces: mesh.faces.len(),
        original_vertices: mesh.vertices.len(),
        feature_edges,
        original_edges: EdgeStatistics::from_mesh(mesh),
        ..RemeshStats::default()
    };

    info!(
        faces = stats.original_faces,
        features = feature_edges,
        hmin = params.min_edge_length,
        hmax = params.max_edge_length,
        "remeshing surface"
    );

    let split_length = params.split_length();
    let collapse_length = params.collapse_length();

    for iter in 0..params.iterations {
        let splits = split_long_edges(&mut surface, split_length);
        let collapses = collapse_short_edges(&mut surface, collapse_length, split_length);
        let flips = equalize_valences(&mut surface, cos_feature);
        smooth(&mut surface, &reference, params.smoothing_weight);

        stats.splits += splits;
        stats.collapses += collapses;
        stats.flips += flips;
        stats.iterations = iter + 1;

        debug!(
            "Iteration {}: {} splits, {} collapses, {} flips, {} faces",
            iter + 1,
            splits,
            collapses,
            flips,
            surface.face_count()
        );

        if splits == 0 && collapses == 0 && flips == 0 {
            debug!("Converged at iteration {}", iter + 1);
            break;
        }
    }

    let result = surface.to_mesh();
    stats.final_faces = result.faces.len();
    stats.final_vertices = result.vertices.len();
    stats.final_edges = EdgeStatistics::from_mesh(&result);
    info!("{stats}");

    Ok(RemeshOutput {
        mesh: result,
        stats,
    })
}

fn check_surface(mesh: &IndexedMesh) -> SizingResult<()> {
    if mesh.vertices.is_empty() || mesh.faces.is_empty() {
        return Err(SizingError::EmptyMesh);
    }
    let vertex_count = mesh.vertices.len();
    for (face, f) in mesh.faces.iter().enumerate() {
        if let Some(&index) = f.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(SizingError::InvalidIndex { face, index });
        }
    }
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let open = adjacency.boundary_edge_count();
    let non_manifold = adjacency.non_manifold_edge_count();
    if open > 0 || non_manifold > 0 {
        return Err(SizingError::NonManifold { open, non_manifold });
    }
    Ok(())
}

/// Edges of the surface with their squared lengths, filtered and ordered.
fn edges_by_length(
    surface: &Surface,
    keep: impl Fn(f64) -> bool,
    longest_first: bool,
) -> Vec<(u32, u32)> {
    let mut edges: Vec<(f64, (u32, u32))> = surface
        .edges()
        .into_iter()
        .map(|(a, b)| (surface.length_sq(a, b), (a, b)))
        .filter(|&(len_sq, _)| keep(len_sq))
        .collect();
    edges.sort_by(|x, y| {
        let order = x.0.total_cmp(&y.0).then(x.1.cmp(&y.1));
        if longest_first { order.reverse() } else { order }
    });
    edges.into_iter().map(|(_, edge)| edge).collect()
}

/// Split edges longer than `max_length`, repeating until none remain.
fn split_long_edges(surface: &mut Surface, max_length: f64) -> usize {
    let max_sq = max_length * max_length;
    let mut splits = 0;
    for _ in 0..MAX_SPLIT_PASSES {
        let edges = edges_by_length(surface, |l| l > max_sq, true);
        if edges.is_empty() {
            break;
        }
        for (a, b) in edges {
            if surface.length_sq(a, b) > max_sq && surface.split_edge(a, b) {
                splits += 1;
            }
        }
    }
    splits
}

/// Collapse edges shorter than `min_length`, shortest first, unless the
/// collapse would create an edge longer than `max_length`.
fn collapse_short_edges(surface: &mut Surface, min_length: f64, max_length: f64) -> usize {
    let min_sq = min_length * min_length;
    let mut collapses = 0;
    for (a, b) in edges_by_length(surface, |l| l < min_sq, false) {
        // Earlier collapses may have removed or stretched this edge.
        if surface.edge_faces(a, b).len() != 2 || surface.length_sq(a, b) >= min_sq {
            continue;
        }
        let Some((keep, remove, to)) = surface.collapse_target(a, b) else {
            continue;
        };
        if surface.can_collapse(keep, remove, &to, max_length) {
            surface.collapse_edge(keep, remove, to);
            collapses += 1;
        }
    }
    collapses
}

fn equalize_valences(surface: &mut Surface, cos_feature: f64) -> usize {
    surface
        .edges()
        .into_iter()
        .filter(|&(a, b)| surface.try_flip(a, b, cos_feature))
        .count()
}

/// Tangential relaxation with back-projection.
///
/// Vertices are updated in place, one at a time, so each move is checked
/// against the current neighborhood.
fn smooth(surface: &mut Surface, reference: &Reference, weight: f64) {
    for v in surface.live_vertices() {
        let p = surface.positions[v as usize];
        let target = match surface.kind(v) {
            VertexKind::Corner => continue,
            VertexKind::Feature => {
                let Some(goal) = surface.feature_midpoint(v) else {
                    continue;
                };
                let moved = p + (goal - p) * weight;
                reference.project_to_features(&moved).unwrap_or(moved)
            }
            VertexKind::Smooth => {
                let (Some(normal), Some(centroid)) =
                    (surface.vertex_normal(v), surface.neighbor_centroid(v))
                else {
                    continue;
                };
                let d = centroid - p;
                let moved = p + (d - normal * normal.dot(&d)) * weight;
                reference.project(&moved, &normal).unwrap_or(moved)
            }
        };
        if surface.can_move(v, &target) {
            surface.positions[v as usize] = target;
        }
    }
}
