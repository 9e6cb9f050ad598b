//! Constrained Delaunay refinement.
//!
//! A seed tetrahedralization of the surface (a cone from a kernel point, or
//! the advancing front for surfaces that are not star-shaped) is refined by
//! Bowyer-Watson insertion of a jittered body-centered cubic lattice at the
//! target edge size, followed by circumcenter insertion for tetrahedra
//! whose radius-edge ratio exceeds the quality bound. The advancing front
//! strategy runs its own output through the same refinement.

use mesh_types::{IndexedMesh, MeshBounds};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info};

use crate::complex::{TetComplex, VolumeOutput};
use crate::error::{GenerationError, GenerationResult};
use crate::front;
use crate::kernel::{cone, find_kernel_point};
use crate::options::TetGenOptions;
use crate::quality::{circumsphere, radius_edge_ratio};
use crate::spatial::{PointGrid, SurfaceIndex};

/// Interior points keep at least this many edge sizes from the surface.
const BOUNDARY_CLEARANCE: f64 = 0.5;

/// Interior points keep at least this many edge sizes from each other.
const POINT_CLEARANCE: f64 = 0.5;

/// Lattice jitter, as a fraction of the lattice spacing.
const JITTER: f64 = 0.02;

/// Rounds of circumcenter insertion.
const QUALITY_PASSES: usize = 3;

/// Fill the surface with tetrahedra of about `options.global_edge_size`.
pub(crate) fn tetrahedralize(
    surface: &IndexedMesh,
    options: &TetGenOptions,
) -> GenerationResult<VolumeOutput> {
    let seed = seed(surface, options)?;
    refine_to_size(surface, seed, options)
}

/// Bring a conforming tetrahedralization of `surface` down to the target
/// edge size: interior lattice points first, then circumcenters of badly
/// shaped tetrahedra.
///
/// Lattice points closer than half an edge size to an existing interior
/// point are skipped, so regions the seed already resolves stay as they are.
pub(crate) fn refine_to_size(
    surface: &IndexedMesh,
    seed: VolumeOutput,
    options: &TetGenOptions,
) -> GenerationResult<VolumeOutput> {
    let size = options.global_edge_size;
    let mut steiner = seed.steiner_points;
    let mut complex = TetComplex::new(seed.points, seed.tetrahedra);
    debug!(
        tets = complex.live_count(),
        steiner, "seed tetrahedralization"
    );

    let index = SurfaceIndex::new(surface, size);
    let surface_vertices = surface.vertices.len();
    let mut grid = PointGrid::new(size);
    for (i, p) in complex.points.iter().enumerate().skip(surface_vertices) {
        grid.insert(u32::try_from(i).unwrap_or(u32::MAX), p);
    }

    let is_interior = |v: u32| v as usize >= surface_vertices;
    let mut candidates = Vec::new();
    for p in lattice(surface, size) {
        if index.admits(&p, BOUNDARY_CLEARANCE * size)
            && !grid.any_within(&p, POINT_CLEARANCE * size, &complex.points, is_interior)
        {
            candidates.push(p);
        }
    }
    if let Some(limit) = options.max_steiner_points {
        let required = steiner + candidates.len();
        if required > limit {
            return Err(GenerationError::SteinerLimit { limit, required });
        }
    }

    let mut skipped = 0usize;
    for p in candidates {
        match complex.locate(&p).and_then(|t| complex.insert(p, t)) {
            Some(v) => {
                grid.insert(v, &p);
                steiner += 1;
            }
            None => skipped += 1,
        }
    }
    debug!(
        inserted = steiner - seed.steiner_points,
        skipped,
        tets = complex.live_count(),
        "lattice insertion"
    );

    if let Some(bound) = options.quality_ratio {
        let budget = options
            .max_steiner_points
            .map_or(usize::MAX, |limit| limit.saturating_sub(steiner));
        steiner += improve_quality(
            &mut complex,
            &index,
            &mut grid,
            surface_vertices,
            size,
            bound,
            budget,
        );
    }

    let (points, tetrahedra) = complex.into_parts();
    info!(
        tets = tetrahedra.len(),
        steiner, "size refinement finished"
    );
    Ok(VolumeOutput {
        points,
        tetrahedra,
        steiner_points: steiner,
    })
}

/// Cone from a kernel point when there is one, the advancing front
/// otherwise.
fn seed(surface: &IndexedMesh, options: &TetGenOptions) -> GenerationResult<VolumeOutput> {
    let mut points = surface.positions();
    if let Some(k) = find_kernel_point(&points, &surface.faces) {
        let apex = u32::try_from(points.len()).map_err(|_| GenerationError::InvalidOptions {
            reason: "too many surface vertices".to_string(),
        })?;
        points.push(k);
        return Ok(VolumeOutput {
            points,
            tetrahedra: cone(&surface.faces, apex),
            steiner_points: 1,
        });
    }
    debug!("surface is not star-shaped, seeding with the advancing front");
    front::advance(surface, options)
}

/// Insert circumcenters of tetrahedra above the radius-edge bound.
///
/// Circumcenters too close to the surface or to other interior points are
/// left out, so refinement stops at about the target size.
fn improve_quality(
    complex: &mut TetComplex,
    index: &SurfaceIndex,
    grid: &mut PointGrid,
    surface_vertices: usize,
    size: f64,
    bound: f64,
    mut budget: usize,
) -> usize {
    let is_interior = |v: u32| v as usize >= surface_vertices;
    let mut added = 0;

    for pass in 0..QUALITY_PASSES {
        let mut bad: Vec<(f64, usize, Point3<f64>)> = complex
            .live_tets()
            .filter_map(|(t, _)| {
                let [a, b, c, d] = complex.corners(t);
                let ratio = radius_edge_ratio(&a, &b, &c, &d);
                if ratio <= bound {
                    return None;
                }
                let (center, radius) = circumsphere(&a, &b, &c, &d)?;
                (radius >= POINT_CLEARANCE * size).then_some((ratio, t, center))
            })
            .collect();
        bad.sort_by(|x, y| y.0.total_cmp(&x.0).then(x.1.cmp(&y.1)));

        let mut inserted = 0;
        for (_, t, center) in bad {
            if budget == 0 {
                debug!("steiner budget exhausted during quality refinement");
                return added;
            }
            if !complex.is_alive(t)
                || !index.admits(&center, BOUNDARY_CLEARANCE * size)
                || grid.any_within(&center, POINT_CLEARANCE * size, &complex.points, is_interior)
            {
                continue;
            }
            if let Some(v) = complex.locate(&center).and_then(|s| complex.insert(center, s)) {
                grid.insert(v, &center);
                inserted += 1;
                budget -= 1;
            }
        }
        debug!("Quality pass {}: {} circumcenters", pass + 1, inserted);
        added += inserted;
        if inserted == 0 {
            break;
        }
    }
    added
}

/// Body-centered cubic lattice over the surface bounds, with a small
/// deterministic jitter against cospherical configurations.
fn lattice(surface: &IndexedMesh, spacing: f64) -> Vec<Point3<f64>> {
    let bounds = surface.bounds();
    let counts = (bounds.max - bounds.min).map(|extent| cell_count(extent, spacing));
    let mut rng = SplitMix(0x5EED_1A77_1CE5);
    let mut points = Vec::new();
    for i in 0..=counts.x {
        for j in 0..=counts.y {
            for k in 0..=counts.z {
                let corner = Vector3::new(f64::from(i), f64::from(j), f64::from(k));
                for centered in [false, true] {
                    let offset = if centered { 0.5 } else { 0.0 };
                    let jitter =
                        Vector3::new(rng.unit(), rng.unit(), rng.unit()) * (JITTER * spacing);
                    let p = bounds.min + (corner + Vector3::repeat(offset)) * spacing + jitter;
                    if !centered || (i < counts.x && j < counts.y && k < counts.z) {
                        points.push(p);
                    }
                }
            }
        }
    }
    points
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Truncation: lattice extents are bounded by the Steiner point check downstream
fn cell_count(extent: f64, spacing: f64) -> u32 {
    (extent / spacing).ceil().clamp(0.0, f64::from(u32::MAX / 2)) as u32
}

/// Small deterministic generator for the lattice jitter.
struct SplitMix(u64);

impl SplitMix {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[-1, 1)`.
    #[allow(clippy::cast_precision_loss)]
    fn unit(&mut self) -> f64 {
        ((self.next() >> 11) as f64 / (1u64 << 53) as f64).mul_add(2.0, -1.0)
    }
}
