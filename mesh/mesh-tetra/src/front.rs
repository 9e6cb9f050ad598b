//! Advancing front tetrahedralization.
//!
//! The front starts as the input surface. Each step takes the smallest
//! front triangle and builds a tetrahedron on its inner side, either with a
//! nearby front vertex or with a new point placed at the height of a
//! regular tetrahedron of the local size. The local size is the target edge
//! size, kept within a fixed ratio of the triangle's own size so that
//! coarse surfaces grade towards the target over a few layers. A candidate
//! is accepted only if the tetrahedron is positively oriented, reasonably
//! shaped, not much longer than the local size, contains no front vertex,
//! and its new faces cross no front triangle. Faces of the tetrahedron that
//! match a front triangle close it; the others join the front.
//!
//! When no candidate fits any remaining triangle, each leftover cavity is
//! closed by a star decomposition from a kernel point.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use mesh_types::predicates::{orient3d, point_strictly_in_tetrahedron, triangles_intersect};
use mesh_types::{
    Aabb, IndexedMesh, MeshBounds, Triangle, canonical_triangle, tet_faces, triangle_key,
};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::complex::VolumeOutput;
use crate::error::{GenerationError, GenerationResult};
use crate::kernel::{cone, find_kernel_point};
use crate::options::TetGenOptions;
use crate::quality::radius_ratio;
use crate::spatial::{Cell, PointGrid, cells_in, grid_cell_size};

/// Radius ratio below which a candidate tetrahedron is refused.
const MIN_QUALITY: f64 = 0.05;

/// Shape bound of the pass that closes leftover cavities.
const RELAXED_MIN_QUALITY: f64 = 1e-4;

/// Times a triangle is tried before it is left for the star closure.
const MAX_ATTEMPTS: u32 = 3;

/// Score factor of new points against existing vertices.
const NEW_POINT_WEIGHT: f64 = 0.7;

/// Local size bounds relative to the mean edge of the advanced triangle.
const MIN_GRADING: f64 = 0.55;
const MAX_GRADING: f64 = 2.0;

/// Longest new edge of a strict-pass tetrahedron, relative to the larger of
/// the local size and the triangle's mean edge.
const MAX_EDGE_RATIO: f64 = 4.0 / 3.0;

/// Heights tried for new points, relative to a regular tetrahedron.
const HEIGHT_FACTORS: [f64; 3] = [1.0, 0.7, 0.45];

/// New points keep this fraction of the local size from front vertices.
const POINT_CLEARANCE: f64 = 0.45;

/// New points keep this fraction of the local size from front triangles.
const FACE_CLEARANCE: f64 = 0.25;

/// Fill the surface by advancing a front inwards.
pub(crate) fn advance(
    surface: &IndexedMesh,
    options: &TetGenOptions,
) -> GenerationResult<VolumeOutput> {
    let size = options.global_edge_size;
    let cell = grid_cell_size(&surface.bounds(), size);
    let mut front = Front::new(surface.positions(), size, cell, options.max_steiner_points);
    for &face in &surface.faces {
        front.open(face, 0);
    }

    let budget = step_budget(surface, size);
    let failures = front.run(budget);
    debug!(
        tets = front.tets.len(),
        steiner = front.steiner,
        failures,
        open = front.faces.len(),
        "front advanced"
    );

    if !front.faces.is_empty() {
        // Small leftover cavities usually close with existing vertices
        // once the shape and length bounds are dropped.
        front.min_quality = RELAXED_MIN_QUALITY;
        front.max_edge_ratio = f64::INFINITY;
        front.requeue();
        let failures = front.run(budget);
        debug!(failures, open = front.faces.len(), "relaxed front pass");
    }

    if !front.faces.is_empty() {
        front.close_by_star()?;
    }
    info!(
        tets = front.tets.len(),
        steiner = front.steiner,
        "advancing front finished"
    );

    Ok(VolumeOutput {
        points: front.points,
        tetrahedra: front.tets,
        steiner_points: front.steiner,
    })
}

/// Target size for a front triangle with mean edge `mean_edge`.
fn local_size(size: f64, mean_edge: f64) -> f64 {
    size.clamp(MIN_GRADING * mean_edge, MAX_GRADING * mean_edge)
}

/// Upper bound on front steps: a generous multiple of the tetrahedra a
/// regular fill would need.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn step_budget(surface: &IndexedMesh, size: f64) -> usize {
    let regular = size.powi(3) / (6.0 * std::f64::consts::SQRT_2);
    let expected = (surface.volume() / regular).min(1e9) as usize;
    16 * (surface.faces.len() + expected) + 1024
}

#[derive(Debug, Clone, Copy)]
enum Candidate {
    Existing(u32),
    New(Point3<f64>),
}

struct Front {
    points: Vec<Point3<f64>>,
    /// Open triangles by sorted key, wound with the unmeshed side behind.
    faces: HashMap<[u32; 3], [u32; 3]>,
    /// Open triangles per vertex.
    uses: Vec<u32>,
    face_cells: HashMap<Cell, Vec<[u32; 3]>>,
    cell: f64,
    point_grid: PointGrid,
    queue: BinaryHeap<Reverse<(u32, u64, [u32; 3])>>,
    tets: Vec<[u32; 4]>,
    size: f64,
    min_quality: f64,
    max_edge_ratio: f64,
    steiner: usize,
    steiner_limit: Option<usize>,
}

impl Front {
    fn new(points: Vec<Point3<f64>>, size: f64, cell: f64, steiner_limit: Option<usize>) -> Self {
        let mut point_grid = PointGrid::new(cell);
        for (i, p) in points.iter().enumerate() {
            point_grid.insert(u32::try_from(i).unwrap_or(u32::MAX), p);
        }
        Self {
            uses: vec![0; points.len()],
            points,
            faces: HashMap::new(),
            face_cells: HashMap::new(),
            cell,
            point_grid,
            queue: BinaryHeap::new(),
            tets: Vec::new(),
            size,
            min_quality: MIN_QUALITY,
            max_edge_ratio: MAX_EDGE_RATIO,
            steiner: 0,
            steiner_limit,
        }
    }

    /// Advance until the queue is empty or `budget` steps are spent.
    /// Returns the number of failed steps.
    fn run(&mut self, budget: usize) -> usize {
        let mut steps = 0usize;
        let mut failures = 0usize;
        while let Some(Reverse((attempts, _, key))) = self.queue.pop() {
            let Some(&face) = self.faces.get(&key) else {
                continue;
            };
            steps += 1;
            if steps > budget {
                warn!(steps, "advancing front step budget exhausted");
                self.queue.clear();
                break;
            }
            if self.advance_face(face) {
                continue;
            }
            failures += 1;
            if attempts + 1 < MAX_ATTEMPTS {
                self.push(face, attempts + 1);
            }
        }
        failures
    }

    /// Queue every open triangle again with a fresh attempt count.
    fn requeue(&mut self) {
        self.queue.clear();
        let mut open: Vec<[u32; 3]> = self.faces.values().copied().collect();
        open.sort_unstable();
        for face in open {
            self.push(face, 0);
        }
    }

    fn point(&self, v: u32) -> Point3<f64> {
        self.points[v as usize]
    }

    fn face_bounds(&self, face: [u32; 3]) -> Aabb {
        Aabb::from_points(face.map(|v| self.point(v)).iter())
    }

    fn push(&mut self, face: [u32; 3], attempts: u32) {
        let [a, b, c] = face.map(|v| self.point(v));
        let area = (b - a).cross(&(c - a)).norm();
        // Non-negative floats order like their bit patterns.
        self.queue
            .push(Reverse((attempts, area.to_bits(), triangle_key(face))));
    }

    fn open(&mut self, face: [u32; 3], attempts: u32) {
        let key = triangle_key(face);
        self.faces.insert(key, face);
        for v in face {
            self.uses[v as usize] += 1;
        }
        for cell in cells_in(&self.face_bounds(face), self.cell) {
            self.face_cells.entry(cell).or_default().push(key);
        }
        self.push(face, attempts);
    }

    fn close(&mut self, key: [u32; 3]) {
        if let Some(face) = self.faces.remove(&key) {
            for v in face {
                self.uses[v as usize] -= 1;
            }
        }
    }

    /// Open triangles whose cells overlap `bounds`, first seen first.
    fn faces_near(&self, bounds: &Aabb) -> Vec<[u32; 3]> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for cell in cells_in(bounds, self.cell) {
            for &key in self.face_cells.get(&cell).into_iter().flatten() {
                if self.faces.contains_key(&key) && seen.insert(key) {
                    found.push(key);
                }
            }
        }
        found
    }

    fn may_add_point(&self) -> bool {
        self.steiner_limit.is_none_or(|limit| self.steiner < limit)
    }

    /// Build one tetrahedron on `face`. `false` when no candidate fits.
    fn advance_face(&mut self, face: [u32; 3]) -> bool {
        let [pa, pb, pc] = face.map(|v| self.point(v));
        let Some(normal) = (pb - pa).cross(&(pc - pa)).try_normalize(0.0) else {
            return false;
        };
        let mean_edge = ((pb - pa).norm() + (pc - pb).norm() + (pa - pc).norm()) / 3.0;
        let local = local_size(self.size, mean_edge);
        let centroid = Point3::from((pa.coords + pb.coords + pc.coords) / 3.0);
        let height = local * (2.0f64 / 3.0).sqrt();
        let max_edge = self.max_edge_ratio * local.max(mean_edge);

        let mut candidates: Vec<(f64, Candidate)> = Vec::new();
        let reach = 2.0 * local.max(mean_edge);
        for v in self.point_grid.near(&centroid, reach) {
            if self.uses[v as usize] == 0 || face.contains(&v) {
                continue;
            }
            let pv = self.point(v);
            if (pv - centroid).norm() > reach || orient3d(&pa, &pb, &pc, &pv) >= 0.0 {
                continue;
            }
            if [pa, pb, pc].iter().any(|p| (pv - p).norm() > max_edge) {
                continue;
            }
            let q = radius_ratio(&pa, &pb, &pc, &pv);
            if q >= self.min_quality {
                candidates.push((q, Candidate::Existing(v)));
            }
        }
        if self.may_add_point() {
            for factor in HEIGHT_FACTORS {
                let p = centroid - normal * (height * factor);
                let q = radius_ratio(&pa, &pb, &pc, &p);
                candidates.push((q * NEW_POINT_WEIGHT, Candidate::New(p)));
            }
        }
        candidates.sort_by(|x, y| y.0.total_cmp(&x.0));

        candidates
            .into_iter()
            .any(|(_, candidate)| self.try_build(face, candidate, local))
    }

    fn try_build(&mut self, face: [u32; 3], candidate: Candidate, local: f64) -> bool {
        let (apex, added) = match candidate {
            Candidate::Existing(v) => (v, false),
            Candidate::New(p) => {
                if !self.has_room(&p, local) {
                    return false;
                }
                let Ok(v) = u32::try_from(self.points.len()) else {
                    return false;
                };
                self.points.push(p);
                self.uses.push(0);
                (v, true)
            }
        };

        let Some((closing, opening)) = self.check_tet(face, apex) else {
            if added {
                self.points.pop();
                self.uses.pop();
            }
            return false;
        };

        let [a, b, c] = face;
        self.tets.push([a, c, b, apex]);
        if added {
            self.steiner += 1;
            let p = self.point(apex);
            self.point_grid.insert(apex, &p);
        }
        self.close(triangle_key(face));
        for key in closing {
            self.close(key);
        }
        for g in opening {
            self.open(g, 0);
        }
        true
    }

    /// Keep new points away from front vertices and triangles.
    fn has_room(&self, p: &Point3<f64>, local: f64) -> bool {
        let uses = &self.uses;
        if self
            .point_grid
            .any_within(p, POINT_CLEARANCE * local, &self.points, |v| {
                uses[v as usize] > 0
            })
        {
            return false;
        }
        let clearance = FACE_CLEARANCE * local;
        let bounds = Aabb::new(p - Vector3::repeat(clearance), p + Vector3::repeat(clearance));
        self.faces_near(&bounds).into_iter().all(|key| {
            let [a, b, c] = self.faces[&key].map(|v| self.point(v));
            Triangle::new(a, b, c).distance_to(p) >= clearance
        })
    }

    /// Faces the tetrahedron `[a, c, b, apex]` closes and opens, or `None`
    /// when it would overlap meshed space.
    fn check_tet(&self, face: [u32; 3], apex: u32) -> Option<(Vec<[u32; 3]>, Vec<[u32; 3]>)> {
        let [a, b, c] = face;
        let tet = [a, c, b, apex];
        let corners = tet.map(|v| self.point(v));
        if orient3d(&corners[0], &corners[1], &corners[2], &corners[3]) <= 0.0 {
            return None;
        }

        let mut closing = Vec::new();
        let mut opening = Vec::new();
        for g in &tet_faces(tet)[..3] {
            let key = triangle_key(*g);
            match self.faces.get(&key) {
                Some(&open) if canonical_triangle(open) == canonical_triangle(*g) => {
                    closing.push(key);
                }
                Some(_) => return None,
                None => opening.push([g[0], g[2], g[1]]),
            }
        }

        let base = triangle_key(face);
        let bounds = Aabb::from_points(corners.iter()).expanded(1e-9 * self.size);
        for key in self.faces_near(&bounds) {
            if key == base || closing.contains(&key) {
                continue;
            }
            let other = self.faces[&key];
            let swallowed = other.iter().any(|v| {
                !tet.contains(v)
                    && point_strictly_in_tetrahedron(
                        &self.point(*v),
                        &corners[0],
                        &corners[1],
                        &corners[2],
                        &corners[3],
                    )
            });
            if swallowed
                || opening
                    .iter()
                    .any(|g| triangles_intersect(*g, other, &self.points))
            {
                return None;
            }
        }
        Some((closing, opening))
    }

    /// Open triangles grouped into edge-connected cavities, in key order.
    fn components(&self) -> Vec<Vec<[u32; 3]>> {
        let mut keys: Vec<[u32; 3]> = self.faces.keys().copied().collect();
        keys.sort_unstable();

        let mut by_edge: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (i, &[a, b, c]) in keys.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (a, c)] {
                by_edge.entry((u, v)).or_default().push(i);
            }
        }

        let mut visited = vec![false; keys.len()];
        let mut components = Vec::new();
        for seed in 0..keys.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut members = vec![seed];
            let mut next = 0;
            while next < members.len() {
                let [a, b, c] = keys[members[next]];
                next += 1;
                for edge in [(a, b), (b, c), (a, c)] {
                    for &j in by_edge.get(&edge).into_iter().flatten() {
                        if !visited[j] {
                            visited[j] = true;
                            members.push(j);
                        }
                    }
                }
            }
            components.push(members.into_iter().map(|i| self.faces[&keys[i]]).collect());
        }
        components
    }

    /// Cone every leftover cavity from one of its kernel points.
    fn close_by_star(&mut self) -> GenerationResult<()> {
        let components = self.components();
        if let Some(limit) = self.steiner_limit {
            let required = self.steiner + components.len();
            if required > limit {
                return Err(GenerationError::SteinerLimit { limit, required });
            }
        }
        debug!(cavities = components.len(), "closing cavities by star decomposition");

        for cavity in components {
            let Some(k) = find_kernel_point(&self.points, &cavity) else {
                return Err(GenerationError::Stalled {
                    remaining: self.faces.len(),
                });
            };
            let apex = u32::try_from(self.points.len()).map_err(|_| GenerationError::Stalled {
                remaining: self.faces.len(),
            })?;
            self.points.push(k);
            self.uses.push(0);
            self.steiner += 1;
            self.tets.extend(cone(&cavity, apex));
            for face in cavity {
                self.close(triangle_key(face));
            }
        }
        Ok(())
    }
}
