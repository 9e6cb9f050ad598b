//! Mutable tetrahedralization with face adjacency.
//!
//! Faces without a neighbor are boundary faces; they are never crossed by
//! point location or cavity growth, so inserting points keeps them intact.

use hashbrown::{HashMap, HashSet};
use mesh_types::predicates::{in_sphere, orient3d, point_strictly_in_tetrahedron};
use mesh_types::{TET_FACES, tet_faces, triangle_key};
use nalgebra::Point3;

/// Points and tetrahedra produced by a meshing strategy.
///
/// The first points are the surface vertices in their original order.
#[derive(Debug, Clone, Default)]
pub(crate) struct VolumeOutput {
    pub(crate) points: Vec<Point3<f64>>,
    pub(crate) tetrahedra: Vec<[u32; 4]>,
    pub(crate) steiner_points: usize,
}

/// Steps of a visibility walk before falling back to a full scan.
const MAX_WALK_STEPS: usize = 2048;

/// Tetrahedra stored with their four neighbors across faces
/// (`adjacent[t][i]` is across the face opposite vertex `i`).
#[derive(Debug, Clone)]
pub(crate) struct TetComplex {
    pub(crate) points: Vec<Point3<f64>>,
    tets: Vec<[u32; 4]>,
    adjacent: Vec<[Option<usize>; 4]>,
    alive: Vec<bool>,
    hint: usize,
}

impl TetComplex {
    /// Link tetrahedra that share a face.
    pub(crate) fn new(points: Vec<Point3<f64>>, tets: Vec<[u32; 4]>) -> Self {
        let mut adjacent = vec![[None; 4]; tets.len()];
        let mut open: HashMap<[u32; 3], (usize, usize)> = HashMap::with_capacity(tets.len() * 2);
        for (t, &tet) in tets.iter().enumerate() {
            for (i, face) in tet_faces(tet).into_iter().enumerate() {
                match open.remove(&triangle_key(face)) {
                    Some((other, j)) => {
                        adjacent[t][i] = Some(other);
                        adjacent[other][j] = Some(t);
                    }
                    None => {
                        open.insert(triangle_key(face), (t, i));
                    }
                }
            }
        }
        let alive = vec![true; tets.len()];
        Self {
            points,
            tets,
            adjacent,
            alive,
            hint: 0,
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    /// Live tetrahedra in creation order.
    pub(crate) fn live_tets(&self) -> impl Iterator<Item = (usize, [u32; 4])> + '_ {
        self.tets
            .iter()
            .enumerate()
            .filter(|&(t, _)| self.alive[t])
            .map(|(t, &tet)| (t, tet))
    }

    pub(crate) fn is_alive(&self, t: usize) -> bool {
        self.alive.get(t).copied().unwrap_or(false)
    }

    pub(crate) fn corners(&self, t: usize) -> [Point3<f64>; 4] {
        self.tets[t].map(|v| self.points[v as usize])
    }

    /// Points and live tetrahedra.
    pub(crate) fn into_parts(self) -> (Vec<Point3<f64>>, Vec<[u32; 4]>) {
        let tets = self
            .tets
            .iter()
            .zip(&self.alive)
            .filter(|&(_, &alive)| alive)
            .map(|(&tet, _)| tet)
            .collect();
        (self.points, tets)
    }

    /// Find a tetrahedron that strictly contains `p`.
    ///
    /// Walks from the last created tetrahedron towards `p`; when the walk
    /// is blocked by the boundary or runs too long, scans every tetrahedron.
    /// `None` when `p` is outside the domain or on a face.
    pub(crate) fn locate(&self, p: &Point3<f64>) -> Option<usize> {
        let mut current = if self.is_alive(self.hint) {
            self.hint
        } else {
            self.alive.iter().position(|&a| a)?
        };

        for step in 0..MAX_WALK_STEPS {
            let corners = self.corners(current);
            let mut next = None;
            let mut inside = true;
            for k in 0..4 {
                let i = (k + step) % 4;
                let [a, b, c] = TET_FACES[i];
                let o = orient3d(&corners[a], &corners[b], &corners[c], p);
                if o >= 0.0 {
                    inside = false;
                }
                if o > 0.0 {
                    if let Some(n) = self.adjacent[current][i] {
                        next = Some(n);
                        break;
                    }
                }
            }
            match next {
                Some(n) => current = n,
                None if inside => return Some(current),
                None => break,
            }
        }
        self.scan(p)
    }

    fn scan(&self, p: &Point3<f64>) -> Option<usize> {
        self.live_tets().map(|(t, _)| t).find(|&t| {
            let [a, b, c, d] = self.corners(t);
            point_strictly_in_tetrahedron(p, &a, &b, &c, &d)
        })
    }

    /// Insert `p`, which lies strictly inside tetrahedron `start`.
    ///
    /// The cavity holds the tetrahedra whose circumsphere contains `p`,
    /// reachable from `start` without crossing the boundary, trimmed until
    /// every cavity face is seen from `p` strictly from the inside. The
    /// cavity is then replaced by the cone from `p` over its faces. Returns
    /// the new vertex index, or `None` (nothing changed) when the cone
    /// would not close up.
    pub(crate) fn insert(&mut self, p: Point3<f64>, start: usize) -> Option<u32> {
        if !self.is_alive(start) {
            return None;
        }
        let mut cavity = self.grow_cavity(&p, start);
        self.make_star_shaped(&p, start, &mut cavity);

        let members: HashSet<usize> = cavity.iter().copied().collect();
        let vertex = u32::try_from(self.points.len()).ok()?;

        // Faces of the cavity shell with the tetrahedron and slot beyond.
        let mut shell: Vec<([u32; 3], Option<(usize, usize)>)> = Vec::new();
        for &t in &cavity {
            for (i, face) in tet_faces(self.tets[t]).into_iter().enumerate() {
                match self.adjacent[t][i] {
                    Some(n) if members.contains(&n) => {}
                    Some(n) => {
                        let j = self.adjacent[n].iter().position(|&m| m == Some(t))?;
                        shell.push((face, Some((n, j))));
                    }
                    None => shell.push((face, None)),
                }
            }
        }

        // New tetrahedra [a, c, b, p]: slot 0 holds edge (c, b), slot 1
        // edge (a, b), slot 2 edge (a, c).
        let base = self.tets.len();
        let mut edges: HashMap<(u32, u32), Vec<(usize, usize)>> = HashMap::new();
        for (k, &([a, b, c], _)) in shell.iter().enumerate() {
            for (slot, (u, v)) in [(c, b), (a, b), (a, c)].into_iter().enumerate() {
                edges
                    .entry((u.min(v), u.max(v)))
                    .or_default()
                    .push((base + k, slot));
            }
        }
        if edges.values().any(|uses| uses.len() != 2) {
            return None;
        }

        self.points.push(p);
        for (k, &([a, b, c], beyond)) in shell.iter().enumerate() {
            self.tets.push([a, c, b, vertex]);
            self.adjacent.push([None, None, None, beyond.map(|(n, _)| n)]);
            self.alive.push(true);
            if let Some((n, j)) = beyond {
                self.adjacent[n][j] = Some(base + k);
            }
        }
        for uses in edges.values() {
            let (t0, s0) = uses[0];
            let (t1, s1) = uses[1];
            self.adjacent[t0][s0] = Some(t1);
            self.adjacent[t1][s1] = Some(t0);
        }
        for &t in &cavity {
            self.alive[t] = false;
        }
        self.hint = base;
        Some(vertex)
    }

    /// Breadth-first growth over tetrahedra whose circumsphere holds `p`.
    fn grow_cavity(&self, p: &Point3<f64>, start: usize) -> Vec<usize> {
        let mut cavity = vec![start];
        let mut seen: HashSet<usize> = HashSet::from([start]);
        let mut next = 0;
        while next < cavity.len() {
            let t = cavity[next];
            next += 1;
            for n in self.adjacent[t].into_iter().flatten() {
                if !self.alive[n] || !seen.insert(n) {
                    continue;
                }
                let [a, b, c, d] = self.corners(n);
                if in_sphere(&a, &b, &c, &d, p) > 0.0 {
                    cavity.push(n);
                }
            }
        }
        cavity
    }

    /// Drop tetrahedra with a shell face not strictly visible from `p`,
    /// then keep what is still connected to `start`, until stable.
    fn make_star_shaped(&self, p: &Point3<f64>, start: usize, cavity: &mut Vec<usize>) {
        loop {
            let members: HashSet<usize> = cavity.iter().copied().collect();
            let hidden: HashSet<usize> = cavity
                .iter()
                .copied()
                .filter(|&t| t != start && self.has_hidden_face(t, p, &members))
                .collect();
            if hidden.is_empty() {
                return;
            }

            let kept: HashSet<usize> = members.difference(&hidden).copied().collect();
            let mut connected = vec![start];
            let mut seen: HashSet<usize> = HashSet::from([start]);
            let mut next = 0;
            while next < connected.len() {
                let t = connected[next];
                next += 1;
                for n in self.adjacent[t].into_iter().flatten() {
                    if kept.contains(&n) && seen.insert(n) {
                        connected.push(n);
                    }
                }
            }
            *cavity = connected;
        }
    }

    fn has_hidden_face(&self, t: usize, p: &Point3<f64>, members: &HashSet<usize>) -> bool {
        let corners = self.corners(t);
        TET_FACES.iter().enumerate().any(|(i, &[a, b, c])| {
            let inner = self.adjacent[t][i].is_some_and(|n| members.contains(&n));
            !inner && orient3d(&corners[a], &corners[b], &corners[c], p) >= 0.0
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{TetMesh, Vertex, unit_cube};

    use crate::kernel::cone;

    fn cube_complex() -> (TetComplex, mesh_types::IndexedMesh) {
        let cube = unit_cube();
        let mut points = cube.positions();
        points.push(Point3::new(0.5, 0.5, 0.5));
        let tets = cone(&cube.faces, 8);
        (TetComplex::new(points, tets), cube)
    }

    fn to_mesh(complex: TetComplex) -> TetMesh {
        let (points, tets) = complex.into_parts();
        let mut mesh = TetMesh::new();
        mesh.vertices = points.into_iter().map(Vertex::new).collect();
        mesh.tetrahedra = tets;
        mesh
    }

    #[test]
    fn adjacency_links_shared_faces() {
        let (complex, _) = cube_complex();
        assert_eq!(complex.live_count(), 12);
        // Each cone tetrahedron touches the boundary once (slot 3) and its
        // three neighbors across the faces through the apex.
        for t in 0..12 {
            assert!(complex.adjacent[t][3].is_none());
            assert!(complex.adjacent[t][..3].iter().all(Option::is_some));
        }
    }

    #[test]
    fn locate_finds_containing_tet() {
        let (complex, _) = cube_complex();
        let p = Point3::new(0.5, 0.45, 0.1);
        let t = complex.locate(&p).unwrap();
        let [a, b, c, d] = complex.corners(t);
        assert!(point_strictly_in_tetrahedron(&p, &a, &b, &c, &d));
        assert!(complex.locate(&Point3::new(2.0, 0.5, 0.5)).is_none());
    }

    #[test]
    fn insertion_keeps_boundary() {
        let (mut complex, cube) = cube_complex();
        let probes = [
            Point3::new(0.25, 0.3, 0.2),
            Point3::new(0.71, 0.22, 0.8),
            Point3::new(0.3, 0.77, 0.6),
            Point3::new(0.8, 0.8, 0.25),
            Point3::new(0.55, 0.4, 0.65),
        ];
        for p in probes {
            let t = complex.locate(&p).unwrap();
            assert!(complex.insert(p, t).is_some());
        }
        assert_eq!(complex.points.len(), 14);

        let mesh = to_mesh(complex);
        assert_eq!(mesh.inverted_count(), 0);
        assert!(mesh.boundary_matches(&cube.faces));
        assert!((mesh.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_dead_start() {
        let (mut complex, _) = cube_complex();
        let p = Point3::new(0.5, 0.45, 0.1);
        let t = complex.locate(&p).unwrap();
        complex.insert(p, t).unwrap();
        assert!(!complex.is_alive(t));
        assert!(complex.insert(Point3::new(0.5, 0.5, 0.9), t).is_none());
    }
}
