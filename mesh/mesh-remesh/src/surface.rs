//! Mutable triangle surface with local edge operations.

// Mesh indices are u32; valences are small
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use hashbrown::HashSet;
use mesh_types::{IndexedMesh, Point3, Vector3, Vertex};

/// How a vertex may move while remeshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VertexKind {
    /// No incident feature edge.
    Smooth,
    /// Exactly two incident feature edges: slides along the feature line.
    Feature,
    /// Any other number of feature edges: pinned.
    Corner,
}

#[inline]
pub(crate) const fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// Surface being remeshed.
///
/// Faces are tombstoned rather than removed so face indices stay stable
/// while a pass runs. Each vertex keeps the list of its live faces; a
/// vertex without faces is dead.
pub(crate) struct Surface {
    pub(crate) positions: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    alive: Vec<bool>,
    incident: Vec<Vec<usize>>,
    features: HashSet<(u32, u32)>,
}

impl Surface {
    pub(crate) fn from_mesh(mesh: &IndexedMesh) -> Self {
        let positions: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
        let mut incident = vec![Vec::new(); positions.len()];
        for (fi, face) in mesh.faces.iter().enumerate() {
            for &v in face {
                incident[v as usize].push(fi);
            }
        }
        Self {
            positions,
            faces: mesh.faces.clone(),
            alive: vec![true; mesh.faces.len()],
            incident,
            features: HashSet::new(),
        }
    }

    /// Mark edges whose dihedral angle exceeds the threshold (given as the
    /// cosine of the angle between face normals). Returns the count.
    pub(crate) fn mark_features(&mut self, cos_threshold: f64) -> usize {
        for (a, b) in self.edges() {
            let sharp = match self.edge_faces(a, b).as_slice() {
                &[f0, f1] => match (self.unit_normal(f0), self.unit_normal(f1)) {
                    (Some(n0), Some(n1)) => n0.dot(&n1) < cos_threshold,
                    _ => true,
                },
                _ => true,
            };
            if sharp {
                self.features.insert((a, b));
            }
        }
        self.features.len()
    }

    /// Feature edges, sorted.
    pub(crate) fn feature_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<_> = self.features.iter().copied().collect();
        edges.sort_unstable();
        edges
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn live_faces(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces
            .iter()
            .zip(&self.alive)
            .filter(|&(_, &alive)| alive)
            .map(|(&face, _)| face)
    }

    pub(crate) fn face_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    pub(crate) fn live_vertices(&self) -> Vec<u32> {
        (0..self.positions.len() as u32)
            .filter(|&v| !self.incident[v as usize].is_empty())
            .collect()
    }

    /// Unique live edges as sorted `(min, max)` pairs.
    pub(crate) fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .live_faces()
            .flat_map(|f| {
                [
                    edge_key(f[0], f[1]),
                    edge_key(f[1], f[2]),
                    edge_key(f[2], f[0]),
                ]
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    pub(crate) fn edge_faces(&self, a: u32, b: u32) -> Vec<usize> {
        self.incident[a as usize]
            .iter()
            .copied()
            .filter(|&fi| self.faces[fi].contains(&b))
            .collect()
    }

    /// Vertices sharing an edge with `v`, sorted.
    pub(crate) fn neighbors(&self, v: u32) -> Vec<u32> {
        let mut out: Vec<u32> = self.incident[v as usize]
            .iter()
            .flat_map(|&fi| self.faces[fi])
            .filter(|&u| u != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn valence(&self, v: u32) -> usize {
        self.neighbors(v).len()
    }

    pub(crate) fn is_feature(&self, a: u32, b: u32) -> bool {
        self.features.contains(&edge_key(a, b))
    }

    fn feature_neighbors(&self, v: u32) -> Vec<u32> {
        self.neighbors(v)
            .into_iter()
            .filter(|&u| self.is_feature(v, u))
            .collect()
    }

    pub(crate) fn kind(&self, v: u32) -> VertexKind {
        match self.feature_neighbors(v).len() {
            0 => VertexKind::Smooth,
            2 => VertexKind::Feature,
            _ => VertexKind::Corner,
        }
    }

    pub(crate) fn length_sq(&self, a: u32, b: u32) -> f64 {
        (self.positions[a as usize] - self.positions[b as usize]).norm_squared()
    }

    fn point(&self, v: u32) -> Point3<f64> {
        self.positions[v as usize]
    }

    fn face_normal(&self, fi: usize) -> Vector3<f64> {
        let f = self.faces[fi];
        cross_normal(&self.point(f[0]), &self.point(f[1]), &self.point(f[2]))
    }

    fn unit_normal(&self, fi: usize) -> Option<Vector3<f64>> {
        self.face_normal(fi).try_normalize(f64::MIN_POSITIVE)
    }

    /// Area-weighted vertex normal.
    pub(crate) fn vertex_normal(&self, v: u32) -> Option<Vector3<f64>> {
        self.incident[v as usize]
            .iter()
            .map(|&fi| self.face_normal(fi))
            .sum::<Vector3<f64>>()
            .try_normalize(f64::MIN_POSITIVE)
    }

    /// Mean position of the neighbors of `v`.
    pub(crate) fn neighbor_centroid(&self, v: u32) -> Option<Point3<f64>> {
        let neighbors = self.neighbors(v);
        if neighbors.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = neighbors.iter().map(|&u| self.point(u).coords).sum();
        Some(Point3::from(sum / neighbors.len() as f64))
    }

    /// Midpoint of the two feature neighbors of a feature vertex.
    pub(crate) fn feature_midpoint(&self, v: u32) -> Option<Point3<f64>> {
        match self.feature_neighbors(v).as_slice() {
            &[a, b] => Some(nalgebra::center(&self.point(a), &self.point(b))),
            _ => None,
        }
    }

    /// Whether `face` keeps a non-degenerate, similarly oriented normal when
    /// the vertices in `moved` are placed at `to`.
    fn keeps_orientation(&self, face: [u32; 3], moved: &[u32], to: &Point3<f64>) -> bool {
        let at = |v: u32| if moved.contains(&v) { *to } else { self.point(v) };
        let old = cross_normal(&self.point(face[0]), &self.point(face[1]), &self.point(face[2]));
        let new = cross_normal(&at(face[0]), &at(face[1]), &at(face[2]));
        let (old_len, new_len) = (old.norm(), new.norm());
        new_len > old_len * 1e-6 && old.dot(&new) > 0.5 * old_len * new_len
    }

    /// Whether `v` can move to `to` without folding any incident face.
    pub(crate) fn can_move(&self, v: u32, to: &Point3<f64>) -> bool {
        self.incident[v as usize]
            .iter()
            .all(|&fi| self.keeps_orientation(self.faces[fi], &[v], to))
    }

    // =========================================================================
    // Edits
    // =========================================================================

    fn add_vertex(&mut self, p: Point3<f64>) -> u32 {
        self.positions.push(p);
        self.incident.push(Vec::new());
        (self.positions.len() - 1) as u32
    }

    fn add_face(&mut self, face: [u32; 3]) {
        let fi = self.faces.len();
        self.faces.push(face);
        self.alive.push(true);
        for v in face {
            self.incident[v as usize].push(fi);
        }
    }

    fn remove_face(&mut self, fi: usize) {
        self.alive[fi] = false;
        for v in self.faces[fi] {
            self.incident[v as usize].retain(|&f| f != fi);
        }
    }

    /// Split edge `(a, b)` at its midpoint. Winding and feature status carry
    /// over to the halves.
    pub(crate) fn split_edge(&mut self, a: u32, b: u32) -> bool {
        let faces = self.edge_faces(a, b);
        if faces.is_empty() {
            return false;
        }
        let m = self.add_vertex(nalgebra::center(&self.point(a), &self.point(b)));
        if self.features.remove(&edge_key(a, b)) {
            self.features.insert(edge_key(a, m));
            self.features.insert(edge_key(m, b));
        }
        for fi in faces {
            let [x, y, c] = rotate_to_edge(self.faces[fi], a, b);
            self.remove_face(fi);
            self.add_face([x, m, c]);
            self.add_face([m, y, c]);
        }
        true
    }

    /// Where edge `(a, b)` collapses to, as `(keep, remove, position)`.
    ///
    /// Smooth vertices merge into feature or corner vertices; feature lines
    /// only shorten along themselves; corners never move.
    pub(crate) fn collapse_target(&self, a: u32, b: u32) -> Option<(u32, u32, Point3<f64>)> {
        let (pa, pb) = (self.point(a), self.point(b));
        let along_feature = self.is_feature(a, b);
        match (self.kind(a), self.kind(b)) {
            (VertexKind::Smooth, VertexKind::Smooth) => Some((a, b, nalgebra::center(&pa, &pb))),
            (VertexKind::Smooth, _) => Some((b, a, pb)),
            (_, VertexKind::Smooth) => Some((a, b, pa)),
            _ if !along_feature => None,
            (VertexKind::Feature, VertexKind::Feature) => Some((a, b, nalgebra::center(&pa, &pb))),
            (VertexKind::Corner, VertexKind::Feature) => Some((a, b, pa)),
            (VertexKind::Feature, VertexKind::Corner) => Some((b, a, pb)),
            (VertexKind::Corner, VertexKind::Corner) => None,
        }
    }

    /// Check a collapse keeps the surface a valid manifold.
    ///
    /// Link condition, no valence-3 opposite vertex, no merging of feature
    /// lines, no edge longer than `max_length`, no folded face.
    pub(crate) fn can_collapse(
        &self,
        keep: u32,
        remove: u32,
        to: &Point3<f64>,
        max_length: f64,
    ) -> bool {
        let shared = self.edge_faces(keep, remove);
        if shared.len() != 2 {
            return false;
        }
        let opposite: Vec<u32> = shared
            .iter()
            .filter_map(|&fi| third_vertex(self.faces[fi], keep, remove))
            .collect();
        if opposite.len() != 2 || opposite[0] == opposite[1] {
            return false;
        }

        let keep_ring = self.neighbors(keep);
        let remove_ring = self.neighbors(remove);
        let common = keep_ring
            .iter()
            .filter(|v| remove_ring.binary_search(v).is_ok())
            .count();
        if common != 2 || opposite.iter().any(|&c| self.valence(c) <= 3) {
            return false;
        }

        let keep_features: Vec<u32> = self
            .feature_neighbors(keep)
            .into_iter()
            .filter(|&v| v != remove)
            .collect();
        if self
            .feature_neighbors(remove)
            .iter()
            .any(|v| *v != keep && keep_features.contains(v))
        {
            return false;
        }

        let max_sq = max_length * max_length;
        if keep_ring
            .iter()
            .chain(&remove_ring)
            .any(|&v| v != keep && v != remove && (self.point(v) - to).norm_squared() > max_sq)
        {
            return false;
        }

        self.incident[keep as usize]
            .iter()
            .chain(&self.incident[remove as usize])
            .all(|&fi| {
                let face = self.faces[fi];
                (face.contains(&keep) && face.contains(&remove))
                    || self.keeps_orientation(face, &[keep, remove], to)
            })
    }

    /// Merge `remove` into `keep`, placing `keep` at `to`.
    pub(crate) fn collapse_edge(&mut self, keep: u32, remove: u32, to: Point3<f64>) {
        self.positions[keep as usize] = to;
        for v in self.feature_neighbors(remove) {
            self.features.remove(&edge_key(remove, v));
            if v != keep {
                self.features.insert(edge_key(keep, v));
            }
        }
        for fi in self.incident[remove as usize].clone() {
            let face = self.faces[fi];
            self.remove_face(fi);
            if !face.contains(&keep) {
                self.add_face(face.map(|v| if v == remove { keep } else { v }));
            }
        }
    }

    /// Flip edge `(a, b)` when that brings the four diamond valences closer
    /// to six. Feature edges and flips that fold or crease the surface are
    /// refused.
    pub(crate) fn try_flip(&mut self, a: u32, b: u32, cos_feature: f64) -> bool {
        if self.is_feature(a, b) {
            return false;
        }
        let &[f0, f1] = self.edge_faces(a, b).as_slice() else {
            return false;
        };
        let (first, second) = if has_directed_edge(self.faces[f0], a, b) {
            (f0, f1)
        } else {
            (f1, f0)
        };
        if !has_directed_edge(self.faces[first], a, b)
            || !has_directed_edge(self.faces[second], b, a)
        {
            return false;
        }
        let (Some(c), Some(d)) = (
            third_vertex(self.faces[first], a, b),
            third_vertex(self.faces[second], a, b),
        ) else {
            return false;
        };
        if c == d || self.neighbors(c).binary_search(&d).is_ok() {
            return false;
        }

        let (va, vb, vc, vd) = (self.valence(a), self.valence(b), self.valence(c), self.valence(d));
        if va <= 3 || vb <= 3 {
            return false;
        }
        let dev = |valence: usize| (valence as i64 - 6).abs();
        let before = dev(va) + dev(vb) + dev(vc) + dev(vd);
        let after = dev(va - 1) + dev(vb - 1) + dev(vc + 1) + dev(vd + 1);
        if after >= before {
            return false;
        }

        let new_first = [a, d, c];
        let new_second = [d, b, c];
        let min_norm = 1e-9 * self.length_sq(c, d);
        let (Some(n0), Some(n1), Some(o0), Some(o1)) = (
            cross_normal(&self.point(a), &self.point(d), &self.point(c)).try_normalize(min_norm),
            cross_normal(&self.point(d), &self.point(b), &self.point(c)).try_normalize(min_norm),
            self.unit_normal(first),
            self.unit_normal(second),
        ) else {
            return false;
        };
        let old = o0 + o1;
        if n0.dot(&old) <= 0.0 || n1.dot(&old) <= 0.0 || n0.dot(&n1) < cos_feature {
            return false;
        }

        self.remove_face(first);
        self.remove_face(second);
        self.add_face(new_first);
        self.add_face(new_second);
        true
    }

    /// Compact live faces and vertices into an indexed mesh.
    pub(crate) fn to_mesh(&self) -> IndexedMesh {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut mesh = IndexedMesh::new();
        for v in self.live_vertices() {
            remap[v as usize] = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::new(self.point(v)));
        }
        mesh.faces = self
            .live_faces()
            .map(|f| f.map(|v| remap[v as usize]))
            .collect();
        mesh
    }
}

fn cross_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

fn has_directed_edge(face: [u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|k| face[k] == a && face[(k + 1) % 3] == b)
}

fn third_vertex(face: [u32; 3], a: u32, b: u32) -> Option<u32> {
    face.into_iter().find(|&v| v != a && v != b)
}

/// Rotate `face` so it starts with the edge `{a, b}` in winding order.
fn rotate_to_edge(face: [u32; 3], a: u32, b: u32) -> [u32; 3] {
    for k in 0..3 {
        let (u, v) = (face[k], face[(k + 1) % 3]);
        if (u == a && v == b) || (u == b && v == a) {
            return [u, v, face[(k + 2) % 3]];
        }
    }
    face
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{cylinder, unit_cube};
    use mesh_validate::validate_mesh;

    fn cube_surface() -> Surface {
        let mut surface = Surface::from_mesh(&unit_cube());
        surface.mark_features(45.0_f64.to_radians().cos());
        surface
    }

    #[test]
    fn cube_features_and_kinds() {
        let surface = cube_surface();
        assert_eq!(surface.feature_edges().len(), 12);
        for v in 0..8 {
            assert_eq!(surface.kind(v), VertexKind::Corner);
        }
        // Side diagonals are flat.
        assert!(!surface.is_feature(0, 2));
    }

    #[test]
    fn split_keeps_surface_closed() {
        let mut surface = cube_surface();
        assert!(surface.split_edge(0, 1));
        assert_eq!(surface.face_count(), 14);
        assert_eq!(surface.kind(8), VertexKind::Feature);
        assert!(surface.is_feature(0, 8) && surface.is_feature(8, 1));
        assert!(!surface.is_feature(0, 1));

        let mesh = surface.to_mesh();
        let report = validate_mesh(&mesh);
        assert!(report.is_valid(), "{report}");
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn diagonal_split_makes_smooth_vertex() {
        let mut surface = cube_surface();
        assert!(surface.split_edge(0, 2));
        assert_eq!(surface.kind(8), VertexKind::Smooth);
    }

    #[test]
    fn corners_never_collapse_together() {
        let surface = cube_surface();
        assert!(surface.collapse_target(0, 1).is_none());
    }

    #[test]
    fn collapse_undoes_split() {
        let mut surface = cube_surface();
        surface.split_edge(0, 2);
        let (keep, remove, to) = surface.collapse_target(0, 8).unwrap();
        assert_eq!((keep, remove), (0, 8));
        assert!(surface.can_collapse(keep, remove, &to, 10.0));
        surface.collapse_edge(keep, remove, to);
        assert_eq!(surface.face_count(), 12);
        assert!(validate_mesh(&surface.to_mesh()).is_valid());
    }

    #[test]
    fn max_length_blocks_collapse() {
        let mut surface = cube_surface();
        surface.split_edge(0, 2);
        let (keep, remove, to) = surface.collapse_target(8, 0).unwrap();
        assert!(!surface.can_collapse(keep, remove, &to, 0.5));
    }

    #[test]
    fn flips_never_touch_features() {
        let mut surface = cube_surface();
        assert!(!surface.try_flip(0, 1, 0.0));
    }

    #[test]
    fn cylinder_rim_vertices_slide() {
        let mut surface = Surface::from_mesh(&cylinder(1.0, 5.0, 16, 2));
        let features = surface.mark_features(45.0_f64.to_radians().cos());
        assert_eq!(features, 32);
        // Ring 0 is the bottom rim, ring 1 is interior.
        assert_eq!(surface.kind(0), VertexKind::Feature);
        assert_eq!(surface.kind(16), VertexKind::Smooth);
        assert!(surface.feature_midpoint(0).is_some());
        assert!(surface.vertex_normal(16).is_some());
    }
}
