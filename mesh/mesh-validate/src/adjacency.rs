//! Edge and vertex adjacency of a triangle surface.

use hashbrown::{HashMap, HashSet};

/// Adjacency information for a surface.
///
/// Provides lookups for:
/// - Faces adjacent to an edge
/// - Faces adjacent to a vertex
/// - Boundary edges (edges with only one adjacent face)
/// - Non-manifold edges (edges with more than two adjacent faces)
/// - Non-manifold vertices (faces around a vertex forming several fans)
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    /// Maps edge (v0, v1) to list of face indices. v0 < v1.
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
    /// Maps vertex index to list of face indices.
    vertex_to_faces: HashMap<u32, Vec<usize>>,
}

impl MeshAdjacency {
    /// Build adjacency information from a list of faces.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_validate::MeshAdjacency;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> =
            HashMap::with_capacity(faces.len() * 3 / 2);
        let mut vertex_to_faces: HashMap<u32, Vec<usize>> = HashMap::with_capacity(faces.len() / 2);

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_to_faces.entry(v).or_default().push(face_idx);
            }
            for k in 0..3 {
                let edge = normalize_edge(face[k], face[(k + 1) % 3]);
                edge_to_faces.entry(edge).or_default().push(face_idx);
            }
        }

        Self {
            edge_to_faces,
            vertex_to_faces,
        }
    }

    /// Faces adjacent to an edge, `None` if the edge doesn't exist.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    /// Faces adjacent to a vertex (empty if none).
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_faces.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Boundary edges (exactly one adjacent face), sorted.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        self.edges_where(|n| n == 1)
    }

    /// Count the number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Non-manifold edges (more than two adjacent faces), sorted.
    #[must_use]
    pub fn non_manifold_edges(&self) -> Vec<(u32, u32)> {
        self.edges_where(|n| n > 2)
    }

    /// Count the number of non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() > 2).count()
    }

    fn edges_where(&self, keep: impl Fn(usize) -> bool) -> Vec<(u32, u32)> {
        let mut edges: Vec<_> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| keep(faces.len()))
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Vertices whose incident faces split into more than one edge-connected
    /// fan, sorted.
    ///
    /// Two solids touching at a single point share such a vertex even
    /// though every edge is manifold.
    #[must_use]
    pub fn non_manifold_vertices(&self, faces: &[[u32; 3]]) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .vertex_to_faces
            .iter()
            .filter(|&(&v, incident)| fan_count(v, incident, faces) > 1)
            .map(|(&v, _)| v)
            .collect();
        out.sort_unstable();
        out
    }

    /// Check if all edges have at most 2 adjacent faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// Check if the surface is closed (no boundary edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Get the number of vertices referenced by faces.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}

/// Directed edges traversed by two faces in the same direction, sorted.
///
/// On a consistently wound manifold surface every interior edge is walked
/// once in each direction.
#[must_use]
pub fn inconsistent_edges(faces: &[[u32; 3]]) -> Vec<(u32, u32)> {
    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(faces.len() * 3);
    let mut bad: Vec<(u32, u32)> = Vec::new();
    for face in faces {
        for k in 0..3 {
            let directed = (face[k], face[(k + 1) % 3]);
            if !seen.insert(directed) {
                bad.push(directed);
            }
        }
    }
    bad.sort_unstable();
    bad.dedup();
    bad
}

/// Number of fans around `v`: components of its incident faces, joined
/// when two faces share an edge through `v`.
fn fan_count(v: u32, incident: &[usize], faces: &[[u32; 3]]) -> usize {
    let mut by_spoke: HashMap<u32, Vec<usize>> = HashMap::new();
    for (slot, &fi) in incident.iter().enumerate() {
        for &w in &faces[fi] {
            if w != v {
                by_spoke.entry(w).or_default().push(slot);
            }
        }
    }

    let mut visited = vec![false; incident.len()];
    let mut fans = 0;
    for start in 0..incident.len() {
        if visited[start] {
            continue;
        }
        fans += 1;
        visited[start] = true;
        let mut stack = vec![start];
        while let Some(slot) = stack.pop() {
            for &w in &faces[incident[slot]] {
                if w == v {
                    continue;
                }
                for &next in by_spoke.get(&w).map_or(&[][..], Vec::as_slice) {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
    }
    fans
}

#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::unit_tetrahedron;

    #[test]
    fn faces_for_edge() {
        let adj = MeshAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);

        assert_eq!(adj.faces_for_edge(1, 2).unwrap().len(), 2);
        assert_eq!(adj.faces_for_edge(0, 1).unwrap().len(), 1);
        assert_eq!(adj.faces_for_edge(0, 1), adj.faces_for_edge(1, 0));
        assert!(adj.faces_for_edge(0, 5).is_none());
        assert_eq!(adj.faces_for_vertex(2).len(), 2);
        assert!(adj.faces_for_vertex(99).is_empty());
    }

    #[test]
    fn closed_tetrahedron() {
        let tet = unit_tetrahedron();
        let adj = MeshAdjacency::build(&tet.faces);

        assert_eq!(adj.edge_count(), 6);
        assert_eq!(adj.vertex_count(), 4);
        assert!(adj.is_watertight());
        assert!(adj.is_manifold());
        assert!(adj.non_manifold_vertices(&tet.faces).is_empty());
        assert!(inconsistent_edges(&tet.faces).is_empty());
    }

    #[test]
    fn three_faces_on_one_edge() {
        let adj = MeshAdjacency::build(&[[0, 1, 2], [0, 1, 3], [0, 1, 4]]);

        assert_eq!(adj.non_manifold_edges(), vec![(0, 1)]);
        assert_eq!(adj.non_manifold_edge_count(), 1);
        assert!(!adj.is_manifold());
    }

    #[test]
    fn bowtie_vertex_is_non_manifold() {
        // Two tetrahedra touching at vertex 0.
        let mut faces = unit_tetrahedron().faces;
        faces.extend([[0, 5, 4], [0, 4, 6], [0, 6, 5], [4, 5, 6]]);
        let adj = MeshAdjacency::build(&faces);

        assert!(adj.is_manifold());
        assert!(adj.is_watertight());
        assert_eq!(adj.non_manifold_vertices(&faces), vec![0]);
    }

    #[test]
    fn flipped_face_breaks_winding() {
        let mut faces = unit_tetrahedron().faces;
        faces[0] = [0, 1, 2];
        let bad = inconsistent_edges(&faces);
        assert_eq!(bad.len(), 3);
    }
}
