//! Face-to-face adjacency across manifold edges.

use hashbrown::HashMap;
use mesh_types::IndexedMesh;

/// Face adjacency information.
///
/// Two faces are neighbors when they share an edge used by exactly those
/// two faces. Edges with more faces are ignored, so adjacency never leaks
/// through a non-manifold junction.
#[derive(Debug, Clone)]
pub struct FaceAdjacency {
    /// For each face, `(neighbor, shared edge)` pairs sorted by neighbor.
    adjacent: Vec<Vec<(usize, (u32, u32))>>,
}

impl FaceAdjacency {
    /// Build face adjacency from a mesh.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, Vertex};
    /// use mesh_classify::FaceAdjacency;
    ///
    /// let mut mesh = IndexedMesh::new();
    /// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    /// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
    /// mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
    /// mesh.vertices.push(Vertex::from_coords(1.5, 1.0, 0.0));
    /// mesh.faces.push([0, 1, 2]);
    /// mesh.faces.push([1, 3, 2]);
    ///
    /// let adj = FaceAdjacency::from_mesh(&mesh);
    /// assert_eq!(adj.neighbors(0).collect::<Vec<_>>(), vec![1]);
    /// ```
    #[must_use]
    pub fn from_mesh(mesh: &IndexedMesh) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> =
            HashMap::with_capacity(mesh.faces.len() * 3 / 2);
        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for i in 0..3 {
                let (v0, v1) = (face[i], face[(i + 1) % 3]);
                let edge = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                edge_to_faces.entry(edge).or_default().push(face_idx);
            }
        }

        let mut adjacent: Vec<Vec<(usize, (u32, u32))>> = vec![Vec::new(); mesh.faces.len()];
        for (&edge, faces) in &edge_to_faces {
            if let &[f0, f1] = faces.as_slice() {
                if f0 != f1 {
                    adjacent[f0].push((f1, edge));
                    adjacent[f1].push((f0, edge));
                }
            }
        }
        for list in &mut adjacent {
            list.sort_unstable();
        }

        Self { adjacent }
    }

    /// Neighbors of a face in ascending order (empty when out of bounds).
    pub fn neighbors(&self, face_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacent
            .get(face_idx)
            .into_iter()
            .flatten()
            .map(|&(f, _)| f)
    }

    /// Neighbors of a face together with the shared edge `(min, max)`.
    #[must_use]
    pub fn neighbor_edges(&self, face_idx: usize) -> &[(usize, (u32, u32))] {
        self.adjacent.get(face_idx).map_or(&[], Vec::as_slice)
    }

    /// Get the number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.adjacent.len()
    }

    /// Check if two faces are adjacent.
    #[must_use]
    pub fn are_adjacent(&self, face_a: usize, face_b: usize) -> bool {
        self.neighbors(face_a).any(|f| f == face_b)
    }

    /// Connected components (shells), each sorted, ordered by their lowest
    /// face index.
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.adjacent.len()];
        let mut components = Vec::new();
        for start in 0..self.adjacent.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut component = Vec::new();
            let mut stack = vec![start];
            while let Some(face) = stack.pop() {
                component.push(face);
                for next in self.neighbors(face) {
                    if !visited[next] {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Vector3, unit_cube};

    #[test]
    fn cube_faces_have_three_neighbors() {
        let adj = FaceAdjacency::from_mesh(&unit_cube());
        assert_eq!(adj.face_count(), 12);
        for f in 0..12 {
            assert_eq!(adj.neighbors(f).count(), 3);
        }
        assert!(adj.are_adjacent(0, 1));
        assert!(adj.neighbors(100).next().is_none());
    }

    #[test]
    fn shared_edge_is_reported() {
        let adj = FaceAdjacency::from_mesh(&unit_cube());
        // Faces 0 [0,2,1] and 1 [0,3,2] share the bottom diagonal.
        assert!(adj.neighbor_edges(0).contains(&(1, (0, 2))));
    }

    #[test]
    fn separate_shells_are_separate_components() {
        let mut mesh = unit_cube();
        let mut other = unit_cube();
        other.translate(Vector3::new(3.0, 0.0, 0.0));
        mesh.merge(&other);

        let components = FaceAdjacency::from_mesh(&mesh).connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], (0..12).collect::<Vec<_>>());
        assert_eq!(components[1], (12..24).collect::<Vec<_>>());
    }

    #[test]
    fn non_manifold_edge_is_not_crossed() {
        let mut mesh = unit_cube();
        mesh.vertices.push(mesh_types::Vertex::from_coords(0.5, 0.5, -1.0));
        mesh.faces.push([0, 2, 8]);
        let adj = FaceAdjacency::from_mesh(&mesh);
        assert!(!adj.are_adjacent(0, 1));
        assert!(!adj.are_adjacent(12, 0));
    }
}
