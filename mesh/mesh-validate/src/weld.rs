//! Vertex welding and compaction.
//!
//! STL stores every triangle with its own corners, so a freshly loaded
//! surface has no shared vertices at all. Welding merges coincident corners
//! back into shared vertices before any topology check runs.

use hashbrown::HashMap;
use mesh_types::IndexedMesh;
use nalgebra::Point3;

/// Weld vertices that are within `epsilon` distance of each other.
///
/// Uses spatial hashing; merges are resolved transitively to the lowest
/// index. Faces that collapse onto fewer than three distinct vertices are
/// removed. Returns the number of vertices merged. A non-positive `epsilon`
/// merges nothing.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_validate::weld_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0001, 0.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 3, 2]);
///
/// assert_eq!(weld_vertices(&mut mesh, 0.001), 1);
/// ```
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32
pub fn weld_vertices(mesh: &mut IndexedMesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() || epsilon <= 0.0 || !epsilon.is_finite() {
        return 0;
    }

    let cell_size = epsilon * 2.0;
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(&vertex.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged_count = 0;
    let eps_sq = epsilon * epsilon;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let cell = pos_to_cell(&vertex.position, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        let d = (vertex.position - mesh.vertices[other as usize].position)
                            .norm_squared();
                        if d < eps_sq {
                            remap[other as usize] = idx;
                            merged_count += 1;
                        }
                    }
                }
            }
        }
    }

    if merged_count == 0 {
        return 0;
    }

    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target as usize] != target {
            target = remap[target as usize];
        }
        remap[i] = target;
    }

    for face in &mut mesh.faces {
        *face = face.map(|v| remap[v as usize]);
    }
    mesh.faces
        .retain(|&[i0, i1, i2]| i0 != i1 && i1 != i2 && i0 != i2);

    merged_count
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: cell coordinates of finite meshes fit in i64
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Remove unreferenced vertices and compact the vertex array.
///
/// Vertex order is kept. Returns the number of vertices removed.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_validate::remove_unreferenced_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(100.0, 100.0, 100.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
/// assert_eq!(mesh.vertices.len(), 3);
/// ```
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.vertices.len();
    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &v in face {
            if let Some(slot) = referenced.get_mut(v as usize) {
                *slot = true;
            }
        }
    }
    if referenced.iter().all(|&r| r) {
        return 0;
    }

    let mut remap = vec![u32::MAX; original_count];
    let mut kept = Vec::with_capacity(original_count);
    for (old, vertex) in mesh.vertices.iter().enumerate() {
        if referenced[old] {
            remap[old] = kept.len() as u32;
            kept.push(*vertex);
        }
    }
    for face in &mut mesh.faces {
        *face = face.map(|v| remap[v as usize]);
    }

    let removed = original_count - kept.len();
    mesh.vertices = kept;
    removed
}
