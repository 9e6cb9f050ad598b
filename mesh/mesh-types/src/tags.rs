//! Per-triangle face tags.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Face ID reserved for triangles that belong to no face.
pub const UNASSIGNED: u32 = 0;

/// A map from triangle index to face ID.
///
/// Face IDs start at 1; [`UNASSIGNED`] (0) marks untagged triangles.
///
/// # Example
///
/// ```
/// use mesh_types::FaceTags;
///
/// let mut tags = FaceTags::new(4);
/// tags.set(0, 1);
/// tags.set(1, 1);
/// tags.set(2, 2);
///
/// assert_eq!(tags.face_ids(), vec![1, 2]);
/// assert_eq!(tags.triangles_with(1), vec![0, 1]);
/// assert!(!tags.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceTags {
    ids: Vec<u32>,
}

impl FaceTags {
    /// Tags for `triangle_count` triangles, all unassigned.
    #[must_use]
    pub fn new(triangle_count: usize) -> Self {
        Self {
            ids: vec![UNASSIGNED; triangle_count],
        }
    }

    /// Wrap an existing per-triangle ID vector.
    #[must_use]
    pub const fn from_vec(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    /// Face ID of a triangle, `None` when out of bounds.
    #[must_use]
    pub fn get(&self, triangle: usize) -> Option<u32> {
        self.ids.get(triangle).copied()
    }

    /// Assign a face ID. Returns `false` when the index is out of bounds.
    pub fn set(&mut self, triangle: usize, id: u32) -> bool {
        self.ids.get_mut(triangle).map(|slot| *slot = id).is_some()
    }

    /// Number of tagged triangles (including unassigned ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if no triangles are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check if every triangle carries a face ID.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ids.iter().all(|&id| id != UNASSIGNED)
    }

    /// The raw per-triangle IDs.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    /// Sorted unique face IDs, excluding [`UNASSIGNED`].
    #[must_use]
    pub fn face_ids(&self) -> Vec<u32> {
        self.sizes().into_keys().collect()
    }

    /// Number of distinct faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.sizes().len()
    }

    /// Check if a face ID is in use.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        id != UNASSIGNED && self.ids.contains(&id)
    }

    /// Triangle indices carrying a face ID, ascending.
    #[must_use]
    pub fn triangles_with(&self, id: u32) -> Vec<usize> {
        self.ids
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == id)
            .map(|(i, _)| i)
            .collect()
    }

    /// Triangle count per face ID, ordered by ID.
    #[must_use]
    pub fn sizes(&self) -> BTreeMap<u32, usize> {
        let mut sizes = BTreeMap::new();
        for &id in &self.ids {
            if id != UNASSIGNED {
                *sizes.entry(id).or_insert(0) += 1;
            }
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tags_are_unassigned() {
        let tags = FaceTags::new(3);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.face_count(), 0);
        assert!(!tags.is_complete());
        assert!(!tags.contains(UNASSIGNED));
    }

    #[test]
    fn set_out_of_bounds() {
        let mut tags = FaceTags::new(2);
        assert!(tags.set(1, 4));
        assert!(!tags.set(2, 4));
        assert_eq!(tags.get(1), Some(4));
        assert_eq!(tags.get(2), None);
    }

    #[test]
    fn sizes_by_id() {
        let tags = FaceTags::from_vec(vec![2, 1, 2, 3, 2]);
        let sizes = tags.sizes();
        assert_eq!(sizes.get(&2), Some(&3));
        assert_eq!(tags.face_ids(), vec![1, 2, 3]);
        assert!(tags.is_complete());
        assert_eq!(tags.triangles_with(2), vec![0, 2, 4]);
    }
}
