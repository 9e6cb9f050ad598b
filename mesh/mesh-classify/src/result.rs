//! Result of boundary classification.

use std::collections::BTreeMap;

use mesh_types::FaceTags;

/// Face IDs assigned to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Face ID of every triangle, starting at 1.
    pub tags: FaceTags,
    /// Number of faces found.
    pub face_count: usize,
    /// Triangle count per face ID.
    pub sizes: BTreeMap<u32, usize>,
    /// Threshold the faces were split at, in degrees.
    pub angle_threshold_deg: f64,
}

impl Classification {
    pub(crate) fn new(tags: FaceTags, angle_threshold_deg: f64) -> Self {
        let sizes = tags.sizes();
        Self {
            face_count: sizes.len(),
            sizes,
            tags,
            angle_threshold_deg,
        }
    }

    /// Face IDs in ascending order (`1..=face_count`).
    #[must_use]
    pub fn face_ids(&self) -> Vec<u32> {
        self.sizes.keys().copied().collect()
    }

    /// The face with the most triangles; the lowest ID wins ties.
    #[must_use]
    pub fn largest_face(&self) -> Option<u32> {
        self.sizes
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&id, _)| id)
    }

    /// Consume the result, keeping only the tags.
    #[must_use]
    pub fn into_tags(self) -> FaceTags {
        self.tags
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Classification: {} faces over {} triangles at {:.1}°",
            self.face_count,
            self.tags.len(),
            self.angle_threshold_deg
        )?;
        for (id, size) in &self.sizes {
            write!(f, "\n  face {id}: {size} triangles")?;
        }
        Ok(())
    }
}
