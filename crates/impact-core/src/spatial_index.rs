//! Bounding-box index over layer features.
//!
//! Callers re-check every candidate against the full geometry. Implementations
//! may over-approximate but must never drop a feature whose box intersects the
//! query.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::coords::BoundingBox;

/// Bounding-box → candidate-id lookup.
pub trait SpatialIndex: Send + Sync {
    fn insert(&mut self, id: usize, bbox: BoundingBox);

    /// Ids of every entry whose box intersects `bbox`, sorted and deduplicated.
    fn query(&self, bbox: &BoundingBox) -> Vec<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Entry = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn entry(id: usize, bbox: BoundingBox) -> Entry {
    GeomWithData::new(
        Rectangle::from_corners([bbox.min_lon, bbox.min_lat], [bbox.max_lon, bbox.max_lat]),
        id,
    )
}

/// R*-tree over feature bounding boxes.
#[derive(Default)]
pub struct RTreeIndex {
    tree: RTree<Entry>,
}

impl RTreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build in one pass (STR packing).
    pub fn bulk_load(entries: impl IntoIterator<Item = (usize, BoundingBox)>) -> Self {
        let entries: Vec<Entry> = entries.into_iter().map(|(id, bbox)| entry(id, bbox)).collect();
        Self { tree: RTree::bulk_load(entries) }
    }
}

impl SpatialIndex for RTreeIndex {
    fn insert(&mut self, id: usize, bbox: BoundingBox) {
        self.tree.insert(entry(id, bbox));
    }

    fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let envelope = AABB::from_corners([bbox.min_lon, bbox.min_lat], [bbox.max_lon, bbox.max_lat]);
        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.data)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}
