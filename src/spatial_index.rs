//! A static spatial index over level-0 node positions, used for
//! nearest-vertex lookup from a free-form 3D position.
//!
//! Built with [`rstar`] rather than a hand-rolled k-d tree — `rstar` is a
//! common choice for `nearest`/`within distance` queries over static point
//! sets. It is never persisted; it's rebuilt after deserialisation, which
//! `SpatialIndex::build` does unconditionally.

use glam::Vec3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    pos: [f32; 3],
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        let dz = self.pos[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// A static spatial index over a slice of positions, keyed by their
/// position within that slice.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    /// Builds the index over `positions`. Rebuilt wholesale on every call —
    /// there is no incremental update; the index is always static for the
    /// lifetime of a [`crate::NavMesh`].
    pub fn build(positions: &[Vec3]) -> Self {
        let points = positions
            .iter()
            .enumerate()
            .map(|(index, pos)| IndexedPoint {
                pos: pos.to_array(),
                index,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Index of the closest point to `pos`, or `None` if the index is empty.
    pub fn nearest(&self, pos: Vec3) -> Option<usize> {
        self.tree
            .nearest_neighbor(&pos.to_array())
            .map(|p| p.index)
    }

    /// Indices of every point within `radius` world units of `pos`
    /// (inclusive).
    pub fn ball(&self, pos: Vec3, radius: f32) -> Vec<usize> {
        let radius_sq = radius * radius;
        self.tree
            .locate_within_distance(pos.to_array(), radius_sq)
            .map(|p| p.index)
            .collect()
    }
}
