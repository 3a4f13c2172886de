//! The two-level node data model: level-0 mesh-vertex nodes and level-1
//! zone/entrance nodes.
//!
//! Topology is stored as arrays of indices, never as ownership pointers —
//! the registries (`Vec<Node0>`/`Vec<Node1>`) are the sole owners. This
//! avoids both a process-wide global node table and the cycles an
//! ownership-pointer-based undirected graph would otherwise require.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::entrance::EntranceId;

/// A reference to a node in either level of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Level0(u32),
    Level1(u32),
}

impl NodeRef {
    pub fn index(self) -> usize {
        match self {
            NodeRef::Level0(i) | NodeRef::Level1(i) => i as usize,
        }
    }
}

/// Small inline vector used for neighbour lists — most nodes have only a
/// handful of neighbours, so a `SmallVec` avoids a heap allocation per node
/// in the common case.
pub type NeighbourList = SmallVec<[u32; 6]>;

/// Level-0 node: one walkable mesh vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node0 {
    pub index: u32,
    pub pos: Vec3,
    pub normal: Vec3,
    pub zone_id: u32,
    pub clearance: f32,
    /// Neighbours in the same zone. Stores `(neighbour_index, distance)`.
    pub intra_neighbours: SmallVec<[(u32, f32); 6]>,
    /// Neighbours in a different zone. Stores `(neighbour_index, distance)`.
    pub cross_neighbours: SmallVec<[(u32, f32); 4]>,
}

impl Node0 {
    /// O(1) cached Euclidean distance to a neighbour.
    pub fn dist_to_neighbour(&self, neighbour: u32) -> Option<f32> {
        self.intra_neighbours
            .iter()
            .chain(self.cross_neighbours.iter())
            .find(|(n, _)| *n == neighbour)
            .map(|(_, d)| *d)
    }

    pub fn all_neighbours(&self) -> impl Iterator<Item = u32> + '_ {
        self.intra_neighbours
            .iter()
            .chain(self.cross_neighbours.iter())
            .map(|(n, _)| *n)
    }
}

/// What a level-1 node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node1Kind {
    Zone(u32),
    Entrance(EntranceId),
}

/// Level-1 node: a zone centroid or an entrance centroid. The level-1
/// graph is bipartite: zone nodes only neighbour entrance nodes and vice
/// versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node1 {
    pub index: u32,
    pub pos: Vec3,
    pub clearance: f32,
    pub kind: Node1Kind,
    pub neighbours: NeighbourList,
}

impl Node1 {
    pub fn entrance_id(&self) -> Option<EntranceId> {
        match self.kind {
            Node1Kind::Entrance(id) => Some(id),
            Node1Kind::Zone(_) => None,
        }
    }
}

/// Connects two level-0 nodes symmetrically, classifying the edge as
/// intra- or cross-zone from the *current* zone ids.
pub(crate) fn link(nodes: &mut [Node0], a: u32, b: u32) {
    if a == b {
        return;
    }
    let dist = nodes[a as usize].pos.distance(nodes[b as usize].pos);

    let same_zone = nodes[a as usize].zone_id == nodes[b as usize].zone_id;
    for (from, to) in [(a, b), (b, a)] {
        let already_linked = nodes[from as usize]
            .all_neighbours()
            .any(|n| n == to);
        if already_linked {
            continue;
        }
        if same_zone {
            nodes[from as usize].intra_neighbours.push((to, dist));
        } else {
            nodes[from as usize].cross_neighbours.push((to, dist));
        }
    }
}
