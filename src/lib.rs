//! Hierarchical nav-mesh path planner.
//!
//! Builds a two-level graph — mesh vertices partitioned into zones, zones
//! and entrances abstracted into a coarse routing graph — over a caller-
//! supplied walkable surface mesh, then answers pathfinding queries with a
//! custom A* (Euclidean distance + angular-smoothing penalty) run
//! hierarchically: a coarse zone/entrance search picks the route, a fine
//! per-zone search stitches the actual vertex-level path.
//!
//! Mesh authoring, import, clearance measurement and visualisation are all
//! external collaborators — this crate starts from an already loaded
//! [`MeshSource`] and a per-vertex clearance array.

pub mod astar;
pub mod clearance;
pub mod driver;
pub mod entrance;
pub mod error;
pub mod graph;
pub mod mesh_adapter;
pub mod persist;
pub mod query;
pub mod spatial_index;
mod zone;

use glam::Vec3;
use std::f32::consts::PI;

use entrance::{extract_entrances, Entrance};
use error::BuildError;
use graph::{link, NeighbourList, Node0, Node1, Node1Kind, NodeRef};
use mesh_adapter::MeshSource;
use persist::{PersistError, PersistedNavMesh};
use spatial_index::SpatialIndex;
use zone::Zone;

pub use driver::{HighLevelPath, LowLevelPath, PathOptions};
pub use error::PathfindError;
pub use query::NodeId;

/// Builder configuration. Defaults are tuned for a human-scale walkable
/// mesh with roughly unit-length edges.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Clearance bucket width used by the zone partitioner.
    pub bucket_size: f32,
    /// Clearance values above this are folded into the top bucket.
    pub bucket_cap: f32,
    /// Maximum distance from a zone's seed vertex a member may lie at.
    pub zone_radius: f32,
    /// Radius used by [`clearance::smooth_clearance`]. `0.0` disables
    /// smoothing.
    pub smooth_radius: f32,
    /// Accepted for forward compatibility with a mesh adapter's skip-edge
    /// preprocessing; the core itself never connects skip edges.
    pub skip_connect_angle: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            bucket_size: 0.5,
            bucket_cap: 10.0,
            zone_radius: 10.0,
            smooth_radius: 3.0,
            skip_connect_angle: 0.1 * PI,
        }
    }
}

/// A node handed back by a path query: either a real graph node (level 0 or
/// 1) or a synthetic end-position node inserted by end-position refinement,
/// in which case `node_ref` is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    pub node_ref: Option<NodeRef>,
    pub pos: Vec3,
    pub normal: Vec3,
    pub clearance: f32,
}

/// The built two-level graph. Owns every node registry; all topology is
/// index-based, never pointer-based, so the graph can be serialised and
/// reloaded without patching up pointers.
pub struct NavMesh {
    pub(crate) level0: Vec<Node0>,
    pub(crate) level1: Vec<Node1>,
    pub(crate) zones: Vec<Zone>,
    pub(crate) entrances: Vec<Entrance>,
    pub(crate) spatial_index: SpatialIndex,
}

impl NavMesh {
    /// Builds level-0 edges from `mesh`, smooths clearance, partitions into
    /// zones, extracts entrances, then allocates the level-1 zone/entrance
    /// graph and the spatial index.
    pub fn build(
        mesh: &impl MeshSource,
        mut clearance: Vec<f32>,
        settings: &BuildSettings,
    ) -> Result<Self, BuildError> {
        let vertices = mesh.vertices();

        if clearance.len() != vertices.len() {
            return Err(BuildError::ClearanceLengthMismatch {
                expected: vertices.len(),
                got: clearance.len(),
            });
        }

        for (position, v) in vertices.iter().enumerate() {
            if v.index as usize != position {
                return Err(BuildError::NonDenseVertexIndex {
                    position,
                    index: v.index,
                });
            }
            for &n in &v.neighbours {
                if n as usize >= vertices.len() {
                    return Err(BuildError::UnknownNeighbour {
                        vertex: v.index,
                        neighbour: n,
                    });
                }
                if n == v.index {
                    return Err(BuildError::SelfLoop(v.index));
                }
            }
        }

        let positions: Vec<Vec3> = vertices.iter().map(|v| v.pos).collect();

        clearance::smooth_clearance(&positions, &mut clearance, settings.smooth_radius);

        let adjacency: Vec<Vec<u32>> = vertices.iter().map(|v| v.neighbours.clone()).collect();
        let partition = zone::partition(
            &positions,
            &adjacency,
            &clearance,
            settings.bucket_size,
            settings.bucket_cap,
            settings.zone_radius,
        );

        let mut level0: Vec<Node0> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| Node0 {
                index: v.index,
                pos: v.pos,
                normal: v.normal,
                zone_id: partition.zone_of[i],
                clearance: clearance[i],
                intra_neighbours: Default::default(),
                cross_neighbours: Default::default(),
            })
            .collect();

        for v in vertices {
            for &n in &v.neighbours {
                if v.index < n {
                    link(&mut level0, v.index, n);
                }
            }
        }

        let mut zones = partition.zones;
        let mut entrances = extract_entrances(&level0)?;

        let mut level1: Vec<Node1> = Vec::with_capacity(zones.len() + entrances.len());

        for zone in &mut zones {
            let index = level1.len() as u32;
            let centroid = zone.centroid(&positions);
            level1.push(Node1 {
                index,
                pos: centroid,
                clearance: zone.clearance_floor,
                kind: Node1Kind::Zone(zone.id),
                neighbours: NeighbourList::new(),
            });
            zone.level1_node = Some(index);
        }

        for entrance in &mut entrances {
            let index = level1.len() as u32;
            let centroid = entrance.centroid(&positions);
            level1.push(Node1 {
                index,
                pos: centroid,
                clearance: entrance.clearance,
                kind: Node1Kind::Entrance(entrance.id),
                neighbours: NeighbourList::new(),
            });
            entrance.level1_node = Some(index);

            let zone_a_node = zones[entrance.zone_a as usize]
                .level1_node
                .expect("zone level-1 nodes allocated before entrances");
            let zone_b_node = zones[entrance.zone_b as usize]
                .level1_node
                .expect("zone level-1 nodes allocated before entrances");

            level1[index as usize].neighbours.push(zone_a_node);
            level1[index as usize].neighbours.push(zone_b_node);
            level1[zone_a_node as usize].neighbours.push(index);
            level1[zone_b_node as usize].neighbours.push(index);
        }

        let spatial_index = SpatialIndex::build(&positions);

        Ok(Self {
            level0,
            level1,
            zones,
            entrances,
            spatial_index,
        })
    }

    /// Resolves a [`NodeRef`] to its concrete position/normal/clearance.
    pub fn path_node(&self, node_ref: NodeRef) -> PathNode {
        match node_ref {
            NodeRef::Level0(i) => {
                let n = &self.level0[i as usize];
                PathNode {
                    node_ref: Some(node_ref),
                    pos: n.pos,
                    normal: n.normal,
                    clearance: n.clearance,
                }
            }
            NodeRef::Level1(i) => {
                let n = &self.level1[i as usize];
                PathNode {
                    node_ref: Some(node_ref),
                    pos: n.pos,
                    normal: Vec3::Y,
                    clearance: n.clearance,
                }
            }
        }
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn entrance_count(&self) -> usize {
        self.entrances.len()
    }

    pub fn node_count(&self) -> usize {
        self.level0.len()
    }

    /// Direct access to the level-0 registry, for callers driving a custom
    /// [`astar::a_star`] call (e.g. with a non-default heuristic).
    pub fn level0_nodes(&self) -> &[Node0] {
        &self.level0
    }

    /// Direct access to the level-1 (zone/entrance) registry.
    pub fn level1_nodes(&self) -> &[Node1] {
        &self.level1
    }

    /// Serialises this nav-mesh to a schema-versioned byte stream. The
    /// spatial index is excluded and rebuilt by [`Self::from_bytes`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        PersistedNavMesh::new(
            self.level0.clone(),
            self.level1.clone(),
            self.zones.clone(),
            self.entrances.clone(),
        )
        .to_bytes()
    }

    /// Deserialises a nav-mesh previously written by [`Self::to_bytes`],
    /// rebuilding the spatial index from the decoded level-0 positions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        let persisted = PersistedNavMesh::from_bytes(bytes)?;
        let positions: Vec<Vec3> = persisted.level0.iter().map(|n| n.pos).collect();
        let spatial_index = SpatialIndex::build(&positions);

        Ok(Self {
            level0: persisted.level0,
            level1: persisted.level1,
            zones: persisted.zones,
            entrances: persisted.entrances,
            spatial_index,
        })
    }
}
