//! Groups cross-zone border vertices into maximal connected entrance
//! clusters.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::graph::Node0;

/// Stable id of an [`Entrance`] within [`crate::NavMesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntranceId(pub u32);

/// A maximal connected component of border vertices joining two specific
/// zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entrance {
    pub id: EntranceId,
    /// `zone_a < zone_b`.
    pub zone_a: u32,
    pub zone_b: u32,
    pub members: Vec<u32>,
    pub clearance: f32,
    centroid: Option<Vec3>,
    pub level1_node: Option<u32>,
}

impl Entrance {
    pub fn other_zone(&self, zone_id: u32) -> u32 {
        if zone_id == self.zone_a {
            self.zone_b
        } else {
            debug_assert_eq!(zone_id, self.zone_b);
            self.zone_a
        }
    }

    pub fn centroid(&mut self, positions: &[Vec3]) -> Vec3 {
        if let Some(c) = self.centroid {
            return c;
        }
        let sum: Vec3 = self.members.iter().map(|&i| positions[i as usize]).sum();
        let c = sum / self.members.len() as f32;
        self.centroid = Some(c);
        c
    }

    /// Members of this entrance that live in `zone_id` (the caller's
    /// current zone), used by the hierarchical driver to pick A* targets
    /// for "get to the next entrance" segments.
    pub fn members_in_zone<'a>(
        &'a self,
        nodes: &'a [Node0],
        zone_id: u32,
    ) -> impl Iterator<Item = u32> + 'a {
        self.members
            .iter()
            .copied()
            .filter(move |&m| nodes[m as usize].zone_id == zone_id)
    }
}

/// Extracts every entrance between touching zone pairs.
///
/// For each pair of zones sharing at least one cross-zone edge, the
/// participating vertices are grouped into maximal connected components
/// under the union of intra- and cross-zone edges (restricted to the
/// participating vertex set); each component becomes one [`Entrance`].
///
/// Each produced component's connectivity is a graph invariant, not user
/// input, so a violation panics immediately in debug builds. In release
/// builds the panic is compiled out; the violation is logged and surfaced
/// as [`BuildError::InvariantViolation`] instead of silently shipping a
/// broken entrance.
pub fn extract_entrances(nodes: &[Node0]) -> Result<Vec<Entrance>, BuildError> {
    // Border vertices per zone pair.
    let mut border_vertices: HashMap<(u32, u32), HashSet<u32>> = HashMap::new();
    for node in nodes {
        for &(neighbour, _) in &node.cross_neighbours {
            let other_zone = nodes[neighbour as usize].zone_id;
            if node.zone_id == other_zone {
                continue;
            }
            let pair = if node.zone_id < other_zone {
                (node.zone_id, other_zone)
            } else {
                (other_zone, node.zone_id)
            };
            border_vertices.entry(pair).or_default().insert(node.index);
        }
    }

    let mut entrances = Vec::new();
    let mut next_id = 0u32;

    let mut pairs: Vec<_> = border_vertices.into_iter().collect();
    pairs.sort_unstable_by_key(|(pair, _)| *pair);

    for ((zone_a, zone_b), vertex_set) in pairs {
        let mut unvisited = vertex_set.clone();

        while let Some(&start) = unvisited.iter().next() {
            unvisited.remove(&start);

            let mut members = vec![start];
            let mut stack = vec![start];

            while let Some(v) = stack.pop() {
                let node = &nodes[v as usize];
                for n in node.all_neighbours() {
                    if unvisited.remove(&n) {
                        members.push(n);
                        stack.push(n);
                    }
                }
            }

            if !is_connected(nodes, &members) {
                let message =
                    format!("entrance between zones {zone_a} and {zone_b} is not connected");
                log::error!("{message}");
                debug_assert!(false, "{message}");
                return Err(BuildError::InvariantViolation(message));
            }

            let clearance = members
                .iter()
                .map(|&m| nodes[m as usize].clearance)
                .fold(f32::INFINITY, f32::min);

            let id = EntranceId(next_id);
            next_id += 1;

            entrances.push(Entrance {
                id,
                zone_a,
                zone_b,
                members,
                clearance,
                centroid: None,
                level1_node: None,
            });
        }
    }

    Ok(entrances)
}

fn is_connected(nodes: &[Node0], members: &[u32]) -> bool {
    if members.is_empty() {
        return true;
    }
    let set: HashSet<u32> = members.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut stack = vec![members[0]];
    seen.insert(members[0]);

    while let Some(v) = stack.pop() {
        for n in nodes[v as usize].all_neighbours() {
            if set.contains(&n) && seen.insert(n) {
                stack.push(n);
            }
        }
    }

    seen.len() == members.len()
}
