//! A single-level shortest-path search reused for both level-0 intra-zone
//! searches and the level-1 zone/entrance search run by the hierarchical
//! driver.
//!
//! The open set is a binary heap with lazy deletion: a sorted `Vec` plus
//! a linear membership scan is asymptotically dominated by a proper
//! indexed priority queue once the node count grows, so the open set here
//! is a `BinaryHeap` instead. A stale pop (one whose cached `f` no longer
//! matches the node's current best-known cost) is simply skipped;
//! decrease-key is "push again, let the old entry go stale".

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use glam::Vec3;
use smallvec::SmallVec;

use crate::error::PathfindError;
use crate::graph::{Node0, Node1};

/// Default weight for the angular-penalty term: balances a radian of turn
/// against 50 units of straight-line distance. Exposed as a tunable on
/// [`AStarOptions`] rather than a hardcoded constant, since the right
/// trade-off between turning and distance is agent- and level-specific.
pub const DEFAULT_ANGULAR_PENALTY_WEIGHT: f32 = 50.0;

/// A graph the A* core can search over one level of. Implemented for
/// `[Node0]` (intra-zone edges only) and `[Node1]` (the bipartite
/// zone/entrance graph).
pub trait SearchGraph {
    fn position(&self, index: u32) -> Vec3;
    fn clearance(&self, index: u32) -> f32;
    /// `(neighbour_index, edge_distance)` pairs reachable in a single A*
    /// step. For level 0 this is intra-zone neighbours only — crossing
    /// zones is the hierarchical driver's job, not the core search's.
    fn neighbours(&self, index: u32) -> SmallVec<[(u32, f32); 8]>;
    fn len(&self) -> usize;
}

impl SearchGraph for [Node0] {
    fn position(&self, index: u32) -> Vec3 {
        self[index as usize].pos
    }
    fn clearance(&self, index: u32) -> f32 {
        self[index as usize].clearance
    }
    fn neighbours(&self, index: u32) -> SmallVec<[(u32, f32); 8]> {
        self[index as usize].intra_neighbours.iter().copied().collect()
    }
    fn len(&self) -> usize {
        <[Node0]>::len(self)
    }
}

impl SearchGraph for [Node1] {
    fn position(&self, index: u32) -> Vec3 {
        self[index as usize].pos
    }
    fn clearance(&self, index: u32) -> f32 {
        self[index as usize].clearance
    }
    fn neighbours(&self, index: u32) -> SmallVec<[(u32, f32); 8]> {
        let pos = self[index as usize].pos;
        self[index as usize]
            .neighbours
            .iter()
            .map(|&n| (n, pos.distance(self[n as usize].pos)))
            .collect()
    }
    fn len(&self) -> usize {
        <[Node1]>::len(self)
    }
}

/// Heuristic used by [`a_star`]. Euclidean is the default; Manhattan is
/// offered as a cheaper alternative for grid-like meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    #[default]
    Euclidean,
    Manhattan,
}

fn heuristic_distance(h: Heuristic, a: Vec3, b: Vec3) -> f32 {
    match h {
        Heuristic::Euclidean => a.distance(b),
        Heuristic::Manhattan => (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs(),
    }
}

/// Options accepted by a single [`a_star`] invocation.
#[derive(Debug, Clone, Default)]
pub struct AStarOptions {
    pub avoid: HashSet<u32>,
    pub min_height: f32,
    pub initial_dir: Option<Vec3>,
    pub final_target_node: Option<u32>,
    pub return_debug_info: bool,
    pub heuristic: Heuristic,
    pub angular_penalty_weight: f32,
    /// Optional guard against unbounded search. `None` disables the guard.
    pub max_expansions: Option<usize>,
}

impl AStarOptions {
    pub fn new() -> Self {
        Self {
            angular_penalty_weight: DEFAULT_ANGULAR_PENALTY_WEIGHT,
            ..Default::default()
        }
    }
}

/// Snapshot of the search's internal state, returned when
/// `return_debug_info` is set.
#[derive(Debug, Clone)]
pub struct DebugInfo {
    pub open: Vec<u32>,
    pub closed: Vec<u32>,
    pub end_nodes: Vec<u32>,
}

/// Result of a successful [`a_star`] call.
#[derive(Debug, Clone)]
pub struct AStarResult {
    /// Node indices from `start` to the reached target, inclusive.
    pub path: Vec<u32>,
    /// Total accumulated cost (distance + angular penalty) of the path.
    pub cost: f32,
    pub debug: Option<DebugInfo>,
}

#[derive(Clone, Copy)]
struct HeapEntry {
    f: f32,
    index: u32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.index == other.index
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reverse order vs. numeric comparison: `BinaryHeap` is a max-heap, and we
// want the minimum `f` (tie-broken by index, for a deterministic total
// order) to surface first.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}

struct Scratch {
    g: Vec<f32>,
    h: Vec<f32>,
    parent: Vec<i64>,
    closed: Vec<bool>,
}

impl Scratch {
    fn new(len: usize) -> Self {
        Self {
            g: vec![f32::INFINITY; len],
            h: vec![0.0; len],
            parent: vec![-1; len],
            closed: vec![false; len],
        }
    }
}

fn angle_penalty(weight: f32, incoming_dir: Vec3, outgoing: Vec3) -> f32 {
    let d_in_len = incoming_dir.length();
    let v_out_len = outgoing.length();
    if d_in_len <= 0.0 || v_out_len <= 0.0 {
        return 0.0;
    }
    let cos_theta = (incoming_dir.dot(outgoing) / (d_in_len * v_out_len)).clamp(-1.0, 1.0);
    weight * cos_theta.acos()
}

/// Runs A* over `graph` from `start` to any of `end_nodes`.
pub fn a_star<G: SearchGraph + ?Sized>(
    graph: &G,
    start: u32,
    end_nodes: &[u32],
    options: &AStarOptions,
) -> Result<AStarResult, PathfindError> {
    if end_nodes.is_empty() {
        return Err(PathfindError::NoValidEndNodes);
    }

    let valid_end_nodes: Vec<u32> = end_nodes
        .iter()
        .copied()
        .filter(|&n| graph.clearance(n) >= options.min_height)
        .collect();
    if valid_end_nodes.is_empty() {
        return Err(PathfindError::NoValidEndNodes);
    }
    let end_set: HashSet<u32> = valid_end_nodes.iter().copied().collect();

    let heuristic_targets: &[u32] = match &options.final_target_node {
        Some(t) => std::slice::from_ref(t),
        None => &valid_end_nodes,
    };
    let heuristic_at = |pos: Vec3| -> f32 {
        heuristic_targets
            .iter()
            .map(|&t| heuristic_distance(options.heuristic, pos, graph.position(t)))
            .fold(f32::INFINITY, f32::min)
    };

    let n = graph.len();
    let mut scratch = Scratch::new(n);
    let mut open = BinaryHeap::new();

    for &avoided in &options.avoid {
        if (avoided as usize) < n {
            scratch.closed[avoided as usize] = true;
        }
    }

    scratch.g[start as usize] = 0.0;
    let start_h = heuristic_at(graph.position(start));
    scratch.h[start as usize] = start_h;
    open.push(HeapEntry {
        f: start_h,
        index: start,
    });

    let mut expansions = 0usize;

    while let Some(HeapEntry { f, index: current }) = open.pop() {
        if scratch.closed[current as usize] {
            continue;
        }
        // Stale entry from before a decrease-key: the best known f for
        // this node has since improved.
        if f > scratch.g[current as usize] + scratch.h[current as usize] + f32::EPSILON {
            continue;
        }

        if let Some(budget) = options.max_expansions {
            expansions += 1;
            if expansions > budget {
                return Err(PathfindError::ExpansionBudgetExceeded);
            }
        }

        if end_set.contains(&current) {
            return Ok(build_result(&scratch, current, options.return_debug_info, &open, &valid_end_nodes));
        }

        scratch.closed[current as usize] = true;

        let incoming_dir = if scratch.parent[current as usize] >= 0 {
            let parent = scratch.parent[current as usize] as u32;
            (graph.position(current) - graph.position(parent)).normalize_or_zero()
        } else {
            options.initial_dir.unwrap_or(Vec3::ZERO)
        };

        for (neighbour, edge_dist) in graph.neighbours(current) {
            if scratch.closed[neighbour as usize] {
                continue;
            }
            if graph.clearance(neighbour) < options.min_height {
                continue;
            }

            let outgoing = graph.position(neighbour) - graph.position(current);
            let penalty = angle_penalty(options.angular_penalty_weight, incoming_dir, outgoing);
            let new_g = scratch.g[current as usize] + edge_dist + penalty;

            if new_g < scratch.g[neighbour as usize] {
                scratch.g[neighbour as usize] = new_g;
                scratch.parent[neighbour as usize] = current as i64;
                let h = heuristic_at(graph.position(neighbour));
                scratch.h[neighbour as usize] = h;
                open.push(HeapEntry {
                    f: new_g + h,
                    index: neighbour,
                });
            }
        }
    }

    Err(PathfindError::Unreachable)
}

fn build_result(
    scratch: &Scratch,
    end: u32,
    want_debug: bool,
    open: &BinaryHeap<HeapEntry>,
    end_nodes: &[u32],
) -> AStarResult {
    let mut path = Vec::new();
    let mut cur = end as i64;
    while cur >= 0 {
        path.push(cur as u32);
        cur = scratch.parent[cur as usize];
    }
    path.reverse();

    let debug = want_debug.then(|| DebugInfo {
        open: open.iter().map(|e| e.index).collect(),
        closed: (0..scratch.closed.len())
            .filter(|&i| scratch.closed[i])
            .map(|i| i as u32)
            .collect(),
        end_nodes: end_nodes.to_vec(),
    });

    AStarResult {
        path,
        cost: scratch.g[end as usize],
        debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node0;
    use smallvec::SmallVec;

    fn chain_graph(n: usize) -> Vec<Node0> {
        let mut nodes: Vec<Node0> = (0..n)
            .map(|i| Node0 {
                index: i as u32,
                pos: Vec3::new(i as f32, 0.0, 0.0),
                normal: Vec3::Y,
                zone_id: 0,
                clearance: 2.0,
                intra_neighbours: SmallVec::new(),
                cross_neighbours: SmallVec::new(),
            })
            .collect();
        for i in 0..n - 1 {
            crate::graph::link(&mut nodes, i as u32, (i + 1) as u32);
        }
        nodes
    }

    #[test]
    fn straight_corridor_finds_shortest_path() {
        let nodes = chain_graph(5);
        let result = a_star(nodes.as_slice(), 0, &[4], &AStarOptions::new()).unwrap();
        assert_eq!(result.path, vec![0, 1, 2, 3, 4]);
        assert!((result.cost - 4.0).abs() < 1e-4);
    }

    #[test]
    fn no_angular_penalty_matches_dijkstra_distance() {
        // A Y-junction: 0-1-2 straight, and 1-3 a branch of equal length.
        let mut nodes: Vec<Node0> = vec![
            Node0 {
                index: 0,
                pos: Vec3::new(0.0, 0.0, 0.0),
                normal: Vec3::Y,
                zone_id: 0,
                clearance: 2.0,
                intra_neighbours: SmallVec::new(),
                cross_neighbours: SmallVec::new(),
            },
            Node0 {
                index: 1,
                pos: Vec3::new(1.0, 0.0, 0.0),
                normal: Vec3::Y,
                zone_id: 0,
                clearance: 2.0,
                intra_neighbours: SmallVec::new(),
                cross_neighbours: SmallVec::new(),
            },
            Node0 {
                index: 2,
                pos: Vec3::new(2.0, 0.0, 0.0),
                normal: Vec3::Y,
                zone_id: 0,
                clearance: 2.0,
                intra_neighbours: SmallVec::new(),
                cross_neighbours: SmallVec::new(),
            },
        ];
        crate::graph::link(&mut nodes, 0, 1);
        crate::graph::link(&mut nodes, 1, 2);

        let result = a_star(nodes.as_slice(), 0, &[2], &AStarOptions::new()).unwrap();
        assert!((result.cost - 2.0).abs() < 1e-4);
    }

    #[test]
    fn avoid_set_is_respected() {
        let nodes = chain_graph(5);
        let mut options = AStarOptions::new();
        options.avoid.insert(2);

        let result = a_star(nodes.as_slice(), 0, &[4], &options);
        assert!(matches!(result, Err(PathfindError::Unreachable)));
    }

    #[test]
    fn clearance_filter_blocks_low_nodes() {
        let mut nodes = chain_graph(3);
        nodes[1].clearance = 0.5;

        let mut options = AStarOptions::new();
        options.min_height = 1.0;

        let result = a_star(nodes.as_slice(), 0, &[2], &options);
        assert!(matches!(result, Err(PathfindError::Unreachable)));
    }

    #[test]
    fn empty_end_nodes_is_an_error() {
        let nodes = chain_graph(2);
        let result = a_star(nodes.as_slice(), 0, &[], &AStarOptions::new());
        assert!(matches!(result, Err(PathfindError::NoValidEndNodes)));
    }

    #[test]
    fn determinism_across_repeated_runs() {
        let nodes = chain_graph(6);
        let a = a_star(nodes.as_slice(), 0, &[5], &AStarOptions::new()).unwrap();
        let b = a_star(nodes.as_slice(), 0, &[5], &AStarOptions::new()).unwrap();
        assert_eq!(a.path, b.path);
        assert_eq!(a.cost, b.cost);
    }
}
