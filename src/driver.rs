//! Hierarchical path assembly and end-position refinement.
//!
//! A level-1 search over zone/entrance centroids picks the sequence of
//! entrances to cross, then one level-0 A* per zone stitches the low-level
//! path, carrying `initial_dir` across each entrance as
//! `entry_pos - exit_pos` so angular penalties stay continuous across zone
//! boundaries.

use glam::Vec3;

use crate::astar::{a_star, AStarOptions};
use crate::error::PathfindError;
use crate::graph::{NodeRef, Node1Kind};
use crate::{NavMesh, PathNode};

/// The level-1 node sequence connecting the start zone to the end zone via
/// entrance nodes. Empty when start and end share a zone.
pub type HighLevelPath = Vec<PathNode>;
/// The level-0 node sequence actually traversed by the agent.
pub type LowLevelPath = Vec<PathNode>;

/// Caller-supplied constraints for a hierarchical path query.
#[derive(Debug, Clone, Default)]
pub struct PathOptions {
    pub avoid: std::collections::HashSet<u32>,
    pub min_height: f32,
    pub initial_dir: Vec3,
    /// Precise 3D end position for end-position refinement. `None` means
    /// "stop at the end node's own position".
    pub end_pos: Option<Vec3>,
}

pub(crate) fn find_full_path(
    nav_mesh: &NavMesh,
    start: u32,
    end: u32,
    options: &PathOptions,
) -> Result<(HighLevelPath, LowLevelPath), PathfindError> {
    let start_zone = nav_mesh.level0[start as usize].zone_id;
    let end_zone = nav_mesh.level0[end as usize].zone_id;

    // Computed once up front, covering the whole route, rather than taken
    // from the first stepwise segment below — that segment's high-level
    // path has already had the just-crossed entrance truncated off its
    // front, so it no longer reflects the full start-to-end sequence.
    let high_level_indices = if start_zone == end_zone {
        Vec::new()
    } else {
        compute_high_level_path(nav_mesh, start_zone, end_zone)?
    };
    let full_high: HighLevelPath = high_level_indices
        .iter()
        .map(|&i| nav_mesh.path_node(NodeRef::Level1(i)))
        .collect();

    let mut sections = PathSections::new(nav_mesh, start, end, options.clone());
    sections.cur_high_level_path = high_level_indices;

    let mut full_low = Vec::new();
    for section in sections {
        let (_, low) = section?;
        full_low.extend(low);
    }

    Ok((full_high, full_low))
}

/// Lazy, stateful producer of per-zone path segments. Holds exactly the
/// state this pattern needs across calls: `cur_start`, `cur_high_level_path`,
/// `initial_dir`, and `last_section_found`.
pub struct PathSections<'a> {
    nav_mesh: &'a NavMesh,
    end: u32,
    end_pos: Option<Vec3>,
    avoid: std::collections::HashSet<u32>,
    min_height: f32,

    cur_start: u32,
    cur_high_level_path: Vec<u32>,
    initial_dir: Vec3,
    last_section_found: bool,
}

impl<'a> PathSections<'a> {
    pub fn new(nav_mesh: &'a NavMesh, start: u32, end: u32, options: PathOptions) -> Self {
        Self {
            nav_mesh,
            end,
            end_pos: options.end_pos,
            avoid: options.avoid,
            min_height: options.min_height,
            cur_start: start,
            // The level-1 path is computed lazily on the first `next()`
            // call (or primed directly by `find_full_path`) so construction
            // itself can't fail.
            cur_high_level_path: Vec::new(),
            initial_dir: options.initial_dir,
            last_section_found: false,
        }
    }

    fn to_path_nodes(&self, indices: &[u32], level: u8) -> Vec<PathNode> {
        indices
            .iter()
            .map(|&i| self.nav_mesh.path_node(NodeRef::from_level(level, i)))
            .collect()
    }

    fn final_segment(&mut self) -> Result<(Vec<PathNode>, Vec<PathNode>), PathfindError> {
        let mut options = AStarOptions::new();
        options.avoid = self.avoid.clone();
        options.min_height = self.min_height;
        options.initial_dir = Some(self.initial_dir);

        let result = a_star(
            self.nav_mesh.level0.as_slice(),
            self.cur_start,
            &[self.end],
            &options,
        )?;

        self.last_section_found = true;

        let mut low_level_nodes = self.to_path_nodes(&result.path, 0);
        refine_end_position(&mut low_level_nodes, self.end_pos);

        Ok((Vec::new(), low_level_nodes))
    }
}

impl<'a> Iterator for PathSections<'a> {
    type Item = Result<(HighLevelPath, LowLevelPath), PathfindError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.last_section_found {
            return None;
        }

        let cur_zone = self.nav_mesh.level0[self.cur_start as usize].zone_id;
        let end_zone = self.nav_mesh.level0[self.end as usize].zone_id;

        if cur_zone == end_zone {
            return Some(self.final_segment());
        }

        // First call for a cross-zone query: compute the level-1 path.
        if self.cur_high_level_path.is_empty() {
            match compute_high_level_path(self.nav_mesh, cur_zone, end_zone) {
                Ok(path) => self.cur_high_level_path = path,
                Err(e) => {
                    self.last_section_found = true;
                    return Some(Err(e));
                }
            }
        }

        // Find the next entrance node in the remaining high-level path.
        let next_entrance_pos = self
            .cur_high_level_path
            .iter()
            .position(|&n| matches!(self.nav_mesh.level1[n as usize].kind, Node1Kind::Entrance(_)));

        let Some(pos) = next_entrance_pos else {
            // No more entrances: we must already be in the end zone, but
            // guard against the degenerate case of a malformed level-1 path.
            self.last_section_found = true;
            return Some(Err(PathfindError::Unreachable));
        };

        let entrance_node = self.cur_high_level_path[pos];
        let Node1Kind::Entrance(entrance_id) = self.nav_mesh.level1[entrance_node as usize].kind
        else {
            unreachable!("position located via Node1Kind::Entrance filter");
        };
        let entrance = &self.nav_mesh.entrances[entrance_id.0 as usize];

        let targets: Vec<u32> = entrance
            .members_in_zone(&self.nav_mesh.level0, cur_zone)
            .collect();
        if targets.is_empty() {
            self.last_section_found = true;
            return Some(Err(PathfindError::Unreachable));
        }

        let mut options = AStarOptions::new();
        options.avoid = self.avoid.clone();
        options.min_height = self.min_height;
        options.initial_dir = Some(self.initial_dir);
        options.final_target_node = Some(self.end);

        let result = match a_star(self.nav_mesh.level0.as_slice(), self.cur_start, &targets, &options) {
            Ok(r) => r,
            Err(e) => {
                self.last_section_found = true;
                return Some(Err(e));
            }
        };

        let exit_node = *result.path.last().expect("A* path always has >=1 node");
        let exit_pos = self.nav_mesh.level0[exit_node as usize].pos;

        let other_zone = entrance.other_zone(cur_zone);
        let exit_node_ref = &self.nav_mesh.level0[exit_node as usize];
        // The exit node's own cross-zone neighbours that land in the next
        // zone are, by construction, exactly the entrance members on the
        // other side — pick the nearest.
        let Some(entry_node) = exit_node_ref
            .cross_neighbours
            .iter()
            .map(|&(n, _)| n)
            .filter(|&n| self.nav_mesh.level0[n as usize].zone_id == other_zone)
            .min_by(|&a, &b| {
                let da = self.nav_mesh.level0[a as usize].pos.distance_squared(exit_pos);
                let db = self.nav_mesh.level0[b as usize].pos.distance_squared(exit_pos);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
        else {
            self.last_section_found = true;
            return Some(Err(PathfindError::Unreachable));
        };

        let entry_pos = self.nav_mesh.level0[entry_node as usize].pos;
        self.initial_dir = entry_pos - exit_pos;
        self.cur_start = entry_node;
        self.cur_high_level_path = self.cur_high_level_path[pos + 1..].to_vec();

        let high = self.to_path_nodes(&self.cur_high_level_path, 1);
        let low = self.to_path_nodes(&result.path, 0);

        Some(Ok((high, low)))
    }
}

fn compute_high_level_path(nav_mesh: &NavMesh, start_zone: u32, end_zone: u32) -> Result<Vec<u32>, PathfindError> {
    let Some(start_node) = nav_mesh.zones[start_zone as usize].level1_node else {
        return Err(PathfindError::DisconnectedComponents);
    };
    let Some(end_node) = nav_mesh.zones[end_zone as usize].level1_node else {
        return Err(PathfindError::DisconnectedComponents);
    };

    let result = a_star(
        nav_mesh.level1.as_slice(),
        start_node,
        &[end_node],
        &AStarOptions::new(),
    )
    .map_err(|_| PathfindError::DisconnectedComponents)?;

    Ok(result.path)
}

/// End-position refinement: if the path has >= 2 nodes and the
/// penultimate-to-target distance is shorter than the last edge, the last
/// node is dropped (it would overshoot). A synthetic node carrying the
/// exact end position is then appended.
fn refine_end_position(path: &mut Vec<PathNode>, end_pos: Option<Vec3>) {
    let Some(end_pos) = end_pos else {
        return;
    };

    if path.len() >= 2 {
        let last = path[path.len() - 1].pos;
        let penultimate = path[path.len() - 2].pos;
        if end_pos.distance(penultimate) < last.distance(penultimate) {
            path.pop();
        }
    }

    let normal = path.last().map(|n| n.normal).unwrap_or(Vec3::Y);
    path.push(PathNode {
        node_ref: None,
        pos: end_pos,
        normal,
        clearance: path.last().map(|n| n.clearance).unwrap_or(0.0),
    });
}

impl NodeRef {
    fn from_level(level: u8, index: u32) -> Self {
        if level == 0 {
            NodeRef::Level0(index)
        } else {
            NodeRef::Level1(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_drops_overshooting_last_node() {
        let mut path = vec![
            PathNode {
                node_ref: Some(NodeRef::Level0(0)),
                pos: Vec3::new(0.0, 0.0, 0.0),
                normal: Vec3::Y,
                clearance: 2.0,
            },
            PathNode {
                node_ref: Some(NodeRef::Level0(1)),
                pos: Vec3::new(1.0, 0.0, 0.0),
                normal: Vec3::Y,
                clearance: 2.0,
            },
            PathNode {
                node_ref: Some(NodeRef::Level0(2)),
                pos: Vec3::new(2.0, 0.0, 0.0),
                normal: Vec3::Y,
                clearance: 2.0,
            },
        ];

        refine_end_position(&mut path, Some(Vec3::new(1.6, 0.0, 0.0)));

        assert_eq!(path.len(), 3);
        assert_eq!(path[0].pos, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(path[1].pos, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(path[2].pos, Vec3::new(1.6, 0.0, 0.0));
        assert!(path[2].node_ref.is_none());
    }

    #[test]
    fn refinement_keeps_last_node_when_not_overshooting() {
        let mut path = vec![
            PathNode {
                node_ref: Some(NodeRef::Level0(0)),
                pos: Vec3::new(0.0, 0.0, 0.0),
                normal: Vec3::Y,
                clearance: 2.0,
            },
            PathNode {
                node_ref: Some(NodeRef::Level0(1)),
                pos: Vec3::new(1.0, 0.0, 0.0),
                normal: Vec3::Y,
                clearance: 2.0,
            },
        ];

        refine_end_position(&mut path, Some(Vec3::new(5.0, 0.0, 0.0)));

        assert_eq!(path.len(), 3);
        assert_eq!(path[1].pos, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(path[2].pos, Vec3::new(5.0, 0.0, 0.0));
    }
}
