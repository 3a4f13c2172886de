//! Public query surface: `find_closest_node`, `find_full_path`,
//! `find_path_sections`, `find_random_path`. Pathfinding is exposed through
//! a dedicated `query` module that takes the built nav-mesh as a plain
//! argument rather than hiding it behind interior mutability.

use glam::Vec3;

use crate::driver::{self, HighLevelPath, LowLevelPath, PathOptions, PathSections};
use crate::error::PathfindError;
use crate::NavMesh;

/// Opaque handle to a level-0 node, returned by [`find_closest_node`] and
/// accepted by every query function in this module.
pub type NodeId = u32;

/// Finds the level-0 node closest to `pos`.
pub fn find_closest_node(nav_mesh: &NavMesh, pos: Vec3) -> Result<NodeId, PathfindError> {
    nav_mesh
        .spatial_index
        .nearest(pos)
        .map(|i| i as u32)
        .ok_or(PathfindError::NoNodeNearPosition)
}

/// Full batch path from `start` to `end`, computed eagerly.
pub fn find_full_path(
    nav_mesh: &NavMesh,
    start: NodeId,
    end: NodeId,
) -> Result<(HighLevelPath, LowLevelPath), PathfindError> {
    driver::find_full_path(nav_mesh, start, end, &PathOptions::default())
}

/// Stepwise (lazy iterator) path delivery, one zone segment per `next()`.
pub fn find_path_sections(
    nav_mesh: &NavMesh,
    start: NodeId,
    end: NodeId,
    options: PathOptions,
) -> PathSections<'_> {
    PathSections::new(nav_mesh, start, end, options)
}

/// Picks two random level-0 nodes and finds a path between them. For ad-hoc
/// test-harness use only — not reproducible, and not meant to be.
pub fn find_random_path(nav_mesh: &NavMesh) -> Result<(HighLevelPath, LowLevelPath), PathfindError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let len = nav_mesh.level0.len();
    if len == 0 {
        return Err(PathfindError::NoNodeNearPosition);
    }

    // A tiny xorshift seeded from the clock. The crate carries no `rand`
    // dependency for the sake of one convenience helper that exists purely
    // for manual test-harness use.
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E3779B97F4A7C15)
        | 1;
    let mut state = seed;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let start = (next() as usize) % len;
    let end = (next() as usize) % len;

    find_full_path(nav_mesh, start as u32, end as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_adapter::VertexRecord;
    use crate::BuildSettings;

    fn line_mesh(n: usize) -> Vec<VertexRecord> {
        (0..n)
            .map(|i| {
                let mut neighbours = Vec::new();
                if i > 0 {
                    neighbours.push((i - 1) as u32);
                }
                if i + 1 < n {
                    neighbours.push((i + 1) as u32);
                }
                VertexRecord::new(i as u32, Vec3::new(i as f32, 0.0, 0.0), Vec3::Y, neighbours)
            })
            .collect()
    }

    #[test]
    fn find_closest_node_returns_nearest_vertex() {
        let mesh = line_mesh(5);
        let nav_mesh = NavMesh::build(&mesh, vec![2.0; 5], &BuildSettings::default()).unwrap();

        let node = find_closest_node(&nav_mesh, Vec3::new(2.6, 0.0, 0.0)).unwrap();
        assert_eq!(node, 3);
    }

    #[test]
    fn find_closest_node_on_empty_mesh_errors() {
        let mesh: Vec<VertexRecord> = Vec::new();
        let nav_mesh = NavMesh::build(&mesh, Vec::new(), &BuildSettings::default()).unwrap();

        let err = find_closest_node(&nav_mesh, Vec3::ZERO).unwrap_err();
        assert!(matches!(err, PathfindError::NoNodeNearPosition));
    }

    #[test]
    fn find_random_path_on_single_node_mesh_is_trivial() {
        let mesh = line_mesh(1);
        let nav_mesh = NavMesh::build(&mesh, vec![2.0; 1], &BuildSettings::default()).unwrap();

        let (_, low) = find_random_path(&nav_mesh).unwrap();
        assert_eq!(low.len(), 1);
    }
}
