//! Connected-component labelling under a dual predicate: same clearance
//! bucket, and within a bounded radius of the component's seed vertex.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One maximal connected region of the walkable surface sharing a
/// clearance bucket within `zone_radius` of its seed vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub members: Vec<u32>,
    pub clearance_floor: f32,
    /// Index of the seed vertex this zone was grown from.
    pub seed: u32,
    /// Lazily computed on first access via [`Zone::centroid`].
    centroid: Option<Vec3>,
    /// Level-1 node index for this zone's centroid, filled in by the graph
    /// builder once level-1 indices are allocated.
    pub level1_node: Option<u32>,
}

impl Zone {
    pub fn centroid(&mut self, positions: &[Vec3]) -> Vec3 {
        if let Some(c) = self.centroid {
            return c;
        }
        let sum: Vec3 = self.members.iter().map(|&i| positions[i as usize]).sum();
        let c = sum / self.members.len() as f32;
        self.centroid = Some(c);
        c
    }
}

#[inline]
fn bucket(height: f32, bucket_size: f32, bucket_cap: f32) -> i64 {
    (height.min(bucket_cap) / bucket_size).floor() as i64
}

/// Result of partitioning: a dense zone id per vertex, plus the zones
/// themselves.
pub struct Partition {
    pub zone_of: Vec<u32>,
    pub zones: Vec<Zone>,
}

/// Partitions `positions`/`neighbours`/`clearance` into zones. The radius
/// check is evaluated against each component's *seed* vertex, not the
/// current BFS frontier — this bounds zone diameter but can still produce
/// elongated zones depending on traversal order, since a vertex far from
/// the frontier but still within radius of the seed is admitted.
pub fn partition(
    positions: &[Vec3],
    neighbours: &[Vec<u32>],
    clearance: &[f32],
    bucket_size: f32,
    bucket_cap: f32,
    zone_radius: f32,
) -> Partition {
    let n = positions.len();
    let mut zone_of = vec![u32::MAX; n];
    let mut zones = Vec::new();
    let radius_sq = zone_radius * zone_radius;

    for seed in 0..n {
        if zone_of[seed] != u32::MAX {
            continue;
        }

        let zone_id = zones.len() as u32;
        let seed_bucket = bucket(clearance[seed], bucket_size, bucket_cap);
        let seed_pos = positions[seed];

        let mut members = Vec::new();
        let mut queue = VecDeque::new();
        zone_of[seed] = zone_id;
        queue.push_back(seed);

        while let Some(v) = queue.pop_front() {
            members.push(v as u32);

            for &w in &neighbours[v] {
                let w = w as usize;
                if zone_of[w] != u32::MAX {
                    continue;
                }
                if bucket(clearance[w], bucket_size, bucket_cap) != seed_bucket {
                    continue;
                }
                if positions[w].distance_squared(seed_pos) > radius_sq {
                    continue;
                }
                zone_of[w] = zone_id;
                queue.push_back(w);
            }
        }

        let clearance_floor = seed_bucket as f32 * bucket_size;

        zones.push(Zone {
            id: zone_id,
            members,
            clearance_floor,
            seed: seed as u32,
            centroid: None,
            level1_node: None,
        });
    }

    Partition { zone_of, zones }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> (Vec<Vec3>, Vec<Vec<u32>>) {
        let positions: Vec<Vec3> = (0..n).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let neighbours: Vec<Vec<u32>> = (0..n)
            .map(|i| {
                let mut v = Vec::new();
                if i > 0 {
                    v.push((i - 1) as u32);
                }
                if i + 1 < n {
                    v.push((i + 1) as u32);
                }
                v
            })
            .collect();
        (positions, neighbours)
    }

    #[test]
    fn uniform_clearance_single_zone_within_radius() {
        let (positions, neighbours) = chain(5);
        let clearance = vec![2.0; 5];

        let p = partition(&positions, &neighbours, &clearance, 0.5, 10.0, 10.0);

        assert_eq!(p.zones.len(), 1);
        assert!(p.zone_of.iter().all(|&z| z == 0));
    }

    #[test]
    fn different_buckets_split_into_separate_zones() {
        let (positions, neighbours) = chain(4);
        let clearance = vec![2.0, 2.0, 0.1, 0.1];

        let p = partition(&positions, &neighbours, &clearance, 0.5, 10.0, 10.0);

        assert_eq!(p.zones.len(), 2);
        assert_eq!(p.zone_of[0], p.zone_of[1]);
        assert_eq!(p.zone_of[2], p.zone_of[3]);
        assert_ne!(p.zone_of[0], p.zone_of[2]);
    }

    #[test]
    fn zone_radius_bounds_diameter_from_seed() {
        let (positions, neighbours) = chain(5);
        let clearance = vec![2.0; 5];

        // Radius 1.5 from seed 0: vertices within 1.5 units of x=0 are
        // admitted (0, 1), so the BFS must start a new zone at vertex 2.
        let p = partition(&positions, &neighbours, &clearance, 0.5, 10.0, 1.5);

        assert!(p.zones.len() >= 2);
        assert_eq!(p.zone_of[0], p.zone_of[1]);
    }

    #[test]
    fn every_vertex_gets_a_zone() {
        let (positions, neighbours) = chain(7);
        let clearance: Vec<f32> = (0..7).map(|i| i as f32 * 0.4).collect();

        let p = partition(&positions, &neighbours, &clearance, 0.5, 10.0, 10.0);

        assert!(p.zone_of.iter().all(|&z| z != u32::MAX));
    }
}
