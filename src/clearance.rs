//! Clearance smoothing over an already-measured per-vertex array.
//!
//! The core does not measure clearance itself — that's an external
//! collaborator's job (e.g. a ray-cast against an enclosing shell). This
//! module only owns the optional smoothing pass, since that pass is part
//! of the graph-build pipeline proper (it runs before zone partitioning
//! sees the values).

use glam::Vec3;

/// Smooths a per-vertex clearance array in place: each value is replaced
/// with the minimum clearance of any vertex within `radius` world units
/// (including itself). Idempotent under repeated application with the
/// same `radius` — running it twice in a row is a no-op on the second
/// pass, since every value already equals the min over its neighbourhood.
///
/// A `radius` of `0.0` disables smoothing (each vertex keeps its own
/// value), matching the `smooth_radius = 0` convention in
/// [`crate::BuildSettings`].
pub fn smooth_clearance(positions: &[Vec3], clearance: &mut [f32], radius: f32) {
    debug_assert_eq!(positions.len(), clearance.len());

    if radius <= 0.0 || positions.is_empty() {
        return;
    }

    let index = crate::spatial_index::SpatialIndex::build(positions);
    let smoothed: Vec<f32> = (0..positions.len())
        .map(|i| {
            index
                .ball(positions[i], radius)
                .into_iter()
                .map(|j| clearance[j])
                .fold(clearance[i], f32::min)
        })
        .collect();

    clearance.copy_from_slice(&smoothed);
}
