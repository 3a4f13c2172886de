//! The external contract a caller implements to hand the builder a walkable
//! surface mesh. Not implemented here — mesh authoring, import and geometry
//! processing are out of scope.

use glam::Vec3;

/// One walkable vertex of the input mesh, as handed to
/// [`crate::NavMesh::build`](crate::NavMesh::build).
///
/// Implementations MUST be idempotent: reading the same source twice must
/// yield identical `VertexRecord`s in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRecord {
    /// Stable index, unique within the vertex stream.
    pub index: u32,
    /// World-space position.
    pub pos: Vec3,
    /// Surface normal, possibly zero if unavailable.
    pub normal: Vec3,
    /// Indices of other vertices linked to this one by a mesh edge.
    pub neighbours: Vec<u32>,
}

impl VertexRecord {
    pub fn new(index: u32, pos: Vec3, normal: Vec3, neighbours: Vec<u32>) -> Self {
        Self {
            index,
            pos,
            normal,
            neighbours,
        }
    }
}

/// A source of walkable-mesh data. Degree is bounded only by the mesh
/// itself; the adapter is a pure external collaborator — the core never
/// imports, visualises, or otherwise interprets geometry beyond this.
pub trait MeshSource {
    /// Vertices in stable index order. `vertices()[i].index` must equal `i`
    /// — the builder uses `index` directly as the array position when
    /// resolving neighbour references, so a dense, zero-based numbering is
    /// required, not just recommended. [`crate::NavMesh::build`] rejects
    /// any mesh that violates this.
    fn vertices(&self) -> &[VertexRecord];
}

impl MeshSource for Vec<VertexRecord> {
    fn vertices(&self) -> &[VertexRecord] {
        self
    }
}

impl MeshSource for [VertexRecord] {
    fn vertices(&self) -> &[VertexRecord] {
        self
    }
}
