//! Error taxonomy for build-time and query-time failures.

/// Errors raised while constructing a [`crate::NavMesh`](crate::NavMesh) from
/// raw vertex/clearance data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// `height` did not have one entry per vertex.
    #[error("clearance array has {got} entries, expected {expected} (one per vertex)")]
    ClearanceLengthMismatch { expected: usize, got: usize },

    /// A vertex referenced a neighbour index that doesn't exist.
    #[error("vertex {vertex} references unknown neighbour {neighbour}")]
    UnknownNeighbour { vertex: u32, neighbour: u32 },

    /// `VertexRecord::index` did not equal its position in the vertex
    /// slice. The builder relies on `index == position` to use it directly
    /// as an array index.
    #[error("vertex at position {position} has index {index}, expected {position} (indices must be dense and zero-based)")]
    NonDenseVertexIndex { position: usize, index: u32 },

    /// A vertex listed itself as its own neighbour.
    #[error("vertex {0} lists itself as a neighbour")]
    SelfLoop(u32),

    /// A builder-internal invariant was violated (entrance disconnected,
    /// asymmetric neighbour relation, etc). Only raised in release builds;
    /// debug builds `debug_assert!` instead.
    #[error("nav-mesh invariant violated: {0}")]
    InvariantViolation(String),
}

/// Errors raised by path queries against an already-built [`crate::NavMesh`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PathfindError {
    /// The search exhausted its open set (or a downstream per-zone segment
    /// did) without reaching any acceptable target.
    #[error("no path exists to any of the requested targets")]
    Unreachable,

    /// No vertex was found within the search radius of a queried position.
    #[error("no nav-mesh node found near the requested position")]
    NoNodeNearPosition,

    /// `end_nodes` was empty, or every end node was filtered out by
    /// `min_height`.
    #[error("end node list is empty (or all end nodes were below min_height)")]
    NoValidEndNodes,

    /// `start` and `end` live in level-1 components that aren't connected,
    /// so no amount of searching will find a path.
    #[error("start and end nodes are in disconnected parts of the nav-mesh")]
    DisconnectedComponents,

    /// The optional `max_expansions` guard was exceeded.
    #[error("search exceeded the configured expansion budget")]
    ExpansionBudgetExceeded,
}
