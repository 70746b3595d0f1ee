//! SweepError: unified error type for sweep-order public APIs
//!
//! All public APIs return `Result` instead of terminating the process;
//! a parallel driver that cannot continue after a cyclic-ordering error
//! is expected to abort the job itself after logging.

use thiserror::Error;

/// Unified error type for sweep-ordering operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// The local cell graph is still cyclic after (or without) cycle removal.
    /// No valid sweep order exists for this direction on this rank.
    #[error("cyclic local sweep ordering detected; cycles must be allowed by the calling application")]
    CyclicLocalOrdering,
    /// The rank-level task dependency graph is still cyclic after (or
    /// without) cycle removal.
    #[error("cyclic global sweep ordering detected; cycles must be allowed by the calling application")]
    CyclicGlobalOrdering,
    /// An edge removal was requested for an edge that is not in the graph.
    #[error("graph edge {0} -> {1} does not exist")]
    MissingEdge(usize, usize),
    /// A vertex index was out of range or referred to a removed vertex.
    #[error("graph vertex {0} is out of range or has been removed")]
    InvalidVertex(usize),
    /// A face claims a local neighbor the grid has no local index for.
    #[error("face neighbor cell {0} is marked local but has no local index")]
    MissingLocalNeighbor(u64),
    /// A location id was looked up that is neither a (delayed) dependency
    /// nor a successor of this rank.
    #[error("location {0} is not a dependency or successor of this rank")]
    UnknownLocation(usize),
    /// A collective exchange failed or was called with mismatched buffers.
    #[error("communication failure at broadcast root {root}: {reason}")]
    CommError { root: usize, reason: String },
}
