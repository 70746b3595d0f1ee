//! # sweep-order
//!
//! sweep-order is a parallel sweep-ordering library for discrete-ordinates
//! radiation-transport codes. Given a rank-local view of a distributed
//! mesh and an angular direction, it computes the order in which this rank
//! must process its cells (the SPLS), detects and breaks cyclic
//! dependencies introduced by mesh non-convexity, and builds the
//! rank-level task dependency graph that governs how partial-sweep
//! messages flow between processes. All of it is bundled per direction
//! into a Sweep Plane Data Structure (SPDS).
//!
//! ## Features
//! - General directed graph with Tarjan SCC detection, Kahn topological
//!   sorting, and an approximate minimum feedback-arc-set heuristic
//! - Face classification and cell/rank relationship extraction from grid
//!   geometry
//! - Deterministic cycle removal at both cell and rank level, with broken
//!   edges recorded for delayed (buffered, order-independent) exchange
//! - Pluggable collective backends (serial, in-process threads, MPI) so
//!   the ordering algorithms run and test without a launcher
//!
//! ## Determinism
//!
//! Every rank re-runs the global ordering on identical broadcast data, so
//! all iteration in this crate is over ordered containers and all
//! tie-breaks are explicit. Two runs on the same input produce identical
//! SPLS, delayed lists, and sweep-plane levels.
//!
//! ## Usage
//! Add `sweep-order` as a dependency and enable `mpi-support` for real
//! multi-process jobs:
//!
//! ```toml
//! [dependencies]
//! sweep-order = "0.1"
//! # features = ["mpi-support"]
//! ```

pub mod comm;
pub mod graph;
pub mod mesh;
pub mod sweep;
pub mod sweep_error;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::comm::MpiExchange;
    pub use crate::comm::RankExchange;
    pub use crate::comm::dependency_exchange::exchange_rank_dependencies;
    pub use crate::comm::{LocalExchange, SerialExchange};
    pub use crate::graph::DirectedGraph;
    pub use crate::graph::cycle_removal::remove_cyclic_dependencies;
    pub use crate::mesh::{Cell, CellFace, FaceNeighbor, LocalGrid, PartitionId, Vector3};
    pub use crate::sweep::relationships::{CellRelationships, FaceOrientation};
    pub use crate::sweep::{PredecessorSlot, Spds, Spls, Stdg, create_sweep_order};
    pub use crate::sweep_error::SweepError;
}
