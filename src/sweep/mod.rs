//! Sweep-ordering pipeline: relationships → local order → task graph →
//! SPDS.

pub mod local_order;
pub mod relationships;
pub mod spds;
pub mod task_graph;

pub use spds::{PredecessorSlot, Spds, Spls, Stdg, create_sweep_order};
