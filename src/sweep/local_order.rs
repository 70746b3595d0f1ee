//! Local sweep ordering: cells of this rank, one direction.
//!
//! Builds the cell graph from the relationship snapshot, strips local
//! cycles when permitted, and topologically sorts what remains into the
//! SPLS: the order this rank must walk its cells so every surviving
//! upwind dependency is satisfied before a cell is processed.

use log::{debug, error};

use super::relationships::CellRelationships;
use super::spds::Spls;
use crate::graph::DirectedGraph;
use crate::graph::cycle_removal::remove_cyclic_dependencies;
use crate::sweep_error::SweepError;

/// Computes the SPLS and the list of locally removed cyclic edges.
///
/// A still-cyclic graph after (or without) cycle removal has no valid
/// sweep order; that surfaces as [`SweepError::CyclicLocalOrdering`] and
/// the caller decides whether the job dies.
pub fn order_local_cells(
    relationships: &CellRelationships,
    allow_cycles: bool,
) -> Result<(Spls, Vec<(usize, usize)>), SweepError> {
    let num_cells = relationships.cell_successors.len();

    let mut graph = DirectedGraph::new();
    for _ in 0..num_cells {
        graph.add_vertex();
    }
    for (c, successors) in relationships.cell_successors.iter().enumerate() {
        for (&nbr, &weight) in successors {
            graph.add_edge(c, nbr, weight)?;
        }
    }

    let mut cyclic_edges = Vec::new();
    if allow_cycles && !graph.find_strongly_connected_components().is_empty() {
        debug!("removing local sweep cycles");
        cyclic_edges = remove_cyclic_dependencies(&mut graph)?;
    }

    let order = graph.generate_topological_sort();
    if order.is_empty() && num_cells > 0 {
        error!("cyclic local sweep ordering detected");
        return Err(SweepError::CyclicLocalOrdering);
    }

    Ok((Spls { item_id: order }, cyclic_edges))
}
