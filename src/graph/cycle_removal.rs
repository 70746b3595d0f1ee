//! Cyclic-dependency removal shared by the local and global orderers.
//!
//! Non-convex meshes (and some partitionings) can close dependency loops
//! for a given sweep direction. Before a topological order exists, those
//! loops must be cut: every removed edge becomes a "cyclic" (local case)
//! or "delayed" (rank-level case) dependency that the sweep executor
//! services through buffered, order-independent transfers instead of the
//! default ordered exchange.

use log::debug;

use super::DirectedGraph;
use crate::sweep_error::SweepError;

/// Strips edges until no strongly connected component remains, returning
/// the removed edges in removal order.
///
/// The first pass handles each component by size: a 2-cycle loses its
/// front-to-back edge, a 3-cycle loses the first in-component edge found,
/// and anything larger is re-indexed into a scratch subgraph whose
/// approximate minimum-FAS ordering decides which edges are backward and
/// therefore cut. Later passes (in case any component survives the
/// first) fall back to cutting one in-component edge per component until
/// none remain. Every pass strictly reduces the edge count, so
/// termination is guaranteed.
pub fn remove_cyclic_dependencies(
    graph: &mut DirectedGraph,
) -> Result<Vec<(usize, usize)>, SweepError> {
    let mut removed: Vec<(usize, usize)> = Vec::new();

    let mut sccs = graph.find_strongly_connected_components();
    let mut pass = 0usize;
    while !sccs.is_empty() {
        pass += 1;
        debug!("cyclic dependency removal, pass {pass}: {} component(s)", sccs.len());

        for component in &mut sccs {
            component.sort_unstable();
            if pass > 1 {
                remove_any_cycle_edge(graph, component, &mut removed)?;
            } else if component.len() == 2 {
                graph.remove_edge(component[0], component[1])?;
                removed.push((component[0], component[1]));
            } else if component.len() == 3 {
                remove_any_cycle_edge(graph, component, &mut removed)?;
            } else {
                remove_by_min_fas(graph, component, &mut removed)?;
            }
        }

        sccs = graph.find_strongly_connected_components();
    }

    Ok(removed)
}

/// Cuts the first edge found between two members of `component`.
fn remove_any_cycle_edge(
    graph: &mut DirectedGraph,
    component: &[usize],
    removed: &mut Vec<(usize, usize)>,
) -> Result<(), SweepError> {
    for &u in component {
        let hit = graph.successors(u).find(|v| component.contains(v));
        if let Some(v) = hit {
            graph.remove_edge(u, v)?;
            removed.push((u, v));
            return Ok(());
        }
    }
    Ok(())
}

/// Re-indexes `component` into a scratch graph, orders it with the
/// approximate minimum-FAS heuristic, and cuts every edge whose target
/// precedes its source in that order.
fn remove_by_min_fas(
    graph: &mut DirectedGraph,
    component: &[usize],
    removed: &mut Vec<(usize, usize)>,
) -> Result<(), SweepError> {
    let mut scratch = DirectedGraph::new();
    for _ in 0..component.len() {
        scratch.add_vertex();
    }

    // component is sorted, so position lookup by binary search
    let local_of = |v: usize| component.binary_search(&v).ok();

    let mut sub_edges: Vec<(usize, usize)> = Vec::new();
    for (lu, &u) in component.iter().enumerate() {
        for v in graph.successors(u).collect::<Vec<_>>() {
            if let Some(lv) = local_of(v) {
                let w = graph.edge_weight(u, v).unwrap_or_default();
                scratch.add_edge(lu, lv, w)?;
                sub_edges.push((lu, lv));
            }
        }
    }

    let sequence = scratch.find_approx_minimum_fas();
    let mut position = vec![0usize; sequence.len()];
    for (pos, &v) in sequence.iter().enumerate() {
        position[v] = pos;
    }

    for (lu, lv) in sub_edges {
        if position[lv] < position[lu] {
            let (u, v) = (component[lu], component[lv]);
            graph.remove_edge(u, v)?;
            removed.push((u, v));
        }
    }
    Ok(())
}
