//! Rank-level task dependency graph (TDG) and sweep-plane levels.
//!
//! Every rank builds the same P-vertex graph from the exchanged
//! dependency table and runs the same deterministic cycle removal on it,
//! so all ranks agree on the broken edges and the level structure without
//! further communication. Iteration anywhere in this module must stay
//! order-stable; a single divergent tie-break would desynchronize the
//! job's communication pattern.

use log::{debug, error};

use super::spds::Stdg;
use crate::graph::DirectedGraph;
use crate::graph::cycle_removal::remove_cyclic_dependencies;
use crate::mesh::PartitionId;
use crate::sweep_error::SweepError;

/// Outcome of the global ordering: the level structure plus the edges cut
/// to break rank-level cycles (every rank's view, not only the local one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOrdering {
    pub global_sweep_planes: Vec<Stdg>,
    pub removed_edges: Vec<(PartitionId, PartitionId)>,
}

/// Builds the TDG from the exchanged dependency table, strips cross-rank
/// cycles when permitted, and groups ranks into sweep-plane levels.
pub fn build_task_dependency_graph(
    global_dependencies: &[Vec<PartitionId>],
    allow_cycles: bool,
) -> Result<TaskOrdering, SweepError> {
    let num_ranks = global_dependencies.len();

    debug!("building task dependency graph over {num_ranks} rank(s)");
    let mut tdg = DirectedGraph::new();
    for _ in 0..num_ranks {
        tdg.add_vertex();
    }
    for (loc, deps) in global_dependencies.iter().enumerate() {
        for &dep in deps {
            tdg.add_edge(dep, loc, 0.0)?;
        }
    }

    let mut removed_edges = Vec::new();
    if allow_cycles && !tdg.find_strongly_connected_components().is_empty() {
        debug!("removing cross-rank sweep cycles");
        removed_edges = remove_cyclic_dependencies(&mut tdg)?;
    }

    let order = tdg.generate_topological_sort();
    if order.is_empty() && num_ranks > 0 {
        error!("cyclic global sweep ordering detected");
        return Err(SweepError::CyclicGlobalOrdering);
    }

    // Level assignment over the REMAINING edges: no-dependency ranks sit
    // at level 0, every other rank one past its deepest dependency.
    // Ranks inside one level have no surviving ordering constraint among
    // themselves and may run concurrently for this direction.
    let mut level = vec![0usize; num_ranks];
    let mut max_level = 0usize;
    for &loc in &order {
        let deepest = tdg.predecessors(loc).map(|dep| level[dep]).max();
        if let Some(d) = deepest {
            level[loc] = d + 1;
            max_level = max_level.max(level[loc]);
        }
    }

    let mut global_sweep_planes = vec![Stdg::default(); max_level + 1];
    for &loc in &order {
        global_sweep_planes[level[loc]].item_id.push(loc);
    }

    Ok(TaskOrdering {
        global_sweep_planes,
        removed_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_ranks_share_level_zero() {
        let deps: Vec<Vec<PartitionId>> = vec![vec![], vec![], vec![]];
        let ordering = build_task_dependency_graph(&deps, false).unwrap();
        assert_eq!(ordering.global_sweep_planes.len(), 1);
        assert_eq!(ordering.global_sweep_planes[0].item_id, vec![0, 1, 2]);
        assert!(ordering.removed_edges.is_empty());
    }

    #[test]
    fn chain_of_ranks_forms_one_level_each() {
        // 0 -> 1 -> 2
        let deps: Vec<Vec<PartitionId>> = vec![vec![], vec![0], vec![1]];
        let ordering = build_task_dependency_graph(&deps, false).unwrap();
        let planes: Vec<Vec<PartitionId>> = ordering
            .global_sweep_planes
            .iter()
            .map(|p| p.item_id.clone())
            .collect();
        assert_eq!(planes, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn diamond_levels() {
        // 0 feeds 1 and 2; both feed 3
        let deps: Vec<Vec<PartitionId>> = vec![vec![], vec![0], vec![0], vec![1, 2]];
        let ordering = build_task_dependency_graph(&deps, false).unwrap();
        let planes: Vec<Vec<PartitionId>> = ordering
            .global_sweep_planes
            .iter()
            .map(|p| p.item_id.clone())
            .collect();
        assert_eq!(planes, vec![vec![0], vec![1, 2], vec![3]]);
    }

    #[test]
    fn mutual_dependency_without_allowance_is_fatal() {
        let deps: Vec<Vec<PartitionId>> = vec![vec![1], vec![0]];
        assert_eq!(
            build_task_dependency_graph(&deps, false).unwrap_err(),
            SweepError::CyclicGlobalOrdering
        );
    }

    #[test]
    fn mutual_dependency_is_broken_into_levels() {
        let deps: Vec<Vec<PartitionId>> = vec![vec![1], vec![0]];
        let ordering = build_task_dependency_graph(&deps, true).unwrap();
        assert_eq!(ordering.removed_edges.len(), 1);
        let total: usize = ordering
            .global_sweep_planes
            .iter()
            .map(|p| p.item_id.len())
            .sum();
        assert_eq!(total, 2);
        assert_eq!(ordering.global_sweep_planes.len(), 2);
    }

    #[test]
    fn ordering_is_deterministic() {
        let deps: Vec<Vec<PartitionId>> = vec![vec![1, 2], vec![2], vec![0]];
        let a = build_task_dependency_graph(&deps, true).unwrap();
        let b = build_task_dependency_graph(&deps, true).unwrap();
        assert_eq!(a, b);
    }
}
