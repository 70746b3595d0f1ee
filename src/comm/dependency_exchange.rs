//! Broadcast round giving every rank the full dependency table.
//!
//! Each rank knows only its own upwind locations; before the task
//! dependency graph can be built, every rank needs every other rank's
//! list. Roots take turns in increasing rank order, each broadcasting a
//! count record and then the list itself: two fixed-shape collective
//! calls per root, issued in identical order on all ranks.

use bytemuck::Zeroable;

use super::wire::{WireCount, WireRank, cast_slice_mut};
use super::RankExchange;
use crate::mesh::PartitionId;
use crate::sweep_error::SweepError;

/// Collects `global_dependencies[loc]` = the dependency list of rank
/// `loc`, for every `loc`, by a count-then-data broadcast per root.
pub fn exchange_rank_dependencies<E: RankExchange>(
    exchange: &E,
    own_dependencies: &[PartitionId],
) -> Result<Vec<Vec<PartitionId>>, SweepError> {
    let num_ranks = exchange.size();
    let my_rank = exchange.rank();

    let mut global_dependencies: Vec<Vec<PartitionId>> = Vec::with_capacity(num_ranks);
    for root in 0..num_ranks {
        let mut count = if root == my_rank {
            WireCount::new(own_dependencies.len())
        } else {
            WireCount::zeroed()
        };
        exchange.broadcast(root, cast_slice_mut(std::slice::from_mut(&mut count)))?;

        let mut list = if root == my_rank {
            own_dependencies.iter().map(|&d| WireRank::of(d)).collect()
        } else {
            vec![WireRank::zeroed(); count.get()]
        };
        exchange.broadcast(root, cast_slice_mut(&mut list))?;

        global_dependencies.push(list.iter().map(|r| r.get()).collect());
    }

    Ok(global_dependencies)
}
