//! SPDS: the per-direction Sweep Plane Data Structure.
//!
//! One SPDS is built per distinct (polar, azimuthal) direction at solve
//! setup and reused, immutable, for every sweep iteration over that
//! direction. It bundles the local cell order (SPLS), the rank-level
//! level structure, and the dependency/successor bookkeeping, including
//! the *delayed* entries whose communication edge was cut to break a
//! rank-level cycle and which must therefore be serviced by buffered,
//! order-independent transfers at execution time.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::local_order::order_local_cells;
use super::relationships::{FaceOrientation, populate_cell_relationships};
use super::task_graph::build_task_dependency_graph;
use crate::comm::RankExchange;
use crate::comm::dependency_exchange::exchange_rank_dependencies;
use crate::mesh::{LocalGrid, PartitionId, Vector3};
use crate::sweep_error::SweepError;

/// Sweep-Plane Local Subgrid: the ordered local cell ids for one
/// direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spls {
    pub item_id: Vec<usize>,
}

/// One level of the global sweep-plane structure: the ranks that may run
/// concurrently once every earlier level has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stdg {
    pub item_id: Vec<PartitionId>,
}

/// Where an upwind location sits in this rank's receive bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredecessorSlot {
    /// Index into the ordered dependency list.
    Ordered(usize),
    /// Index into the delayed dependency list (cycle-broken edge).
    Delayed(usize),
}

/// Sweep Plane Data Structure for one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Spds {
    polar: f64,
    azimuthal: f64,
    omega: Vector3,
    grid: Arc<LocalGrid>,
    /// Ordered local cell ids for this rank and direction.
    pub spls: Spls,
    /// Local cell-graph edges removed to break local cycles.
    pub local_cyclic_dependencies: Vec<(usize, usize)>,
    /// Upwind partition ids serviced by the default ordered exchange.
    pub location_dependencies: Vec<PartitionId>,
    /// Downwind partition ids serviced by the default ordered exchange.
    pub location_successors: Vec<PartitionId>,
    /// Upwind partition ids whose edge was cycle-broken.
    pub delayed_location_dependencies: Vec<PartitionId>,
    /// Downwind partition ids whose edge was cycle-broken.
    pub delayed_location_successors: Vec<PartitionId>,
    /// Rank levels in dependency order.
    pub global_sweep_planes: Vec<Stdg>,
    /// Orientation of every face of every local cell for this direction.
    pub cell_face_orientations: Vec<Vec<FaceOrientation>>,
}

impl Spds {
    pub fn polar(&self) -> f64 {
        self.polar
    }

    pub fn azimuthal(&self) -> f64 {
        self.azimuthal
    }

    /// Unit direction vector ω derived from the angle pair.
    pub fn omega(&self) -> Vector3 {
        self.omega
    }

    pub fn grid(&self) -> &Arc<LocalGrid> {
        &self.grid
    }

    /// Maps an upwind location id to its slot in the ordered or delayed
    /// dependency list.
    pub fn map_location_to_predecessor(
        &self,
        location: PartitionId,
    ) -> Result<PredecessorSlot, SweepError> {
        if let Some(i) = self
            .location_dependencies
            .iter()
            .position(|&d| d == location)
        {
            return Ok(PredecessorSlot::Ordered(i));
        }
        if let Some(i) = self
            .delayed_location_dependencies
            .iter()
            .position(|&d| d == location)
        {
            return Ok(PredecessorSlot::Delayed(i));
        }
        Err(SweepError::UnknownLocation(location))
    }

    /// Maps a downwind location id to its slot in the successor list.
    pub fn map_location_to_successor(
        &self,
        location: PartitionId,
    ) -> Result<usize, SweepError> {
        self.location_successors
            .iter()
            .position(|&s| s == location)
            .ok_or(SweepError::UnknownLocation(location))
    }
}

/// Develops the full sweep ordering for one direction.
///
/// Pipeline: classify faces and derive relationships, order local cells
/// (breaking local cycles if `allow_cycles`), exchange per-rank
/// dependency lists, build and order the rank-level task graph (breaking
/// cross-rank cycles if `allow_cycles`), then translate every broken
/// rank edge into delayed bookkeeping. Collective: every rank must call
/// this with the same direction and `allow_cycles`. A barrier at the end
/// keeps any rank from sweeping before all ranks hold their SPDS.
pub fn create_sweep_order<E: RankExchange>(
    polar: f64,
    azimuthal: f64,
    grid: Arc<LocalGrid>,
    exchange: &E,
    allow_cycles: bool,
) -> Result<Spds, SweepError> {
    let my_rank = exchange.rank();
    debug_assert_eq!(grid.partition(), my_rank);

    let omega = Vector3::from_angles(polar, azimuthal);
    if my_rank == 0 {
        debug!("developing sweep ordering for omega = {omega}");
    }

    let relationships = populate_cell_relationships(&grid, omega)?;
    let (spls, local_cyclic_dependencies) = order_local_cells(&relationships, allow_cycles)?;

    let mut location_dependencies: Vec<PartitionId> =
        relationships.location_dependencies.iter().copied().collect();
    let location_successors: Vec<PartitionId> =
        relationships.location_successors.iter().copied().collect();

    debug!("communicating sweep dependencies");
    let global_dependencies = exchange_rank_dependencies(exchange, &location_dependencies)?;

    let ordering = build_task_dependency_graph(&global_dependencies, allow_cycles)?;

    // A broken edge dep -> loc means loc no longer waits for dep in the
    // ordered exchange; the pair is rewired through the delayed path.
    let mut delayed_location_dependencies = Vec::new();
    let mut delayed_location_successors = Vec::new();
    for &(dep, loc) in &ordering.removed_edges {
        if loc == my_rank {
            location_dependencies.retain(|&d| d != dep);
            delayed_location_dependencies.push(dep);
        }
        if dep == my_rank {
            delayed_location_successors.push(loc);
        }
    }

    exchange.barrier();

    Ok(Spds {
        polar,
        azimuthal,
        omega,
        grid,
        spls,
        local_cyclic_dependencies,
        location_dependencies,
        location_successors,
        delayed_location_dependencies,
        delayed_location_successors,
        global_sweep_planes: ordering.global_sweep_planes,
        cell_face_orientations: relationships.face_orientations,
    })
}
