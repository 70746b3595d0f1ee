//! Input interface to the distributed mesh.
//!
//! The mesh itself is produced elsewhere (mesh generation and partitioning
//! are external collaborators); this module defines the minimal view a
//! rank needs to order its own cells: per-cell face lists with outward
//! unit normals, face centroids, and neighbor references carrying the
//! neighbor's partition id. The grid is built once by the caller and
//! consumed read-only by every per-direction ordering.

pub mod vector;

pub use vector::Vector3;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifies the owning process of a cell.
pub type PartitionId = usize;

/// What lies on the far side of a cell face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceNeighbor {
    /// Domain boundary; the marker identifies which boundary.
    Boundary(u64),
    /// Another cell, local or remote.
    Cell {
        global_id: u64,
        partition: PartitionId,
    },
}

impl FaceNeighbor {
    pub fn is_boundary(&self) -> bool {
        matches!(self, FaceNeighbor::Boundary(_))
    }
}

/// One face of a cell: outward unit normal, centroid, neighbor reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFace {
    pub normal: Vector3,
    pub centroid: Vector3,
    pub neighbor: FaceNeighbor,
}

/// A local cell with its global id and face list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub global_id: u64,
    pub faces: Vec<CellFace>,
}

/// The rank-local portion of a distributed grid.
///
/// Cells are indexed by their *local id* (position in the cell vector);
/// the global→local map answers whether a neighbor referenced by global
/// id lives on this rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalGrid {
    partition: PartitionId,
    cells: Vec<Cell>,
    local_index: BTreeMap<u64, usize>,
}

impl LocalGrid {
    pub fn new(partition: PartitionId, cells: Vec<Cell>) -> Self {
        let local_index = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.global_id, i))
            .collect();
        Self {
            partition,
            cells,
            local_index,
        }
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn num_local_cells(&self) -> usize {
        self.cells.len()
    }

    /// Local id of a cell given its global id, if it lives on this rank.
    pub fn local_id_of(&self, global_id: u64) -> Option<usize> {
        self.local_index.get(&global_id).copied()
    }
}
