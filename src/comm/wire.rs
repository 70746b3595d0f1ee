//! Fixed little-endian wire records for the rank-dependency exchange.
//!
//! Everything crossing a rank boundary goes through these `Pod` records
//! so byte order and width are pinned regardless of platform.

use bytemuck::{Pod, Zeroable};

use crate::mesh::PartitionId;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// Count of records that follow.
#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireCount {
    n_le: u32,
}

impl WireCount {
    pub fn new(n: usize) -> Self {
        Self {
            n_le: (n as u32).to_le(),
        }
    }
    pub fn get(&self) -> usize {
        u32::from_le(self.n_le) as usize
    }
}

/// A partition id carried on the wire. Ranks are u32 on the wire, never
/// usize.
#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireRank {
    id_le: u32,
}

impl WireRank {
    pub fn of(rank: PartitionId) -> Self {
        Self {
            id_le: (rank as u32).to_le(),
        }
    }
    pub fn get(&self) -> PartitionId {
        u32::from_le(self.id_le) as PartitionId
    }
}

const _: () = {
    assert!(size_of::<WireCount>() == 4);
    assert!(size_of::<WireRank>() == 4);
};
