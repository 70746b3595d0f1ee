//! Shared grid fixtures for the integration tests.
#![allow(dead_code)] // not every test binary uses every fixture

use sweep_order::prelude::*;

pub fn face(normal: Vector3, centroid: Vector3, neighbor: FaceNeighbor) -> CellFace {
    CellFace {
        normal,
        centroid,
        neighbor,
    }
}

fn slab_neighbor(owner_of: &dyn Fn(u64) -> PartitionId, id: i64, n: i64) -> FaceNeighbor {
    if id < 0 {
        FaceNeighbor::Boundary(0)
    } else if id >= n {
        FaceNeighbor::Boundary(1)
    } else {
        FaceNeighbor::Cell {
            global_id: id as u64,
            partition: owner_of(id as u64),
        }
    }
}

/// A 1-D line of `n` slab cells along z, keeping only the cells owned by
/// `partition` under the `owner_of` assignment.
pub fn partitioned_slab_line(
    n: u64,
    partition: PartitionId,
    owner_of: &dyn Fn(u64) -> PartitionId,
) -> LocalGrid {
    let up = Vector3::new(0.0, 0.0, 1.0);
    let cells = (0..n)
        .filter(|&g| owner_of(g) == partition)
        .map(|g| Cell {
            global_id: g,
            faces: vec![
                face(
                    -up,
                    Vector3::new(0.0, 0.0, g as f64),
                    slab_neighbor(owner_of, g as i64 - 1, n as i64),
                ),
                face(
                    up,
                    Vector3::new(0.0, 0.0, g as f64 + 1.0),
                    slab_neighbor(owner_of, g as i64 + 1, n as i64),
                ),
            ],
        })
        .collect();
    LocalGrid::new(partition, cells)
}

/// A single-rank 1-D line of `n` slab cells.
pub fn slab_line(n: u64) -> LocalGrid {
    partitioned_slab_line(n, 0, &|_| 0)
}

/// A single-rank 2x2 mesh of unit quad cells in the xy-plane; cell (i, j)
/// has global id `j * 2 + i`.
pub fn quad_mesh_2x2() -> LocalGrid {
    let ex = Vector3::new(1.0, 0.0, 0.0);
    let ey = Vector3::new(0.0, 1.0, 0.0);
    let neighbor = |i: i64, j: i64| {
        if (0..2).contains(&i) && (0..2).contains(&j) {
            FaceNeighbor::Cell {
                global_id: (j * 2 + i) as u64,
                partition: 0,
            }
        } else {
            FaceNeighbor::Boundary(0)
        }
    };
    let mut cells = Vec::new();
    for j in 0i64..2 {
        for i in 0i64..2 {
            let (x, y) = (i as f64, j as f64);
            cells.push(Cell {
                global_id: (j * 2 + i) as u64,
                faces: vec![
                    face(-ex, Vector3::new(x, y + 0.5, 0.0), neighbor(i - 1, j)),
                    face(ex, Vector3::new(x + 1.0, y + 0.5, 0.0), neighbor(i + 1, j)),
                    face(-ey, Vector3::new(x + 0.5, y, 0.0), neighbor(i, j - 1)),
                    face(ey, Vector3::new(x + 0.5, y + 1.0, 0.0), neighbor(i, j + 1)),
                ],
            });
        }
    }
    LocalGrid::new(0, cells)
}
