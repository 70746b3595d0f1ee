//! Face classification and cell/rank relationship extraction.
//!
//! For a direction ω, every face of every local cell is classified by the
//! sign of ω·n: outgoing faces point at downwind neighbors (successors),
//! incoming faces at upwind neighbors (dependencies). Local neighbors
//! become cell-graph edges; off-rank neighbors become location-level
//! dependencies or successors keyed by partition id. Because the two
//! cells sharing an interior face hold antiparallel copies of its normal,
//! their classifications are complementary without any coordination.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::mesh::{FaceNeighbor, LocalGrid, PartitionId, Vector3};
use crate::sweep_error::SweepError;

/// Faces with |ω·n| at or below this are treated as parallel to the
/// sweep direction and contribute no dependency in either direction.
pub const GRAZING_TOLERANCE: f64 = 1.0e-16;

/// Orientation of one face relative to a sweep direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceOrientation {
    Parallel,
    Incoming,
    Outgoing,
}

/// Per-cell and per-rank relationship snapshot for one direction.
#[derive(Debug, Clone, Default)]
pub struct CellRelationships {
    /// For each local cell: successor local id → accumulated edge weight.
    pub cell_successors: Vec<BTreeMap<usize, f64>>,
    /// For each local cell: the local ids it depends on.
    pub cell_dependencies: Vec<BTreeSet<usize>>,
    /// Partition ids downwind of this rank.
    pub location_successors: BTreeSet<PartitionId>,
    /// Partition ids upwind of this rank.
    pub location_dependencies: BTreeSet<PartitionId>,
    /// Orientation of every face of every local cell, in face order.
    pub face_orientations: Vec<Vec<FaceOrientation>>,
}

/// Classifies every local face against ω and derives the successor and
/// dependency sets at cell and rank level.
pub fn populate_cell_relationships(
    grid: &LocalGrid,
    omega: Vector3,
) -> Result<CellRelationships, SweepError> {
    let n = grid.num_local_cells();
    let mut rel = CellRelationships {
        cell_successors: vec![BTreeMap::new(); n],
        cell_dependencies: vec![BTreeSet::new(); n],
        face_orientations: Vec::with_capacity(n),
        ..CellRelationships::default()
    };

    for (c, cell) in grid.cells().iter().enumerate() {
        let mut orientations = Vec::with_capacity(cell.faces.len());
        for face in &cell.faces {
            let mu = omega.dot(face.normal);
            let orientation = if mu > GRAZING_TOLERANCE {
                FaceOrientation::Outgoing
            } else if mu < -GRAZING_TOLERANCE {
                FaceOrientation::Incoming
            } else {
                FaceOrientation::Parallel
            };
            orientations.push(orientation);

            let FaceNeighbor::Cell {
                global_id,
                partition,
            } = face.neighbor
            else {
                continue; // boundary faces contribute nothing
            };

            match orientation {
                FaceOrientation::Outgoing => {
                    if partition == grid.partition() {
                        let nbr = grid
                            .local_id_of(global_id)
                            .ok_or(SweepError::MissingLocalNeighbor(global_id))?;
                        *rel.cell_successors[c].entry(nbr).or_insert(0.0) += mu;
                        rel.cell_dependencies[nbr].insert(c);
                    } else {
                        rel.location_successors.insert(partition);
                    }
                }
                FaceOrientation::Incoming => {
                    if partition == grid.partition() {
                        let nbr = grid
                            .local_id_of(global_id)
                            .ok_or(SweepError::MissingLocalNeighbor(global_id))?;
                        rel.cell_dependencies[c].insert(nbr);
                    } else {
                        rel.location_dependencies.insert(partition);
                    }
                }
                FaceOrientation::Parallel => {}
            }
        }
        rel.face_orientations.push(orientations);
    }

    Ok(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Cell, CellFace};

    fn face(normal: Vector3, neighbor: FaceNeighbor) -> CellFace {
        CellFace {
            normal,
            centroid: Vector3::default(),
            neighbor,
        }
    }

    /// Two slab cells stacked in z, sharing an interior face.
    fn two_slabs(partition: PartitionId) -> LocalGrid {
        let up = Vector3::new(0.0, 0.0, 1.0);
        let cells = vec![
            Cell {
                global_id: 0,
                faces: vec![
                    face(-up, FaceNeighbor::Boundary(0)),
                    face(
                        up,
                        FaceNeighbor::Cell {
                            global_id: 1,
                            partition,
                        },
                    ),
                ],
            },
            Cell {
                global_id: 1,
                faces: vec![
                    face(
                        -up,
                        FaceNeighbor::Cell {
                            global_id: 0,
                            partition,
                        },
                    ),
                    face(up, FaceNeighbor::Boundary(1)),
                ],
            },
        ];
        LocalGrid::new(partition, cells)
    }

    #[test]
    fn interior_face_gets_exactly_one_direction() {
        let grid = two_slabs(0);
        let omega = Vector3::new(0.0, 0.0, 1.0);
        let rel = populate_cell_relationships(&grid, omega).unwrap();
        assert!(rel.cell_successors[0].contains_key(&1));
        assert!(!rel.cell_successors[1].contains_key(&0));
        assert!(rel.cell_dependencies[1].contains(&0));
        assert!(rel.cell_dependencies[0].is_empty());
    }

    #[test]
    fn reversed_direction_swaps_the_edge() {
        let grid = two_slabs(0);
        let omega = Vector3::new(0.0, 0.0, -1.0);
        let rel = populate_cell_relationships(&grid, omega).unwrap();
        assert!(rel.cell_successors[1].contains_key(&0));
        assert!(!rel.cell_successors[0].contains_key(&1));
    }

    #[test]
    fn grazing_direction_contributes_nothing() {
        let grid = two_slabs(0);
        let omega = Vector3::new(1.0, 0.0, 0.0); // exactly parallel to the shared face
        let rel = populate_cell_relationships(&grid, omega).unwrap();
        assert!(rel.cell_successors[0].is_empty());
        assert!(rel.cell_successors[1].is_empty());
        assert_eq!(rel.face_orientations[0][1], FaceOrientation::Parallel);
        assert_eq!(rel.face_orientations[1][0], FaceOrientation::Parallel);
    }

    #[test]
    fn off_rank_neighbors_become_location_relations() {
        let up = Vector3::new(0.0, 0.0, 1.0);
        let cells = vec![Cell {
            global_id: 10,
            faces: vec![
                face(
                    -up,
                    FaceNeighbor::Cell {
                        global_id: 9,
                        partition: 1,
                    },
                ),
                face(
                    up,
                    FaceNeighbor::Cell {
                        global_id: 11,
                        partition: 2,
                    },
                ),
            ],
        }];
        let grid = LocalGrid::new(0, cells);
        let rel =
            populate_cell_relationships(&grid, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(
            rel.location_dependencies.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
        assert_eq!(
            rel.location_successors.iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn boundary_faces_are_ignored() {
        let grid = two_slabs(0);
        let rel =
            populate_cell_relationships(&grid, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(rel.location_dependencies.is_empty());
        assert!(rel.location_successors.is_empty());
    }

    #[test]
    fn marked_local_but_unknown_neighbor_is_an_error() {
        let up = Vector3::new(0.0, 0.0, 1.0);
        let cells = vec![Cell {
            global_id: 0,
            faces: vec![face(
                up,
                FaceNeighbor::Cell {
                    global_id: 77,
                    partition: 0,
                },
            )],
        }];
        let grid = LocalGrid::new(0, cells);
        let err = populate_cell_relationships(&grid, up).unwrap_err();
        assert_eq!(err, SweepError::MissingLocalNeighbor(77));
    }
}
