//! Thin façade over rank-level collective communication.
//!
//! The ordering algorithms never call MPI directly; they are handed a
//! [`RankExchange`] capability. That keeps the graph work testable in a
//! single process: [`SerialExchange`] for one rank, [`LocalExchange`] for
//! several simulated ranks on threads, and `MpiExchange` (behind the
//! `mpi-support` feature) for real jobs.
//!
//! All operations here are *collective and blocking*: every rank must
//! issue the same calls in the same order with equal-length buffers.
//! Mismatched participation deadlocks, exactly as it would under MPI;
//! that is a programming contract, not a runtime-checked condition.

pub mod dependency_exchange;
pub mod wire;

use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

use crate::sweep_error::SweepError;

/// Collective broadcast/barrier capability for one rank of a job.
pub trait RankExchange {
    /// This rank's id, 0-based.
    fn rank(&self) -> usize;
    /// Number of participating ranks.
    fn size(&self) -> usize;
    /// In-place broadcast of `buf` from `root` to every rank. All ranks
    /// must supply buffers of identical length.
    fn broadcast(&self, root: usize, buf: &mut [u8]) -> Result<(), SweepError>;
    /// Blocks until every rank has entered the barrier.
    fn barrier(&self);
}

/// Single-rank no-op backend for serial runs and unit tests.
#[derive(Clone, Debug, Default)]
pub struct SerialExchange;

impl RankExchange for SerialExchange {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn broadcast(&self, _root: usize, _buf: &mut [u8]) -> Result<(), SweepError> {
        Ok(())
    }
    fn barrier(&self) {}
}

struct LocalShared {
    size: usize,
    slot: Mutex<Option<Vec<u8>>>,
    barrier: Barrier,
}

/// In-process multi-"rank" backend: one handle per simulated rank, each
/// driven from its own thread. Broadcasts rendezvous through a shared
/// slot guarded by a reusable barrier, so the collective-ordering
/// contract is exercised the same way a real MPI job exercises it.
#[derive(Clone)]
pub struct LocalExchange {
    rank: usize,
    shared: Arc<LocalShared>,
}

impl LocalExchange {
    /// Creates `size` connected handles; hand one to each rank thread.
    pub fn create(size: usize) -> Vec<Self> {
        let shared = Arc::new(LocalShared {
            size,
            slot: Mutex::new(None),
            barrier: Barrier::new(size),
        });
        (0..size)
            .map(|rank| Self {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl RankExchange for LocalExchange {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn broadcast(&self, root: usize, buf: &mut [u8]) -> Result<(), SweepError> {
        let shared = &self.shared;
        shared.barrier.wait();
        if self.rank == root {
            *shared.slot.lock() = Some(buf.to_vec());
        }
        shared.barrier.wait();
        // a failed receive must still reach the trailing barrier, or the
        // remaining ranks hang
        let mut result = Ok(());
        if self.rank != root {
            let slot = shared.slot.lock();
            match slot.as_ref() {
                Some(data) if data.len() == buf.len() => buf.copy_from_slice(data),
                Some(data) => {
                    result = Err(SweepError::CommError {
                        root,
                        reason: format!(
                            "buffer length mismatch: root sent {}, receiver expects {}",
                            data.len(),
                            buf.len()
                        ),
                    });
                }
                None => {
                    result = Err(SweepError::CommError {
                        root,
                        reason: "broadcast slot empty".into(),
                    });
                }
            }
        }
        shared.barrier.wait();
        if self.rank == root {
            *shared.slot.lock() = None;
        }
        result
    }

    fn barrier(&self) {
        self.shared.barrier.wait();
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// Real-MPI backend over `MPI_Bcast`/`MPI_Barrier`.
    pub struct MpiExchange {
        universe: Universe,
    }

    impl MpiExchange {
        /// Initializes MPI; returns `None` if it was already initialized.
        pub fn new() -> Option<Self> {
            mpi::initialize().map(|universe| Self { universe })
        }

        fn world(&self) -> SimpleCommunicator {
            self.universe.world()
        }
    }

    impl RankExchange for MpiExchange {
        fn rank(&self) -> usize {
            self.world().rank() as usize
        }

        fn size(&self) -> usize {
            self.world().size() as usize
        }

        fn broadcast(&self, root: usize, buf: &mut [u8]) -> Result<(), SweepError> {
            self.world().process_at_rank(root as i32).broadcast_into(buf);
            Ok(())
        }

        fn barrier(&self) {
            self.world().barrier();
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiExchange;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_broadcast_is_identity() {
        let ex = SerialExchange;
        let mut buf = [1u8, 2, 3];
        ex.broadcast(0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(ex.size(), 1);
    }

    #[test]
    fn local_broadcast_two_ranks() {
        let handles = LocalExchange::create(2);
        let mut threads = Vec::new();
        for ex in handles {
            threads.push(std::thread::spawn(move || {
                let mut buf = if ex.rank() == 0 { [7u8, 8] } else { [0u8, 0] };
                ex.broadcast(0, &mut buf).unwrap();
                buf
            }));
        }
        for t in threads {
            assert_eq!(t.join().unwrap(), [7, 8]);
        }
    }

    #[test]
    fn local_broadcast_rounds_from_each_root() {
        let handles = LocalExchange::create(3);
        let mut threads = Vec::new();
        for ex in handles {
            threads.push(std::thread::spawn(move || {
                let mut seen = Vec::new();
                for root in 0..ex.size() {
                    let mut buf = [if ex.rank() == root { root as u8 } else { 0xff }];
                    ex.broadcast(root, &mut buf).unwrap();
                    seen.push(buf[0]);
                }
                seen
            }));
        }
        for t in threads {
            assert_eq!(t.join().unwrap(), vec![0, 1, 2]);
        }
    }
}
