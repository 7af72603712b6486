use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel for "unreachable".
pub const INF: u64 = u64::MAX;

/// Dense table of tentative distances, one slot per node id.
///
/// Values only ever decrease over a run. The single-threaded engines go
/// through `get`/`set`; the parallel engines go through `try_improve`,
/// a compare-exchange loop so that concurrent relaxations of the same
/// node cannot lose the smaller candidate. Relaxed ordering is enough:
/// per-slot monotonicity comes from the CAS itself, and the fork-join
/// round boundary orders everything else.
pub struct DistanceTable {
    slots: Vec<AtomicU64>,
}

impl DistanceTable {
    pub fn new(num_nodes: usize, source: u32) -> Self {
        let slots: Vec<AtomicU64> = (0..num_nodes).map(|_| AtomicU64::new(INF)).collect();
        slots[source as usize].store(0, Ordering::Relaxed);
        DistanceTable { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn get(&self, node: u32) -> u64 {
        self.slots[node as usize].load(Ordering::Relaxed)
    }

    /// Unconditional store; single-threaded engines only, after they
    /// have already compared against the current value.
    #[inline]
    pub fn set(&self, node: u32, dist: u64) {
        self.slots[node as usize].store(dist, Ordering::Relaxed);
    }

    /// Lowers the slot to `candidate` if it is still an improvement.
    /// Returns true iff this call won the write.
    #[inline]
    pub fn try_improve(&self, node: u32, candidate: u64) -> bool {
        let slot = &self.slots[node as usize];
        let mut current = slot.load(Ordering::Relaxed);
        while candidate < current {
            match slot.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(seen) => current = seen,
            }
        }
        false
    }

    pub fn snapshot(&self) -> Vec<u64> {
        self.slots
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let dist = DistanceTable::new(4, 2);
        assert_eq!(dist.snapshot(), vec![INF, INF, 0, INF]);
    }

    #[test]
    fn try_improve_only_lowers() {
        let dist = DistanceTable::new(2, 0);
        assert!(dist.try_improve(1, 10));
        assert!(!dist.try_improve(1, 10));
        assert!(!dist.try_improve(1, 15));
        assert_eq!(dist.get(1), 10);
        assert!(dist.try_improve(1, 3));
        assert_eq!(dist.get(1), 3);
    }

    #[test]
    fn concurrent_improvements_keep_the_minimum() {
        use std::sync::Arc;

        let dist = Arc::new(DistanceTable::new(2, 0));
        let handles: Vec<_> = (1..=8u64)
            .map(|candidate| {
                let table = Arc::clone(&dist);
                std::thread::spawn(move || {
                    table.try_improve(1, candidate * 10);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(dist.get(1), 10);
    }
}
