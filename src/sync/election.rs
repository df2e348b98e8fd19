//! Lock-free thread-election protocol for single-drainer scheduling

use std::sync::atomic::{AtomicIsize, Ordering};

/// Decides which one of many concurrently scheduled worker threads drains a
/// shared resource, without locks and without ever running two drains at
/// once.
///
/// Producers call [`DrainGate::producer_arrived`] after publishing their
/// data and then schedule a pool worker that calls
/// [`DrainGate::run_worker`]. The gate runs a two-stage election over two
/// atomic counters:
///
/// 1. each worker decrements the producer count; only the worker that
///    observes the count reaching zero is the most recently scheduled one
///    and proceeds, while earlier workers exit immediately as redundant
///    triggers;
/// 2. the surviving worker increments the drainer count; only the worker
///    that pushes it to exactly one becomes the drainer. A worker that
///    loses this stage leaves its increment behind, which forces the active
///    drainer around its loop one more time, absorbing the straggler
///    without a second concurrent drain.
///
/// Both counters return to zero at the end of every drain cycle.
///
/// The gate guarantees that at most one thread executes the drain body at
/// any time, and that after the last `producer_arrived` some worker runs
/// the body at least once afterwards (no lost wakeups).
#[derive(Debug, Default)]
pub struct DrainGate {
    producers_in_flight: AtomicIsize,
    active_drainers: AtomicIsize,
}

impl DrainGate {
    /// Create a gate with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a producer has published data and is about to schedule a
    /// worker. Must be followed by exactly one [`DrainGate::run_worker`]
    /// call on some thread.
    pub fn producer_arrived(&self) {
        self.producers_in_flight.fetch_add(1, Ordering::AcqRel);
    }

    /// Run the election; if this worker wins, `body` is invoked repeatedly
    /// until every straggler worker has been absorbed.
    ///
    /// Returns `true` if this call performed the drain, `false` if it exited
    /// as a redundant trigger.
    pub fn run_worker(&self, mut body: impl FnMut()) -> bool {
        // Stage 1: only the most recently scheduled worker survives.
        if self.producers_in_flight.fetch_sub(1, Ordering::AcqRel) != 1 {
            return false;
        }
        // Stage 2: only the worker that takes the count from 0 to 1 drains.
        if self.active_drainers.fetch_add(1, Ordering::AcqRel) != 0 {
            return false;
        }
        loop {
            body();
            // A straggler that lost stage 2 left the count above one; go
            // around again on its behalf.
            if self.active_drainers.fetch_sub(1, Ordering::AcqRel) == 1 {
                return true;
            }
        }
    }

    /// Snapshot of the producer counter, for diagnostics only.
    pub fn pending_producers(&self) -> isize {
        self.producers_in_flight.load(Ordering::Acquire)
    }
}
