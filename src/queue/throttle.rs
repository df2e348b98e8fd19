//! Single-slot latest-value-wins dispatcher

use crate::pool::WorkerPool;
use crate::sync::{DrainGate, SpinLock};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, trace};

type ThrottleCallback<T> = Box<dyn Fn(T) + Send + Sync + 'static>;

/// Collapses bursts of values into sequential deliveries of the most
/// recent one.
///
/// The throttle holds a single slot. [`CoalescingThrottle::dispatch`]
/// overwrites the slot in O(1) and returns immediately; a value that was
/// still awaiting delivery is silently discarded. The [`DrainGate`]
/// election guarantees exactly one pool thread drains the slot at a time,
/// so the callback never overlaps itself, and a value arriving while the
/// callback runs is picked up by the same drainer on its next pass rather
/// than spawning a second invocation.
///
/// The callback is therefore eventually invoked with a value no older than
/// the last dispatch, but intermediate values may never be seen. Callback
/// panics are caught and traced; they never stop the throttle and never
/// reach the producer.
///
/// # Examples
///
/// ```
/// use dispatchq::CoalescingThrottle;
///
/// let throttle = CoalescingThrottle::new("ui-refresh", |snapshot: u64| {
///     println!("rendering {snapshot}");
/// });
/// for version in 0..1000 {
///     throttle.dispatch(version); // most versions coalesce away
/// }
/// ```
pub struct CoalescingThrottle<T: Send + 'static> {
    inner: Arc<ThrottleInner<T>>,
}

struct ThrottleInner<T> {
    name: String,
    // None means the last value was delivered.
    slot: SpinLock<Option<T>>,
    gate: DrainGate,
    closed: AtomicBool,
    callback: ThrottleCallback<T>,
    pool: Arc<WorkerPool>,
}

impl<T: Send + 'static> CoalescingThrottle<T> {
    /// Create a throttle delivering through the shared worker pool.
    pub fn new(name: &str, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::with_pool(name, callback, WorkerPool::shared())
    }

    /// Create a throttle delivering through a specific worker pool.
    pub fn with_pool(
        name: &str,
        callback: impl Fn(T) + Send + Sync + 'static,
        pool: Arc<WorkerPool>,
    ) -> Self {
        Self {
            inner: Arc::new(ThrottleInner {
                name: name.to_string(),
                slot: SpinLock::new(None),
                gate: DrainGate::new(),
                closed: AtomicBool::new(false),
                callback: Box::new(callback),
                pool,
            }),
        }
    }

    /// Publish a value, replacing any undelivered predecessor.
    ///
    /// Never blocks and never fails; after [`CoalescingThrottle::close`]
    /// this is a no-op.
    pub fn dispatch(&self, data: T) {
        if self.inner.closed.load(Ordering::Acquire) {
            trace!(throttle = %self.inner.name, "dispatch ignored: throttle is closed");
            return;
        }
        {
            let mut slot = self.inner.slot.lock();
            if slot.replace(data).is_some() {
                trace!(throttle = %self.inner.name, "undelivered value superseded");
            }
        }
        self.inner.gate.producer_arrived();
        let inner = Arc::clone(&self.inner);
        self.inner.pool.execute(move || inner.drain_worker());
    }

    /// Stop accepting new values. An in-flight callback is allowed to
    /// finish.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }

    /// Whether [`CoalescingThrottle::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

impl<T: Send + 'static> Drop for CoalescingThrottle<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Send + 'static> ThrottleInner<T> {
    fn drain_worker(&self) {
        self.gate.run_worker(|| {
            loop {
                // Snapshot and clear under the lock, deliver outside it. A
                // value stored while the callback runs is caught by the
                // re-check on the next iteration.
                let value = self.slot.lock().take();
                let Some(value) = value else { break };
                if catch_unwind(AssertUnwindSafe(|| (self.callback)(value))).is_err() {
                    error!(
                        throttle = %self.name,
                        "throttle callback panicked; value counted as delivered"
                    );
                }
            }
        });
    }
}
