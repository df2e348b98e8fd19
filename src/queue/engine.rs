//! Generic enqueue/drain engine over a pluggable storage discipline

use crate::pool::WorkerPool;
use crate::queue::item::{Priority, QueueItem};
use crate::sync::{DrainGate, MilestoneCounter, SpinLock};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, trace};
use uuid::Uuid;

/// Milestone interval for the processed-items diagnostic counter.
const PROCESSED_LOG_INTERVAL: i64 = 10_000;

/// Storage hooks a [`DispatchQueue`] delegates to.
///
/// Implementations are not required to be thread-safe: the engine
/// serializes every hook call under a single instance-wide lock, and the
/// critical sections are a handful of collection operations.
pub trait QueueDiscipline: Send + 'static {
    /// Store an item according to the discipline's rules.
    fn insert(&mut self, item: QueueItem);

    /// Remove the next item to deliver, scanning levels highest to lowest.
    /// Returns `None` when nothing is pending.
    fn remove_next(&mut self) -> Option<QueueItem>;

    /// Total pending items across all levels.
    fn len(&self) -> usize;

    /// Whether no items are pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Asynchronous dispatch queue decoupling producer threads from consumer
/// execution on shared pool threads.
///
/// Producers enqueue from any thread without blocking; the engine arms at
/// most one effective drain per burst of enqueues via the
/// [`DrainGate`] election protocol, so the queue never holds a dedicated
/// thread and never runs two drains concurrently. Storage behavior
/// (ordering, coalescing) comes from the [`QueueDiscipline`] chosen at
/// construction; see [`PriorityFifo`](crate::PriorityFifo) and
/// [`PriorityCoalescingMap`](crate::PriorityCoalescingMap).
///
/// Callback panics are caught and traced; they never abort the drain loop
/// and never reach a producer.
///
/// # Examples
///
/// ```
/// use dispatchq::{DispatchQueue, Priority, PriorityFifo};
/// use std::time::Duration;
///
/// let queue = DispatchQueue::new("events", PriorityFifo::new());
/// queue.enqueue("payload", |data| println!("{data}"), Priority::Normal);
/// queue.wait_until_empty(Duration::from_secs(1));
/// ```
pub struct DispatchQueue<D: QueueDiscipline> {
    inner: Arc<EngineInner<D>>,
}

struct EngineInner<D> {
    name: String,
    instance_id: Uuid,
    storage: SpinLock<D>,
    processed: MilestoneCounter,
    gate: DrainGate,
    closed: AtomicBool,
    pool: Arc<WorkerPool>,
}

impl<D: QueueDiscipline> DispatchQueue<D> {
    /// Create a queue draining on the process-wide shared worker pool.
    pub fn new(name: &str, discipline: D) -> Self {
        Self::with_pool(name, discipline, WorkerPool::shared())
    }

    /// Create a queue draining on a specific worker pool.
    pub fn with_pool(name: &str, discipline: D, pool: Arc<WorkerPool>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                name: name.to_string(),
                instance_id: Uuid::new_v4(),
                storage: SpinLock::new(discipline),
                processed: MilestoneCounter::new(
                    format!("{name}.processed"),
                    PROCESSED_LOG_INTERVAL,
                ),
                gate: DrainGate::new(),
                closed: AtomicBool::new(false),
                pool,
            }),
        }
    }

    /// Enqueue a payload and its delivery callback at the given priority.
    ///
    /// Returns immediately; the callback later runs on a pool thread. After
    /// [`DispatchQueue::close`] this is a no-op.
    pub fn enqueue<T, C>(&self, data: T, callback: C, priority: Priority)
    where
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        self.enqueue_item(QueueItem::new(data, callback, priority, None));
    }

    /// Enqueue with a coalescing key.
    ///
    /// FIFO disciplines ignore the key; coalescing disciplines keep only
    /// the latest pending item per (priority, key).
    pub fn enqueue_keyed<T, C>(&self, data: T, callback: C, priority: Priority, key: &str)
    where
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        self.enqueue_item(QueueItem::new(data, callback, priority, Some(key.to_string())));
    }

    fn enqueue_item(&self, item: QueueItem) {
        if self.inner.closed.load(Ordering::Acquire) {
            trace!(queue = %self.inner.name, "enqueue ignored: queue is closed");
            return;
        }
        self.inner.storage.lock().insert(item);
        self.inner.gate.producer_arrived();
        let inner = Arc::clone(&self.inner);
        self.inner.pool.execute(move || inner.drain_worker());
    }

    /// Number of items currently pending across all levels.
    pub fn queue_length(&self) -> usize {
        self.inner.storage.lock().len()
    }

    /// Poll until the queue is empty or the timeout elapses.
    ///
    /// Returns the number of items still pending (zero on a clean drain).
    /// The poll sleeps with a gentle backoff rather than spinning; this is
    /// the only blocking call in the framework and exists for shutdown.
    pub fn wait_until_empty(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut sleep = Duration::from_millis(1);
        loop {
            let pending = self.queue_length();
            if pending == 0 {
                return 0;
            }
            let now = Instant::now();
            if now >= deadline {
                return pending;
            }
            thread::sleep(sleep.min(deadline - now));
            sleep = (sleep * 2).min(Duration::from_millis(100));
        }
    }

    /// Stop accepting new items. Items already queued still drain, and an
    /// in-flight callback runs to completion.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
    }

    /// Whether [`DispatchQueue::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Unique id of this queue instance, for correlating trace output.
    pub fn instance_id(&self) -> Uuid {
        self.inner.instance_id
    }

    /// Total items delivered over the queue's lifetime.
    pub fn processed_count(&self) -> i64 {
        self.inner.processed.value()
    }
}

impl<D: QueueDiscipline> Clone for DispatchQueue<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: QueueDiscipline> EngineInner<D> {
    fn drain_worker(&self) {
        self.gate.run_worker(|| {
            loop {
                // Remove under the lock, deliver outside it.
                let item = self.storage.lock().remove_next();
                let Some(item) = item else { break };
                self.processed.increment();
                if catch_unwind(AssertUnwindSafe(|| item.run())).is_err() {
                    error!(
                        queue = %self.name,
                        instance = %self.instance_id,
                        "queued callback panicked; drain continues"
                    );
                }
            }
        });
    }
}
