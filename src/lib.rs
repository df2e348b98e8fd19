#![allow(unknown_lints)]
#![allow(clippy::literal_string_with_formatting_args)]

//!  # DispatchQ
//!
//!  An asynchronous priority dispatch and throttling framework for Rust. This library decouples producer threads from consumer execution on shared pool threads, with strict priority ordering, optional per-key coalescing, bounded drain-on-shutdown, and at-most-one concurrent consumer per queue instance.
//!
//!  ## Features
//!
//!  - Lock-free thread-election drain scheduling: N rapid enqueues arm at most one effective drain loop, with no dedicated thread per queue
//!  - Strict priority ordering across five levels, FIFO within a level for the FIFO discipline
//!  - Per-key coalescing discipline that keeps only the latest pending item per (priority, key)
//!  - Single-slot coalescing throttle delivering only the most recent value of a burst, with guaranteed non-overlapping callback invocation
//!  - Producers never block and never see an error or panic from the dispatch path
//!  - Bounded shutdown: `wait_until_empty` polls with backoff and reports the exact residue instead of hanging
//!  - A logging front-end (`LogRouter`) with token-template formatting, sync or queued delivery, line splitting, and a reference-counted process panic hook
//!  - Hand-rolled low-lock primitives: a bounded-spin spinlock, a milestone-logging atomic counter, and the drain-election gate
//!
//!  Suitable for market-data fan-out, cache/event notification, UI refresh throttling, and any pipeline where bursts must collapse to latest-state and slow consumers must not stall producers.
//!
//!  ## Queueing Disciplines
//!
//!  - **PriorityFifo**: strict priority + FIFO within a level; every enqueued item is delivered
//!  - **PriorityCoalescingMap**: strict priority + at most one pending item per (level, key); an enqueue overwrites an undelivered item with the same key, so only the latest state survives
//!
//!  ## Delivery Guarantees
//!
//!  - At most one thread runs a given queue or throttle instance's drain body at any time
//!  - Levels drain strictly Highest to Lowest
//!  - A `CoalescingThrottle` eventually delivers a value no older than the last dispatch; intermediate values may be dropped silently
//!  - Callback panics are caught and traced; they never abort a drain loop and never reach a producer
//!
//!  ## Example
//!
//!  ```
//!  use dispatchq::{DispatchQueue, Priority, PriorityFifo};
//!  use std::time::Duration;
//!
//!  let queue = DispatchQueue::new("events", PriorityFifo::new());
//!  queue.enqueue("tick", |data| println!("{data}"), Priority::High);
//!  queue.enqueue("tock", |data| println!("{data}"), Priority::Low);
//!  queue.wait_until_empty(Duration::from_secs(1));
//!  ```
//!

mod errors;
mod logging;
mod pool;
mod queue;
mod sync;
mod utils;

pub use errors::DispatchError;
pub use logging::{
    ConsoleSink, DEFAULT_FORMAT, FileSink, LogRouter, LogSink, MemorySink, RouterConfig, Severity,
    TraceSink,
};
pub use pool::WorkerPool;
pub use queue::{
    CoalescingThrottle, DispatchQueue, Priority, PriorityCoalescingMap, PriorityFifo,
    QueueDiscipline, QueueItem,
};
pub use sync::{DrainGate, MilestoneCounter, SpinLock, SpinLockGuard};
pub use utils::{host_name, setup_logger, user_name};
