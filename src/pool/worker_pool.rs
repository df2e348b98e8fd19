//! Shared worker pool feeding queue and throttle drains

use crate::errors::DispatchError;
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use tracing::{error, trace};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size pool of worker threads consuming jobs from a shared
/// channel.
///
/// Queues and throttles schedule their drain workers here rather than
/// owning a thread each; a process typically uses the single
/// [`WorkerPool::shared`] instance. Jobs that panic are caught and traced
/// so a misbehaving callback cannot kill a pool thread.
///
/// Dropping a pool closes the feed channel; workers finish the jobs already
/// queued and then exit, and the drop joins them.
#[derive(Debug)]
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Create a pool with the given number of worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfiguration`] for a zero thread
    /// count and [`DispatchError::ThreadSpawn`] if the operating system
    /// refuses a thread.
    pub fn new(threads: usize) -> Result<Self, DispatchError> {
        if threads == 0 {
            return Err(DispatchError::InvalidConfiguration {
                message: "worker pool requires at least one thread".to_string(),
            });
        }
        let (sender, receiver) = unbounded::<Job>();
        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let receiver: Receiver<Job> = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("dispatchq-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        if catch_unwind(AssertUnwindSafe(job)).is_err() {
                            error!("worker job panicked");
                        }
                    }
                })
                .map_err(|e| DispatchError::ThreadSpawn {
                    message: e.to_string(),
                })?;
            workers.push(handle);
        }
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// The process-wide shared pool, sized to the machine's parallelism and
    /// created on first use.
    pub fn shared() -> Arc<WorkerPool> {
        static SHARED: OnceLock<Arc<WorkerPool>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| {
            let threads = thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            Arc::new(WorkerPool::new(threads).expect("shared worker pool"))
        }))
    }

    /// Number of worker threads in this pool.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Submit a job for execution on some pool thread.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        match &self.sender {
            Some(sender) => {
                if sender.send(Box::new(job)).is_err() {
                    trace!("worker pool is shutting down; job dropped");
                }
            }
            None => trace!("worker pool is shut down; job dropped"),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets workers finish queued jobs and exit.
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
