//! Atomic counter with best-effort milestone logging

use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// An atomic counter that emits a diagnostic log entry each time the count
/// crosses a multiple of the configured interval.
///
/// The milestone report itself is best-effort: a secondary atomic reporting
/// guard ensures that at most one concurrent caller logs a given milestone.
/// Under heavy contention some milestones may be skipped entirely, but a
/// milestone is never logged twice and reporting never blocks a caller.
///
/// # Examples
///
/// ```
/// use dispatchq::MilestoneCounter;
///
/// let counter = MilestoneCounter::new("requests", 1000);
/// assert_eq!(counter.increment(), 1);
/// assert_eq!(counter.increment(), 2);
/// assert_eq!(counter.decrement(), 1);
/// ```
#[derive(Debug)]
pub struct MilestoneCounter {
    name: String,
    count: AtomicI64,
    log_interval: i64,
    reporters: AtomicI64,
}

impl MilestoneCounter {
    /// Create a counter starting at zero.
    ///
    /// A non-positive `log_interval` disables milestone reporting; the
    /// counter then behaves as a plain atomic counter.
    pub fn new(name: impl Into<String>, log_interval: i64) -> Self {
        Self {
            name: name.into(),
            count: AtomicI64::new(0),
            log_interval,
            reporters: AtomicI64::new(0),
        }
    }

    /// Atomically add one and return the new value.
    pub fn increment(&self) -> i64 {
        let value = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        self.report(value);
        value
    }

    /// Atomically subtract one and return the new value.
    pub fn decrement(&self) -> i64 {
        let value = self.count.fetch_sub(1, Ordering::AcqRel) - 1;
        self.report(value);
        value
    }

    /// Current value of the counter.
    pub fn value(&self) -> i64 {
        self.count.load(Ordering::Acquire)
    }

    /// Name given at construction, included in milestone log entries.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn report(&self, value: i64) {
        if self.log_interval <= 0 || value == 0 || value % self.log_interval != 0 {
            return;
        }
        // Only the caller that finds the guard idle logs; concurrent
        // crossers skip rather than duplicate or wait.
        if self.reporters.fetch_add(1, Ordering::AcqRel) == 0 {
            debug!(counter = %self.name, value, "milestone reached");
        }
        self.reporters.fetch_sub(1, Ordering::AcqRel);
    }
}
