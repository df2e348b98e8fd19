//! Keyed latest-state-wins storage discipline

use crate::queue::engine::QueueDiscipline;
use crate::queue::item::{Priority, QueueItem};
use std::collections::HashMap;
use tracing::trace;

/// Storage discipline keeping at most one pending item per (level, key).
///
/// Inserting an item whose key already has a pending entry at the same
/// level silently replaces that entry: the older payload is dropped and
/// only the latest state is delivered. Items enqueued without a key all
/// share the empty key and therefore coalesce with each other.
///
/// Removal scans levels highest to lowest, but within a level returns
/// entries in map-iteration order; there is no FIFO promise between
/// different keys of the same level.
#[derive(Debug)]
pub struct PriorityCoalescingMap {
    levels: Vec<HashMap<String, QueueItem>>,
}

impl PriorityCoalescingMap {
    /// Create an empty discipline with one key map per priority level.
    pub fn new() -> Self {
        Self {
            levels: (0..Priority::LEVELS).map(|_| HashMap::new()).collect(),
        }
    }
}

impl Default for PriorityCoalescingMap {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueDiscipline for PriorityCoalescingMap {
    fn insert(&mut self, item: QueueItem) {
        let key = item.key().unwrap_or_default().to_string();
        let level = &mut self.levels[item.priority().index()];
        if let Some(replaced) = level.insert(key, item) {
            trace!(
                key = replaced.key().unwrap_or_default(),
                priority = %replaced.priority(),
                "pending item superseded by newer state"
            );
        }
    }

    fn remove_next(&mut self) -> Option<QueueItem> {
        for level in self.levels.iter_mut().rev() {
            if let Some(key) = level.keys().next().cloned() {
                return level.remove(&key);
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.levels.iter().map(HashMap::len).sum()
    }
}
