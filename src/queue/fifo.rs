//! Strict priority + FIFO storage discipline

use crate::queue::engine::QueueDiscipline;
use crate::queue::item::{Priority, QueueItem};
use std::collections::VecDeque;

/// Storage discipline holding an ordered sequence of items per priority
/// level.
///
/// Items drain strictly from the highest non-empty level down, and in
/// arrival order within a level. Every enqueued item is delivered; nothing
/// is ever coalesced or dropped.
#[derive(Debug)]
pub struct PriorityFifo {
    levels: Vec<VecDeque<QueueItem>>,
}

impl PriorityFifo {
    /// Create an empty discipline with one FIFO per priority level.
    pub fn new() -> Self {
        Self {
            levels: (0..Priority::LEVELS).map(|_| VecDeque::new()).collect(),
        }
    }
}

impl Default for PriorityFifo {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueDiscipline for PriorityFifo {
    fn insert(&mut self, item: QueueItem) {
        self.levels[item.priority().index()].push_back(item);
    }

    fn remove_next(&mut self) -> Option<QueueItem> {
        for level in self.levels.iter_mut().rev() {
            if let Some(item) = level.pop_front() {
                return Some(item);
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }
}
