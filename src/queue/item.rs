//! Queue item and priority definitions

use crate::errors::DispatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete priority tier governing drain precedence.
///
/// Levels form a bounded total order; queues drain strictly from
/// [`Priority::Highest`] down to [`Priority::Lowest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Drained only when every other level is empty.
    #[serde(rename(serialize = "LOWEST"))]
    #[serde(alias = "lowest", alias = "Lowest", alias = "LOWEST")]
    Lowest,
    /// Background work.
    #[serde(rename(serialize = "LOW"))]
    #[serde(alias = "low", alias = "Low", alias = "LOW")]
    Low,
    /// Default tier for ordinary dispatches.
    #[serde(rename(serialize = "NORMAL"))]
    #[serde(alias = "normal", alias = "Normal", alias = "NORMAL")]
    Normal,
    /// Drained ahead of normal traffic.
    #[serde(rename(serialize = "HIGH"))]
    #[serde(alias = "high", alias = "High", alias = "HIGH")]
    High,
    /// Always drained first.
    #[serde(rename(serialize = "HIGHEST"))]
    #[serde(alias = "highest", alias = "Highest", alias = "HIGHEST")]
    Highest,
}

impl Priority {
    /// Number of priority levels; fixed for the lifetime of any queue.
    pub const LEVELS: usize = 5;

    /// Zero-based index of this level, `Lowest == 0`.
    pub const fn index(self) -> usize {
        match self {
            Priority::Lowest => 0,
            Priority::Low => 1,
            Priority::Normal => 2,
            Priority::High => 3,
            Priority::Highest => 4,
        }
    }

    /// Inverse of [`Priority::index`].
    pub fn from_index(index: usize) -> Option<Priority> {
        match index {
            0 => Some(Priority::Lowest),
            1 => Some(Priority::Low),
            2 => Some(Priority::Normal),
            3 => Some(Priority::High),
            4 => Some(Priority::Highest),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Lowest => write!(f, "LOWEST"),
            Priority::Low => write!(f, "LOW"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Highest => write!(f, "HIGHEST"),
        }
    }
}

impl FromStr for Priority {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOWEST" => Ok(Priority::Lowest),
            "LOW" => Ok(Priority::Low),
            "NORMAL" => Ok(Priority::Normal),
            "HIGH" => Ok(Priority::High),
            "HIGHEST" => Ok(Priority::Highest),
            _ => Err(DispatchError::ParseError {
                message: format!("Invalid Priority: {s}"),
            }),
        }
    }
}

pub(crate) type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// A unit of queued work: a type-erased payload/callback pair, its
/// priority, and an optional coalescing key.
///
/// The payload and its strongly typed callback are captured together in a
/// closure at enqueue time, so no downcasting happens at delivery. An item
/// is consumed by its delivery; it exists only between enqueue and the
/// callback returning (or being replaced by a newer item with the same
/// key, for coalescing disciplines).
pub struct QueueItem {
    task: BoxedTask,
    priority: Priority,
    key: Option<String>,
}

impl QueueItem {
    /// Wrap `data` and `callback` into a dispatchable item.
    pub fn new<T, C>(data: T, callback: C, priority: Priority, key: Option<String>) -> Self
    where
        T: Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        Self {
            task: Box::new(move || callback(data)),
            priority,
            key,
        }
    }

    /// The priority supplied at enqueue time.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The coalescing key, if one was supplied.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Consume the item, invoking its callback with the captured payload.
    pub(crate) fn run(self) {
        (self.task)()
    }
}

impl fmt::Debug for QueueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItem")
            .field("priority", &self.priority)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
