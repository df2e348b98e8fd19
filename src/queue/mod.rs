//! Priority dispatch queues, storage disciplines, and the coalescing throttle

mod coalescing;
mod engine;
mod fifo;
mod item;
mod throttle;

#[cfg(test)]
mod tests;

pub use coalescing::PriorityCoalescingMap;
pub use engine::{DispatchQueue, QueueDiscipline};
pub use fifo::PriorityFifo;
pub use item::{Priority, QueueItem};
pub use throttle::CoalescingThrottle;
