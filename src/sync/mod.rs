//! Low-lock primitives: spinlock, milestone counter, drain election

mod election;
mod milestone;
mod spin_lock;


pub use election::DrainGate;
pub use milestone::MilestoneCounter;
pub use spin_lock::{SpinLock, SpinLockGuard};
