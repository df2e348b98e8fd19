//! Busy-spin mutual exclusion for sub-microsecond critical sections

use std::cell::UnsafeCell;
use std::hint;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Number of failed acquisition attempts before the waiter yields the
/// processor to the scheduler.
const SPINS_BEFORE_YIELD: u32 = 64;

/// A non-blocking, non-reentrant spinlock guarding a value of type `T`.
///
/// Intended for critical sections expected to last a handful of field
/// reads/writes; anything longer should use a blocking mutex instead.
/// Acquisition spins on a compare-and-swap and yields the thread after a
/// bounded number of failed attempts, so a briefly descheduled owner does
/// not burn a whole core on every waiter.
///
/// Not reentrant: a thread that calls [`SpinLock::lock`] while already
/// holding the guard deadlocks itself. There is no fairness guarantee
/// among waiters.
///
/// # Examples
///
/// ```
/// use dispatchq::SpinLock;
///
/// let lock = SpinLock::new(0u64);
/// *lock.lock() += 1;
/// assert_eq!(*lock.lock(), 1);
/// ```
#[derive(Debug)]
pub struct SpinLock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// The spinlock serializes all access to `data`, so sharing is sound
// whenever the payload itself can be sent between threads.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Create a new unlocked spinlock wrapping `value`.
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquire the lock, spinning until it is available.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        let mut spins: u32 = 0;
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            spins += 1;
            if spins >= SPINS_BEFORE_YIELD {
                spins = 0;
                thread::yield_now();
            } else {
                hint::spin_loop();
            }
        }
        SpinLockGuard { lock: self }
    }

    /// Attempt to acquire the lock without spinning.
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SpinLockGuard { lock: self })
    }

    /// Consume the lock and return the wrapped value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    /// Get mutable access without locking; safe because `&mut self`
    /// guarantees exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// RAII guard returned by [`SpinLock::lock`]; releases the lock on drop.
#[derive(Debug)]
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Holding the guard means the flag is set and no other reference exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
