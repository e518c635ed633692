//! Low-level synchronization that works before the runtime is up.
//!
//! [`SpinLock`] guards regions that run before any runtime-provided lock can
//! be assumed to exist, such as runtime bring-up itself. It is not re-entrant,
//! not fair, and has no timeout. Keep the guarded region short.

use std::sync::atomic::{AtomicU32, Ordering};

const FREE: u32 = 0;
const HELD: u32 = 1;

/// A busy-wait lock over a single atomic word.
///
/// # Example
///
/// ```
/// use redlilium_core::sync::SpinLock;
///
/// static LOCK: SpinLock = SpinLock::new();
///
/// {
///     let _region = LOCK.enter();
///     assert!(LOCK.is_held());
/// }
/// assert!(!LOCK.is_held());
/// ```
#[derive(Debug)]
pub struct SpinLock {
    word: AtomicU32,
}

impl SpinLock {
    /// Create an unlocked spin lock.
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(FREE),
        }
    }

    /// Enter the critical region, spinning until the lock is free.
    ///
    /// The processor is yielded between attempts. The region is left when the
    /// returned guard is dropped, on every exit path.
    pub fn enter(&self) -> CriticalRegion<'_> {
        loop {
            // Only attempt the swap once the word looks free
            if self.word.load(Ordering::Relaxed) == FREE
                && self
                    .word
                    .compare_exchange(FREE, HELD, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                return CriticalRegion { lock: self };
            }
            std::thread::yield_now();
        }
    }

    /// Try to enter the critical region without spinning.
    pub fn try_enter(&self) -> Option<CriticalRegion<'_>> {
        self.word
            .compare_exchange(FREE, HELD, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| CriticalRegion { lock: self })
    }

    /// Check whether some thread is inside the region (for diagnostics only).
    pub fn is_held(&self) -> bool {
        self.word.load(Ordering::Relaxed) == HELD
    }

    fn leave(&self) {
        self.word.store(FREE, Ordering::Release);
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped ownership of a [`SpinLock`].
///
/// Writes made while the region is held are visible to the next thread that
/// enters it.
#[must_use = "the critical region is left as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CriticalRegion<'a> {
    lock: &'a SpinLock,
}

impl Drop for CriticalRegion<'_> {
    fn drop(&mut self) {
        self.lock.leave();
    }
}
