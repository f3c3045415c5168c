use crate::SyncOnceCell;
use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

static YIELD: SyncOnceCell<fn()> = SyncOnceCell::new();

/// Installs the scheduler's "give up the CPU" primitive used by waiting
/// [`SleepLock`] callers. Only the first call wins.
///
/// # Errors
/// Returns the rejected hook if one was already installed.
pub fn install_yield_hook(hook: fn()) -> Result<(), fn()> {
    YIELD.set(hook)
}

#[inline]
fn relinquish() {
    match YIELD.get() {
        Some(yield_now) => yield_now(),
        None => spin_loop(),
    }
}

/// Blocking mutual exclusion for long-held resources.
///
/// Unlike [`SpinLock`](crate::SpinLock), interrupts stay enabled while the
/// lock is held and a waiter hands the processor back to the scheduler
/// instead of burning it. The guard is the only proof of ownership: code
/// that requires the lock to be held takes a guard (or something wrapping
/// one) rather than checking at run time.
pub struct SleepLock<T> {
    locked: AtomicBool,
    inner: UnsafeCell<T>,
}

// Safety: mutual exclusion; only T: Send may cross threads.
unsafe impl<T: Send> Sync for SleepLock<T> {}

impl<T> SleepLock<T> {
    pub const fn new(inner: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(inner),
        }
    }

    /// Acquire the lock, yielding the CPU while another holder has it.
    ///
    /// Must not be called with a spinlock held.
    pub fn lock(&self) -> SleepLockGuard<'_, T> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            relinquish();
        }
        SleepLockGuard { lock: self }
    }

    #[inline]
    pub fn try_lock(&self) -> Option<SleepLockGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then(|| SleepLockGuard { lock: self })
    }

    /// Whether anyone currently holds the lock. Racy; diagnostics only.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

pub struct SleepLockGuard<'a, T> {
    lock: &'a SleepLock<T>,
}

impl<T> Deref for SleepLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.inner.get() }
    }
}

impl<T> DerefMut for SleepLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.inner.get() }
    }
}

impl<T> Drop for SleepLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
