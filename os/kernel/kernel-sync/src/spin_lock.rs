use crate::IrqGuard;
use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// Busy-waiting lock that masks interrupts while held.
///
/// Hold it only for short, non-blocking sections such as free list or
/// bucket manipulation. Never call anything that can sleep (such as
/// [`SleepLock::lock`](crate::SleepLock::lock)) while a guard is alive.
pub struct SpinLock<T> {
    held: AtomicBool,
    value: UnsafeCell<T>,
}

// Safety: mutual exclusion; only T: Send may cross threads.
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            held: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    #[inline]
    fn claim(&self) -> bool {
        self.held
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Mask interrupts, then spin until the lock is ours.
    ///
    /// Waiters spin on a plain load and only retry the exchange once the
    /// lock looks free, so the cache line is not hammered while contended.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        let irq = IrqGuard::new();
        while !self.claim() {
            while self.held.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
        SpinLockGuard { lock: self, _irq: irq }
    }

    /// Take the lock only if nobody holds it.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        let irq = IrqGuard::new();
        let won = self
            .held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok();
        // on failure `irq` drops here and restores the interrupt state
        won.then(|| SpinLockGuard { lock: self, _irq: irq })
    }

    /// Racy; diagnostics and tests only.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.held.load(Ordering::Relaxed)
    }

    /// Access without locking, for setup code that still owns the lock.
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

/// Proof that a [`SpinLock`] is held.
///
/// Fields drop in declaration order: the lock is released before the
/// interrupt state is restored.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
    _irq: IrqGuard,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}
