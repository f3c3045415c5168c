use core::{
    cell::UnsafeCell,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const SET: u8 = 2;

/// Write-once cell for process-wide kernel state: interrupt and yield
/// hooks, the global page allocator. Filled explicitly during boot and
/// never torn down, so there is no `Drop` for the value.
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    slot: UnsafeCell<MaybeUninit<T>>,
}

// Safety: the value is written once, before `SET` is published, and only
// read afterwards.
unsafe impl<T: Sync + Send> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            slot: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Store `value` if the cell is still empty.
    ///
    /// # Errors
    /// Hands `value` back if another caller got there first, even one that
    /// has not finished writing yet.
    pub fn set(&self, value: T) -> Result<(), T> {
        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(value);
        }
        // SAFETY: winning the exchange makes this the only writer.
        unsafe { (*self.slot.get()).write(value) };
        self.state.store(SET, Ordering::Release);
        Ok(())
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: `SET` is stored only after the write completed.
        self.is_initialized()
            .then(|| unsafe { (*self.slot.get()).assume_init_ref() })
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == SET
    }
}
