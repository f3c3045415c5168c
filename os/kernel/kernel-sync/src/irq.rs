use crate::SyncOnceCell;

/// Platform callbacks for masking interrupts on the current CPU.
///
/// The kernel installs these once during early boot (on x86-64 they wrap
/// `pushfq`/`cli` and `sti`). Until then, and always on the host,
/// [`IrqGuard`] does nothing.
#[derive(Copy, Clone)]
pub struct InterruptHooks {
    /// Masks interrupts and reports whether they were enabled before.
    pub disable: fn() -> bool,
    /// Unmasks interrupts.
    pub enable: fn(),
}

static HOOKS: SyncOnceCell<InterruptHooks> = SyncOnceCell::new();

/// Installs the interrupt hooks. Only the first call wins.
///
/// # Errors
/// Returns the rejected hooks if hooks were already installed.
pub fn install_interrupt_hooks(hooks: InterruptHooks) -> Result<(), InterruptHooks> {
    HOOKS.set(hooks)
}

/// RAII guard that masks interrupts on creation and restores them on drop.
///
/// `IrqGuard::new()` asks the platform to mask interrupts and remembers
/// whether they were enabled. On drop it unmasks them **only** if they were
/// previously enabled, so guards nest: the outermost guard restores.
///
/// Spinlocks take one of these before spinning so that an interrupt handler
/// on the same CPU can never try to re-acquire a lock its own CPU holds.
///
/// # Examples
///
/// ```
/// use kernel_sync::IrqGuard;
///
/// {
///     let _g = IrqGuard::new(); // interrupts masked here if hooks are installed
///     // critical section
/// }
/// // previous interrupt state restored here
/// ```
pub struct IrqGuard {
    /// Whether interrupts were enabled when the guard was created.
    were_enabled: bool,
}

impl Default for IrqGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqGuard {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let were_enabled = HOOKS.get().is_some_and(|h| (h.disable)());
        Self { were_enabled }
    }
}

impl Drop for IrqGuard {
    fn drop(&mut self) {
        if self.were_enabled
            && let Some(h) = HOOKS.get()
        {
            (h.enable)();
        }
    }
}
