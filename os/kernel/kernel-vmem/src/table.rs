use crate::PteFlags;
use kernel_memory_addresses::{PhysicalPage, VirtualPage};

/// Why a translation could not be installed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("virtual page {0:?} is already mapped")]
    AlreadyMapped(VirtualPage),
    #[error("out of memory while allocating an intermediate page table")]
    OutOfMemory,
}

/// One process' page table, seen one 4 KiB page at a time.
///
/// Implementations perform whatever TLB maintenance their architecture
/// requires before returning from [`install`](Self::install) or
/// [`remove`](Self::remove).
pub trait TranslationTable {
    /// Map `va` to `pa` with `flags`.
    ///
    /// # Errors
    /// [`MapError::AlreadyMapped`] if `va` already has a translation, or
    /// [`MapError::OutOfMemory`] if a table page could not be allocated.
    fn install(&mut self, va: VirtualPage, pa: PhysicalPage, flags: PteFlags) -> Result<(), MapError>;

    /// Drop the translation of `va`, returning the page it pointed at.
    /// The page is *not* freed.
    fn remove(&mut self, va: VirtualPage) -> Option<PhysicalPage>;

    /// The page `va` currently translates to, if any.
    fn lookup(&self, va: VirtualPage) -> Option<PhysicalPage>;
}
