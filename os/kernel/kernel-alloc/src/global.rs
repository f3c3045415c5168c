//! The kernel-wide page allocator.
//!
//! Boot code builds one of the allocators, leaks it to `'static` and hands it
//! to [`init`]. Everything else goes through [`alloc_page`] and
//! [`free_page`], or passes [`GlobalPageAllocator`] where a
//! [`PageAllocator`] is expected.

use crate::frame_alloc::PageAllocator;
use kernel_memory_addresses::PhysicalPage;
use kernel_sync::SyncOnceCell;
use log::info;

static ALLOCATOR: SyncOnceCell<&'static dyn PageAllocator> = SyncOnceCell::new();

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("the global page allocator is already initialized")]
pub struct AlreadyInitialized;

/// Install the kernel-wide allocator.
///
/// # Errors
/// [`AlreadyInitialized`] if an allocator was installed before; the first
/// one stays in place.
pub fn init(allocator: &'static dyn PageAllocator) -> Result<(), AlreadyInitialized> {
    ALLOCATOR.set(allocator).map_err(|_| AlreadyInitialized)?;
    info!("global page allocator installed");
    Ok(())
}

#[must_use]
pub fn is_initialized() -> bool {
    ALLOCATOR.is_initialized()
}

fn get() -> &'static dyn PageAllocator {
    match ALLOCATOR.get() {
        Some(allocator) => *allocator,
        None => panic!("page allocator used before init"),
    }
}

/// # Panics
/// If called before [`init`].
#[must_use]
pub fn alloc_page() -> Option<PhysicalPage> {
    get().alloc_page()
}

/// # Panics
/// If called before [`init`], or on any condition the installed allocator
/// panics on.
pub fn free_page(page: PhysicalPage) {
    get().free_page(page);
}

/// Zero-sized handle to the global allocator.
#[derive(Debug, Copy, Clone, Default)]
pub struct GlobalPageAllocator;

impl PageAllocator for GlobalPageAllocator {
    #[inline]
    fn alloc_page(&self) -> Option<PhysicalPage> {
        alloc_page()
    }

    #[inline]
    fn free_page(&self, page: PhysicalPage) {
        free_page(page);
    }
}
