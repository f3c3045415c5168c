use kernel_memory_addresses::{PAGE_BYTES, PhysicalAddress, PhysicalPage};

/// Converts physical addresses to *temporarily* usable references in the
/// current virtual address space (e.g., via identity map or a higher-half
/// direct map, HHDM).
///
/// Typical patterns:
/// - **Kernel**: adds a constant offset (HHDM) before returning a pointer.
/// - **Tests**: offsets into a heap-allocated arena standing in for RAM.
pub trait PhysMapper {
    /// Convert a *physical* address to a usable mutable reference.
    ///
    /// # Safety
    /// - `pa` must be covered by the mapping this mapper describes and be
    ///   suitably aligned for `T`.
    /// - The caller must guarantee exclusive access for the lifetime `'a`.
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T;

    /// The bytes of a whole page.
    ///
    /// # Safety
    /// Same contract as [`phys_to_mut`](Self::phys_to_mut).
    #[inline]
    unsafe fn page_bytes<'a>(&self, page: PhysicalPage) -> &'a mut [u8; PAGE_BYTES] {
        unsafe { self.phys_to_mut::<[u8; PAGE_BYTES]>(page.base()) }
    }

    /// Overwrite every byte of `page` with `byte`.
    ///
    /// # Safety
    /// The caller must own `page` and nobody else may be reading it.
    #[inline]
    unsafe fn fill_page(&self, page: PhysicalPage, byte: u8) {
        unsafe { self.page_bytes(page) }.fill(byte);
    }
}
