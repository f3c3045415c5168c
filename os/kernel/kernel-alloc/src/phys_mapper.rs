//! # Offset-based PhysMapper
//!
//! With a higher-half direct map (HHDM) every physical address is visible at
//! `HHDM_BASE + pa`; with an identity map the offset is zero. Hosted tests
//! use the same shape: a heap arena that *pretends* to start at some
//! physical base is reachable at `arena - base + pa`.
//!
//! ## Example
//! ```rust
//! use kernel_alloc::phys_mapper::OffsetPhysMapper;
//! use kernel_memory_addresses::PhysicalAddress;
//! use kernel_vmem::PhysMapper;
//!
//! let mut word = 0u64;
//! let pa = PhysicalAddress::new(0x1000);
//! let mapper = OffsetPhysMapper::for_arena((&raw mut word).cast(), pa);
//! unsafe { *mapper.phys_to_mut::<u64>(pa) = 7 };
//! assert_eq!(word, 7);
//! ```

use kernel_memory_addresses::PhysicalAddress;
use kernel_vmem::PhysMapper;

/// [`PhysMapper`] that adds a fixed offset to every physical address.
///
/// # Safety
/// - The mapping must be present and cover the referenced physical range.
/// - References handed out must only be used for valid, writable memory.
#[derive(Copy, Clone, Debug)]
pub struct OffsetPhysMapper {
    offset: u64,
}

impl OffsetPhysMapper {
    /// Physical memory is visible at `pa + offset` (wrapping).
    #[must_use]
    pub const fn new(offset: u64) -> Self {
        Self { offset }
    }

    /// Physical memory is identity mapped.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(0)
    }

    /// The memory at `virt` stands in for physical address `phys`.
    #[must_use]
    pub fn for_arena(virt: *mut u8, phys: PhysicalAddress) -> Self {
        Self::new((virt as u64).wrapping_sub(phys.as_u64()))
    }
}

impl PhysMapper for OffsetPhysMapper {
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        let va = pa.as_u64().wrapping_add(self.offset) as *mut T;
        // SAFETY: Caller must ensure the physical address is valid and covered by the mapping.
        unsafe { &mut *va }
    }
}
