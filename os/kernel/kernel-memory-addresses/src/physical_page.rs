use crate::{PAGE_SHIFT, PAGE_SIZE, PhysicalAddress, align_down};
use core::fmt;

/// Base of a 4 KiB physical page.
///
/// ### Invariants
/// - The low [`PAGE_SHIFT`] bits of the base are always zero.
///
/// A `PhysicalPage` is what the page allocator hands out and takes back; its
/// identity is its address.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage(PhysicalAddress);

impl PhysicalPage {
    /// The page containing `pa`.
    #[inline]
    #[must_use]
    pub const fn containing(pa: PhysicalAddress) -> Self {
        Self(PhysicalAddress::new(align_down(pa.as_u64(), PAGE_SIZE)))
    }

    /// Returns `Some` only if `pa` already sits on a page boundary.
    #[inline]
    #[must_use]
    pub const fn from_aligned(pa: PhysicalAddress) -> Option<Self> {
        if pa.is_page_aligned() {
            Some(Self(pa))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.0
    }

    /// Page number of this page counted from `origin` (which must not be above it).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index_from(self, origin: PhysicalAddress) -> usize {
        ((self.0.as_u64() - origin.as_u64()) >> PAGE_SHIFT) as usize
    }

    /// The page `n` pages above this one.
    #[inline]
    #[must_use]
    pub const fn add_pages(self, n: u64) -> Self {
        Self(PhysicalAddress::new(self.0.as_u64() + (n << PAGE_SHIFT)))
    }
}

impl fmt::Display for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage({:#018X})", self.0.as_u64())
    }
}
