use crate::{PAGE_SIZE, VirtualAddress, align_down};
use core::fmt;

/// Base of a 4 KiB virtual page; the unit a translation is installed for.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualPage(VirtualAddress);

impl VirtualPage {
    #[inline]
    #[must_use]
    pub const fn containing(va: VirtualAddress) -> Self {
        Self(VirtualAddress::new(align_down(va.as_u64(), PAGE_SIZE)))
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> VirtualAddress {
        self.0
    }

    /// The next page up.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(VirtualAddress::new(self.0.as_u64() + PAGE_SIZE))
    }
}

impl fmt::Display for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for VirtualPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPage({:#018X})", self.0.as_u64())
    }
}
