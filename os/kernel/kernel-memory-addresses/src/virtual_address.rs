use crate::{PAGE_SIZE, VirtualPage};
use core::fmt;
use core::ops::{Add, AddAssign, Sub};

/// Virtual memory address.
///
/// A thin wrapper around a `u64` that denotes **virtual** addresses, i.e.
/// addresses that are translated through a process' page table.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The page that contains this address.
    #[inline]
    #[must_use]
    pub const fn page(self) -> VirtualPage {
        VirtualPage::containing(self)
    }

    #[inline]
    #[must_use]
    pub const fn offset_in_page(self) -> u64 {
        self.0 & (PAGE_SIZE - 1)
    }

    #[inline]
    #[must_use]
    pub const fn is_page_aligned(self) -> bool {
        self.offset_in_page() == 0
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:016X})", self.as_u64())
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.as_u64())
    }
}

impl From<u64> for VirtualAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<VirtualPage> for VirtualAddress {
    #[inline]
    fn from(value: VirtualPage) -> Self {
        value.base()
    }
}

impl Add<u64> for VirtualAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for VirtualAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

impl Sub for VirtualAddress {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Self) -> u64 {
        self.0 - rhs.0
    }
}
