use crate::{PAGE_SIZE, PhysicalPage};
use core::fmt;
use core::ops::{Add, AddAssign};

/// Physical memory address.
///
/// A thin wrapper around a `u64` that denotes **physical** addresses (RAM
/// managed by the page allocator). Like [`VirtualAddress`](super::VirtualAddress),
/// this type carries intent and prevents accidental VA/PA mix-ups.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pa = PhysicalAddress::new(0x8000_2042);
/// assert_eq!(pa.page().base().as_u64(), 0x8000_2000);
/// assert_eq!(pa.offset_in_page(), 0x42);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The page that contains this address (low bits cleared).
    #[inline]
    #[must_use]
    pub const fn page(self) -> PhysicalPage {
        PhysicalPage::containing(self)
    }

    /// Byte offset of this address within its page.
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

    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u64) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.as_u64())
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.as_u64())
    }
}

impl From<u64> for PhysicalAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<PhysicalPage> for PhysicalAddress {
    #[inline]
    fn from(value: PhysicalPage) -> Self {
        value.base()
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<u64> for PhysicalAddress {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}
