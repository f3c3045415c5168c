//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for raw addresses and 4 KiB page bases used by the
//! page allocator, the buffer cache and the mapping subsystem.
//!
//! ## Overview
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`PhysicalAddress`] / [`PhysicalPage`] | Physical memory (RAM handed out by the page allocator). |
//! | [`VirtualAddress`] / [`VirtualPage`] | Addresses in a process' (page-table translated) address space. |
//!
//! All four are `#[repr(transparent)]` `u64` wrappers that are `Copy`, `Ord`
//! and `Hash`, so they can be used as map keys. Page types uphold the
//! invariant that the low [`PAGE_SHIFT`] bits are zero.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0x2000_1234);
//! let page = va.page();
//! assert_eq!(page.base().as_u64(), 0x2000_1000);
//! assert_eq!(va.offset_in_page(), 0x234);
//!
//! let pa = PhysicalAddress::new(0x8000_3000);
//! assert!(pa.is_page_aligned());
//! assert_eq!(PhysicalPage::from_aligned(pa), Some(pa.page()));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod physical_address;
mod physical_page;
mod virtual_address;
mod virtual_page;

pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
pub use virtual_address::VirtualAddress;
pub use virtual_page::VirtualPage;

/// Size of a page in bytes; the allocator's only granularity.
pub const PAGE_SIZE: u64 = 4096;

/// log2([`PAGE_SIZE`]), i.e. the number of in-page offset bits.
pub const PAGE_SHIFT: u32 = 12;

/// [`PAGE_SIZE`] as `usize`, for indexing byte buffers.
#[allow(clippy::cast_possible_truncation)]
pub const PAGE_BYTES: usize = PAGE_SIZE as usize;

const _: () = assert!(1 << PAGE_SHIFT == PAGE_SIZE);

/// Align `x` down to the nearest multiple of `a`.
///
/// ### Preconditions
/// - `a` must be **non-zero** and a **power of two**.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::align_down;
/// assert_eq!(align_down(0,      4096), 0);
/// assert_eq!(align_down(4095,   4096), 0);
/// assert_eq!(align_down(8191,   4096), 4096);
/// ```
#[inline(always)]
#[must_use]
pub const fn align_down(x: u64, a: u64) -> u64 {
    x & !(a - 1)
}

/// Align `x` up to the nearest multiple of `a`.
///
/// ### Preconditions
/// - `a` must be **non-zero** and a **power of two**.
/// - `x + (a - 1)` must **not overflow** `u64`.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::align_up;
/// assert_eq!(align_up(0,    4096), 0);
/// assert_eq!(align_up(1,    4096), 4096);
/// assert_eq!(align_up(4096, 4096), 4096);
/// assert_eq!(align_up(4097, 4096), 8192);
/// ```
#[inline(always)]
#[must_use]
pub const fn align_up(x: u64, a: u64) -> u64 {
    (x + a - 1) & !(a - 1)
}

/// Round `x` down to a page boundary.
#[inline(always)]
#[must_use]
pub const fn page_round_down(x: u64) -> u64 {
    align_down(x, PAGE_SIZE)
}

/// Round `x` up to a page boundary.
#[inline(always)]
#[must_use]
pub const fn page_round_up(x: u64) -> u64 {
    align_up(x, PAGE_SIZE)
}

/// Number of pages needed to cover `len` bytes.
#[inline(always)]
#[must_use]
pub const fn pages_spanning(len: u64) -> u64 {
    page_round_up(len) >> PAGE_SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_rounding() {
        assert_eq!(page_round_down(0x1fff), 0x1000);
        assert_eq!(page_round_up(0x1001), 0x2000);
        assert_eq!(page_round_up(0x2000), 0x2000);
    }

    #[test]
    fn pages_spanning_counts_partial_pages() {
        assert_eq!(pages_spanning(0), 0);
        assert_eq!(pages_spanning(1), 1);
        assert_eq!(pages_spanning(PAGE_SIZE), 1);
        assert_eq!(pages_spanning(3 * PAGE_SIZE - 10), 3);
    }

    #[test]
    fn split_and_join_virtual() {
        let va = VirtualAddress::new(0x0000_0040_0000_0abc);
        let page = va.page();
        assert_eq!(page.base().as_u64(), 0x0000_0040_0000_0000);
        assert_eq!(page.base() + va.offset_in_page(), va);
    }

    #[test]
    fn physical_page_requires_alignment() {
        assert!(PhysicalPage::from_aligned(PhysicalAddress::new(0x8000_0001)).is_none());
        let page = PhysicalPage::from_aligned(PhysicalAddress::new(0x8000_1000)).unwrap();
        assert_eq!(page.index_from(PhysicalAddress::new(0x8000_0000)), 1);
    }
}
