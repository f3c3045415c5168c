//! The page allocator interface and the managed physical range.

use core::fmt;
use kernel_memory_addresses::{
    PAGE_SHIFT, PAGE_SIZE, PhysicalAddress, PhysicalPage, page_round_down, page_round_up,
};

/// Hands out and takes back whole 4 KiB pages of RAM.
///
/// Object safe and shared: one instance serves every CPU, so all methods
/// take `&self` and implementations synchronize internally.
pub trait PageAllocator: Sync {
    /// Allocate one page, filled with
    /// [`ALLOC_JUNK`](kernel_info::memory::ALLOC_JUNK).
    ///
    /// Returns `None` when no page is free anywhere; callers treat that as a
    /// recoverable out-of-memory condition.
    fn alloc_page(&self) -> Option<PhysicalPage>;

    /// Give a page back.
    ///
    /// # Panics
    /// If `page` lies outside the managed range. Releasing a page that was
    /// never allocated corrupts the allocator and is not detected.
    fn free_page(&self, page: PhysicalPage);
}

impl<A: PageAllocator + ?Sized> PageAllocator for &A {
    #[inline]
    fn alloc_page(&self) -> Option<PhysicalPage> {
        (**self).alloc_page()
    }

    #[inline]
    fn free_page(&self, page: PhysicalPage) {
        (**self).free_page(page);
    }
}

/// Half-open run of whole pages `[start, end)` an allocator manages.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct PhysRange {
    start: PhysicalPage,
    end: PhysicalAddress,
}

impl PhysRange {
    /// The whole pages inside `[start, end)`: `start` is rounded up and `end`
    /// rounded down, the way boot code trims the region after the kernel
    /// image.
    #[must_use]
    pub const fn new(start: PhysicalAddress, end: PhysicalAddress) -> Self {
        let first = page_round_up(start.as_u64());
        let mut last = page_round_down(end.as_u64());
        if last < first {
            last = first;
        }
        Self {
            start: PhysicalPage::containing(PhysicalAddress::new(first)),
            end: PhysicalAddress::new(last),
        }
    }

    /// `pages` whole pages starting at the page-aligned `start`.
    #[must_use]
    pub const fn with_pages(start: PhysicalAddress, pages: usize) -> Self {
        Self::new(start, PhysicalAddress::new(start.as_u64() + pages as u64 * PAGE_SIZE))
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> PhysicalPage {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        self.end
    }

    /// Number of pages in the range.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn pages(&self) -> usize {
        ((self.end.as_u64() - self.start.base().as_u64()) >> PAGE_SHIFT) as usize
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, page: PhysicalPage) -> bool {
        let pa = page.base().as_u64();
        pa >= self.start.base().as_u64() && pa < self.end.as_u64()
    }

    /// Index of `page` within the range.
    ///
    /// # Panics
    /// If `page` is not inside the range; `who` names the caller in the
    /// message.
    #[inline]
    #[must_use]
    pub fn index_of(&self, page: PhysicalPage, who: &str) -> usize {
        assert!(self.contains(page), "{who}: {page} is not a managed page ({self:?})");
        page.index_from(self.start.base())
    }

    /// Every page of the range, lowest first.
    pub fn iter(&self) -> impl Iterator<Item = PhysicalPage> + use<> {
        let start = self.start;
        (0..self.pages() as u64).map(move |i| start.add_pages(i))
    }
}

impl fmt::Debug for PhysRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
