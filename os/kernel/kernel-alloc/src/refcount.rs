//! # Reference-counted page allocator
//!
//! One free list behind a [`SpinLock`] plus one atomic counter per managed
//! page. A page allocated by [`alloc_page`](PageAllocator::alloc_page)
//! starts with a count of one; copy-on-write code calls
//! [`share`](RefCountedFrameAlloc::share) for every additional holder and
//! each holder eventually calls
//! [`free_page`](PageAllocator::free_page). Only the call that takes the
//! count from one to zero puts the page back on the free list.
//!
//! ## Counter synchronization
//!
//! Increments and decrements are single atomic read-modify-write operations,
//! so two concurrent releases can never both observe the last reference.
//! [`is_uniquely_owned`](RefCountedFrameAlloc::is_uniquely_owned) is a plain
//! load: a holder that sees `1` is the only holder (nobody else can add a
//! reference to a page they do not hold), and a stale `> 1` only costs an
//! unnecessary copy.

use crate::frame_alloc::{PageAllocator, PhysRange};
use crate::free_list::FreeList;
use alloc::boxed::Box;
use core::sync::atomic::{AtomicU32, Ordering};
use kernel_info::memory::{ALLOC_JUNK, FREE_JUNK};
use kernel_memory_addresses::PhysicalPage;
use kernel_sync::SpinLock;
use kernel_vmem::PhysMapper;
use log::{debug, info};

pub struct RefCountedFrameAlloc<M> {
    mapper: M,
    range: PhysRange,
    free: SpinLock<FreeList>,
    refs: Box<[AtomicU32]>,
}

impl<M: PhysMapper> RefCountedFrameAlloc<M> {
    /// Take ownership of every page in `range` and put it on the free list.
    ///
    /// Each page gets a count of one and is then released through the normal
    /// path, so it is junk-filled like any other freed page.
    ///
    /// # Safety
    /// - `range` must be RAM that nothing else uses, now or later.
    /// - `mapper` must make every page of `range` writable.
    pub unsafe fn new(mapper: M, range: PhysRange) -> Self {
        let refs = (0..range.pages()).map(|_| AtomicU32::new(1)).collect();
        let this = Self {
            mapper,
            range,
            free: SpinLock::new(FreeList::new()),
            refs,
        };
        for page in range.iter() {
            this.release(page);
        }
        info!("refcounted page allocator: {} pages in {range:?}", range.pages());
        this
    }

    /// Register one more holder of the allocated `page`.
    ///
    /// # Panics
    /// If `page` is outside the managed range or currently free.
    pub fn share(&self, page: PhysicalPage) {
        let i = self.range.index_of(page, "share");
        let shared = self.refs[i].fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
            if c == 0 { None } else { c.checked_add(1) }
        });
        assert!(shared.is_ok(), "share: {page} is not allocated");
    }

    /// Whether exactly one holder references `page`.
    ///
    /// Deliberately unsynchronized; see the module documentation.
    #[must_use]
    pub fn is_uniquely_owned(&self, page: PhysicalPage) -> bool {
        let i = self.range.index_of(page, "is_uniquely_owned");
        self.refs[i].load(Ordering::Relaxed) == 1
    }

    /// Current number of holders of `page` (zero while it is free).
    #[must_use]
    pub fn ref_count(&self, page: PhysicalPage) -> u32 {
        let i = self.range.index_of(page, "ref_count");
        self.refs[i].load(Ordering::Acquire)
    }

    /// Number of pages on the free list.
    #[must_use]
    pub fn free_pages(&self) -> usize {
        self.free.lock().len()
    }

    #[must_use]
    pub const fn range(&self) -> PhysRange {
        self.range
    }

    fn release(&self, page: PhysicalPage) {
        let i = self.range.index_of(page, "free_page");
        let previous = self.refs[i].fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
        match previous {
            Ok(1) => {}
            Ok(_) => return,
            Err(_) => panic!("free_page: {page} has no references"),
        }

        // SAFETY: the count just reached zero, so this caller was the last holder.
        unsafe {
            self.mapper.fill_page(page, FREE_JUNK);
            self.free.lock().push(&self.mapper, page);
        }
    }
}

impl<M: PhysMapper + Sync> PageAllocator for RefCountedFrameAlloc<M> {
    fn alloc_page(&self) -> Option<PhysicalPage> {
        // SAFETY: only pages owned by this allocator are ever pushed.
        let popped = unsafe { self.free.lock().pop(&self.mapper) };
        let Some(page) = popped else {
            debug!("refcounted page allocator: out of pages");
            return None;
        };

        // SAFETY: the page left the free list, so this caller owns it.
        unsafe { self.mapper.fill_page(page, ALLOC_JUNK) };
        let i = self.range.index_of(page, "alloc_page");
        self.refs[i].store(1, Ordering::Release);
        Some(page)
    }

    fn free_page(&self, page: PhysicalPage) {
        self.release(page);
    }
}
