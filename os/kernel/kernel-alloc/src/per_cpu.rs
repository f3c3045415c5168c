//! # Per-CPU page allocator
//!
//! Every CPU owns a free list behind its own [`SpinLock`]. Allocation takes
//! from the caller's list and, only when that is empty, steals a single page
//! from the siblings in round-robin order starting after the caller. Freeing
//! always returns the page to the caller's list, so pages migrate towards the
//! CPUs that release them.
//!
//! At most one list lock is held at any time, so two CPUs stealing from each
//! other cannot deadlock. The CPU id is read with interrupts masked and the
//! mask is kept for the whole operation, which keeps the caller on the CPU
//! whose list it is touching.

use crate::frame_alloc::{PageAllocator, PhysRange};
use crate::free_list::FreeList;
use alloc::boxed::Box;
use kernel_info::memory::{ALLOC_JUNK, FREE_JUNK};
use kernel_memory_addresses::PhysicalPage;
use kernel_sync::{IrqGuard, SpinLock};
use kernel_vmem::PhysMapper;
use log::{debug, info, trace};

/// Identity of the CPU executing the caller.
///
/// Only meaningful while interrupts are masked; the allocator holds an
/// [`IrqGuard`] around every call.
pub trait CpuLocal: Sync {
    /// Index of the current CPU, below the CPU count the allocator was built for.
    fn current_cpu(&self) -> usize;
}

pub struct PerCpuFrameAlloc<M, C> {
    mapper: M,
    cpus: C,
    range: PhysRange,
    lists: Box<[SpinLock<FreeList>]>,
}

impl<M: PhysMapper, C: CpuLocal> PerCpuFrameAlloc<M, C> {
    /// Build an allocator for `ncpu` CPUs and release every page of `range`
    /// onto the list of the CPU running the constructor.
    ///
    /// # Safety
    /// - `range` must be RAM that nothing else uses, now or later.
    /// - `mapper` must make every page of `range` writable.
    ///
    /// # Panics
    /// If `ncpu` is zero.
    pub unsafe fn new(mapper: M, cpus: C, range: PhysRange, ncpu: usize) -> Self {
        assert!(ncpu > 0, "per-CPU page allocator needs at least one CPU");
        let lists = (0..ncpu).map(|_| SpinLock::new(FreeList::new())).collect();
        let this = Self {
            mapper,
            cpus,
            range,
            lists,
        };
        for page in range.iter() {
            this.release(page);
        }
        info!("per-CPU page allocator: {} pages in {range:?} across {ncpu} CPUs", range.pages());
        this
    }

    /// Free pages currently on `cpu`'s list.
    #[must_use]
    pub fn free_pages_on(&self, cpu: usize) -> usize {
        self.lists[cpu].lock().len()
    }

    /// Free pages across all CPUs.
    #[must_use]
    pub fn free_pages(&self) -> usize {
        (0..self.lists.len()).map(|cpu| self.free_pages_on(cpu)).sum()
    }

    #[must_use]
    pub fn ncpu(&self) -> usize {
        self.lists.len()
    }

    #[must_use]
    pub const fn range(&self) -> PhysRange {
        self.range
    }

    fn current_cpu(&self) -> usize {
        let cpu = self.cpus.current_cpu();
        assert!(cpu < self.lists.len(), "cpu id {cpu} out of range");
        cpu
    }

    fn release(&self, page: PhysicalPage) {
        let _ = self.range.index_of(page, "free_page");
        let _irq = IrqGuard::new();
        let cpu = self.current_cpu();

        // SAFETY: the caller hands `page` back to the allocator.
        unsafe {
            self.mapper.fill_page(page, FREE_JUNK);
            self.lists[cpu].lock().push(&self.mapper, page);
        }
    }

    fn pop_from(&self, cpu: usize) -> Option<PhysicalPage> {
        // SAFETY: only pages owned by this allocator are ever pushed.
        unsafe { self.lists[cpu].lock().pop(&self.mapper) }
    }
}

impl<M: PhysMapper + Sync, C: CpuLocal> PageAllocator for PerCpuFrameAlloc<M, C> {
    fn alloc_page(&self) -> Option<PhysicalPage> {
        let _irq = IrqGuard::new();
        let me = self.current_cpu();
        let n = self.lists.len();

        let page = self.pop_from(me).or_else(|| {
            (1..n).map(|k| (me + k) % n).find_map(|victim| {
                let stolen = self.pop_from(victim);
                if stolen.is_some() {
                    trace!("cpu {me}: stole a page from cpu {victim}");
                }
                stolen
            })
        });

        let Some(page) = page else {
            debug!("per-CPU page allocator: out of pages on every CPU");
            return None;
        };

        // SAFETY: the page left the free list, so this caller owns it.
        unsafe { self.mapper.fill_page(page, ALLOC_JUNK) };
        Some(page)
    }

    fn free_page(&self, page: PhysicalPage) {
        self.release(page);
    }
}
