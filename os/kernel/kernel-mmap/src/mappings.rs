use crate::{FaultError, Inode, Journal, LockedInode, MmapError, OpenFile, Protection, Sharing, Transaction, Vma};
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use kernel_alloc::PageAllocator;
use kernel_info::memory::{MMAP_BASE, MMAP_LIMIT};
use kernel_info::param::NVMA;
use kernel_memory_addresses::{PAGE_SIZE, PhysicalPage, VirtualAddress, VirtualPage, align_up, page_round_up};
use kernel_vmem::{PhysMapper, TranslationTable};
use log::{debug, trace};

/// Kernel services an operation on [`Mappings`] draws on.
pub struct MmapEnv<'a, A: ?Sized, M, J: ?Sized> {
    pub pages: &'a A,
    pub mapper: &'a M,
    pub journal: &'a J,
}

impl<'a, A: ?Sized, M, J: ?Sized> MmapEnv<'a, A, M, J> {
    pub const fn new(pages: &'a A, mapper: &'a M, journal: &'a J) -> Self {
        Self { pages, mapper, journal }
    }
}

/// The file mappings of one process.
///
/// A fixed pool of region slots; `active` lists the slots in use in address
/// order (new regions are appended), `free` the unused ones.
pub struct Mappings<I> {
    slots: Box<[Option<Vma<I>>]>,
    active: Vec<usize>,
    free: Vec<usize>,
    base: VirtualAddress,
    limit: VirtualAddress,
}

impl<I: Inode> Default for Mappings<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Inode> Mappings<I> {
    /// [`NVMA`] slots placed between [`MMAP_BASE`] and [`MMAP_LIMIT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(NVMA, VirtualAddress::new(MMAP_BASE), VirtualAddress::new(MMAP_LIMIT))
    }

    /// `capacity` slots placed from `base` upwards; every region must end
    /// strictly below `limit`.
    #[must_use]
    pub fn with_layout(capacity: usize, base: VirtualAddress, limit: VirtualAddress) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            active: Vec::with_capacity(capacity),
            free: (0..capacity).rev().collect(),
            base,
            limit,
        }
    }

    /// Reserve `len` bytes of address space backed by `file` from `offset`
    /// on. No page is allocated or installed; that happens on first access.
    ///
    /// The hint is ignored: regions are always placed right after the last
    /// active one (or at the base of the mapping area).
    ///
    /// # Errors
    /// - [`MmapError::InvalidLength`] for a zero length.
    /// - [`MmapError::UnalignedOffset`] if `offset` is not page aligned.
    /// - [`MmapError::NotWritable`] for a writable shared mapping of a file
    ///   not opened for writing. Private writable mappings of such files are
    ///   allowed since their writes never reach the file.
    /// - [`MmapError::NotReadable`] for a readable mapping of a file not
    ///   opened for reading.
    ///
    /// # Panics
    /// If every slot is in use or the region would reach the end of the
    /// mapping area.
    pub fn map(
        &mut self,
        hint: Option<VirtualAddress>,
        len: u64,
        prot: Protection,
        sharing: Sharing,
        file: &Arc<OpenFile<I>>,
        offset: u64,
    ) -> Result<VirtualAddress, MmapError> {
        if len == 0 {
            return Err(MmapError::InvalidLength);
        }
        if !offset.is_multiple_of(PAGE_SIZE) {
            return Err(MmapError::UnalignedOffset(offset));
        }
        if prot.write() && sharing == Sharing::Shared && !file.writable() {
            return Err(MmapError::NotWritable);
        }
        if prot.read() && !file.readable() {
            return Err(MmapError::NotReadable);
        }

        let Some(slot) = self.free.pop() else {
            panic!("mmap: out of vma");
        };

        let start = self
            .active
            .last()
            .and_then(|&last| self.slots[last].as_ref())
            .map_or(self.base, |last| VirtualAddress::new(align_up(last.end.as_u64(), PAGE_SIZE)));
        let end = start
            .as_u64()
            .checked_add(len)
            .filter(|&end| end < self.limit.as_u64())
            .unwrap_or_else(|| panic!("mmap: out of address space"));

        if sharing == Sharing::Shared {
            file.inode().lock().shared_pages().add_sharer();
        }

        if let Some(hint) = hint {
            trace!("mmap: ignoring address hint {hint:?}");
        }
        debug!("mmap: [{start:?}, {:?}) {sharing:?} {prot:?} at offset {offset:#x}", VirtualAddress::new(end));

        self.slots[slot] = Some(Vma {
            start,
            end: VirtualAddress::new(end),
            prot,
            sharing,
            flags: prot.pte_flags(),
            file: Arc::clone(file),
            offset,
            installed: 0,
        });
        self.active.push(slot);
        Ok(start)
    }

    /// Resolve a page fault at `va` if it falls inside one of the regions.
    ///
    /// # Errors
    /// - [`FaultError::NotMapped`] if no region covers `va`; the caller
    ///   reports the fault as its own.
    /// - [`FaultError::Protection`] if the page is already present.
    /// - Whatever [`Vma::resolve_page`] fails with.
    ///
    /// # Panics
    /// If the translation cannot be installed.
    pub fn handle_fault<A, M, J, T>(
        &mut self,
        env: &MmapEnv<'_, A, M, J>,
        table: &mut T,
        va: VirtualAddress,
    ) -> Result<(), FaultError>
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
        T: TranslationTable + ?Sized,
    {
        let page = va.page();
        let slot = self.slot_of(page.base()).ok_or(FaultError::NotMapped(va))?;
        if table.lookup(page).is_some() {
            return Err(FaultError::Protection(va));
        }

        let vma = self.vma_mut(slot);
        let pa = vma.resolve_page(env, page.base())?;
        if let Err(e) = table.install(page, pa, vma.flags) {
            panic!("mmap: cannot install {page:?} -> {pa}: {e}");
        }
        vma.installed += 1;
        Ok(())
    }

    /// Unmap `[va, va + len)` (length rounded up to whole pages).
    ///
    /// Starting at a region's start trims it from the front; starting
    /// anywhere else trims everything from `va` to the region's end, since
    /// regions are never split. A `len` reaching past the region, however
    /// large, stops at the region's end. Private pages are freed. A region
    /// that becomes empty gives up its file reference and slot.
    ///
    /// Shared pages stay in the file's cache. Only pages of a *writable*
    /// shared region are written back before their translation is removed;
    /// a read-only shared region has nothing to write back.
    ///
    /// An address outside every region is not an error.
    ///
    /// # Errors
    /// [`MmapError::UnalignedAddress`] if `va` is not page aligned.
    ///
    /// # Panics
    /// If a page cannot be written back in full, or the bookkeeping of
    /// installed pages is inconsistent.
    pub fn unmap<A, M, J, T>(
        &mut self,
        env: &MmapEnv<'_, A, M, J>,
        table: &mut T,
        va: VirtualAddress,
        len: u64,
    ) -> Result<(), MmapError>
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
        T: TranslationTable + ?Sized,
    {
        if !va.is_page_aligned() {
            return Err(MmapError::UnalignedAddress(va));
        }
        let Some(slot) = self.slot_of(va) else {
            debug!("munmap: {va:?} is not mapped");
            return Ok(());
        };
        // clamped to the region first, so rounding up cannot overflow
        let len = page_round_up(len.min(self.vma_mut(slot).end - va));
        self.unmap_in(env, table, slot, va, len);
        Ok(())
    }

    /// Unmap every region, as on process exit.
    pub fn unmap_all<A, M, J, T>(&mut self, env: &MmapEnv<'_, A, M, J>, table: &mut T)
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
        T: TranslationTable + ?Sized,
    {
        while let Some(&slot) = self.active.first() {
            let vma = self.vma_mut(slot);
            let (start, len) = (vma.start, page_round_up(vma.len()));
            self.unmap_in(env, table, slot, start, len);
        }
    }

    fn unmap_in<A, M, J, T>(
        &mut self,
        env: &MmapEnv<'_, A, M, J>,
        table: &mut T,
        slot: usize,
        va: VirtualAddress,
        len: u64,
    ) where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
        T: TranslationTable + ?Sized,
    {
        let vma = self.vma_mut(slot);
        let (lo, hi) = if va == vma.start {
            let hi = vma.end.min(VirtualAddress::new(va.as_u64().saturating_add(len)));
            (va, hi)
        } else {
            (va, vma.end)
        };
        debug!("munmap: [{lo:?}, {hi:?}) of {vma:?}");

        let mut page = lo.page();
        while page.base() < hi {
            if let Some(pa) = table.lookup(page) {
                Self::release_page(env, table, vma, page, pa);
            }
            page = page.next();
        }

        if lo == vma.start {
            vma.offset += hi - lo;
            vma.start = hi;
        } else {
            vma.end = lo;
        }

        if vma.is_empty() {
            self.retire(env, slot);
        }
    }

    fn release_page<A, M, J, T>(env: &MmapEnv<'_, A, M, J>, table: &mut T, vma: &mut Vma<I>, page: VirtualPage, pa: PhysicalPage)
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
        T: TranslationTable + ?Sized,
    {
        match vma.sharing {
            Sharing::Shared => {
                if vma.prot.write() {
                    Self::write_back(env, vma, page, pa);
                }
                table.remove(page);
            }
            Sharing::Private => {
                table.remove(page);
                env.pages.free_page(pa);
            }
        }
        vma.installed = vma
            .installed
            .checked_sub(1)
            .unwrap_or_else(|| panic!("munmap: {page:?} was installed but not counted"));
    }

    /// Write the in-file part of a shared page back to the file.
    fn write_back<A, M, J>(env: &MmapEnv<'_, A, M, J>, vma: &Vma<I>, page: VirtualPage, pa: PhysicalPage)
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
    {
        let offset = vma.file_offset_of(page.base());
        let tx = Transaction::begin(env.journal);
        let mut inode = vma.file.inode().lock();
        #[allow(clippy::cast_possible_truncation)]
        let len = inode.size().saturating_sub(offset).min(PAGE_SIZE) as usize;
        // SAFETY: the page stays allocated while it is cached for the file.
        let bytes = unsafe { env.mapper.page_bytes(pa) };
        let written = inode.write(offset, &bytes[..len]);
        assert!(written == len, "munmap: short write back at offset {offset:#x} ({written} of {len} bytes)");
        trace!("munmap: wrote back {len} bytes of {page:?} at offset {offset:#x}");
        drop(inode);
        tx.end();
    }

    /// Tear down an emptied region and return its slot to the pool.
    fn retire<A, M, J>(&mut self, env: &MmapEnv<'_, A, M, J>, slot: usize)
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: Journal + ?Sized,
    {
        let Some(vma) = self.slots[slot].take() else {
            panic!("munmap: slot {slot} is not in use");
        };
        assert!(
            vma.installed == 0,
            "munmap: emptied region still has {} installed pages",
            vma.installed
        );

        if vma.sharing == Sharing::Shared {
            let mut inode = vma.file.inode().lock();
            let shared = inode.shared_pages();
            if shared.remove_sharer() == 0 {
                let mut freed = 0usize;
                for page in shared.drain() {
                    env.pages.free_page(page);
                    freed += 1;
                }
                debug!("munmap: last sharer gone, freed {freed} cached pages");
            }
        }

        let tx = Transaction::begin(env.journal);
        drop(vma);
        tx.end();

        self.active.retain(|&s| s != slot);
        self.free.push(slot);
    }

    fn slot_of(&self, va: VirtualAddress) -> Option<usize> {
        self.active
            .iter()
            .copied()
            .find(|&slot| self.slots[slot].as_ref().is_some_and(|vma| vma.contains(va)))
    }

    fn vma_mut(&mut self, slot: usize) -> &mut Vma<I> {
        match self.slots[slot].as_mut() {
            Some(vma) => vma,
            None => panic!("mmap: slot {slot} is not in use"),
        }
    }

    /// Active regions in address order.
    pub fn regions(&self) -> impl Iterator<Item = &Vma<I>> {
        self.active.iter().filter_map(|&slot| self.slots[slot].as_ref())
    }

    /// The region covering `va`, if any.
    #[must_use]
    pub fn find(&self, va: VirtualAddress) -> Option<&Vma<I>> {
        self.slot_of(va).and_then(|slot| self.slots[slot].as_ref())
    }

    /// Number of unused region slots.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }
}
