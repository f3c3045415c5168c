use crate::{FaultError, Inode, LockedInode, MmapEnv, OpenFile, Protection, Sharing};
use alloc::sync::Arc;
use core::fmt;
use kernel_alloc::PageAllocator;
use kernel_memory_addresses::{PAGE_SIZE, PhysicalPage, VirtualAddress, page_round_up};
use kernel_vmem::{PhysMapper, PteFlags};
use log::trace;

/// One mapped virtual range of a process and the file range behind it.
///
/// `[start, end)` may end mid-page; the page containing `end - 1` is still
/// fully backed.
pub struct Vma<I> {
    pub(crate) start: VirtualAddress,
    pub(crate) end: VirtualAddress,
    pub(crate) prot: Protection,
    pub(crate) sharing: Sharing,
    pub(crate) flags: PteFlags,
    pub(crate) file: Arc<OpenFile<I>>,
    /// File offset that `start` maps; page aligned.
    pub(crate) offset: u64,
    /// Pages of this region with a translation installed.
    pub(crate) installed: usize,
}

impl<I> Vma<I> {
    #[must_use]
    pub const fn start(&self) -> VirtualAddress {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> VirtualAddress {
        self.end
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[must_use]
    pub const fn protection(&self) -> Protection {
        self.prot
    }

    #[must_use]
    pub const fn sharing(&self) -> Sharing {
        self.sharing
    }

    #[must_use]
    pub const fn pte_flags(&self) -> PteFlags {
        self.flags
    }

    #[must_use]
    pub const fn file(&self) -> &Arc<OpenFile<I>> {
        &self.file
    }

    #[must_use]
    pub const fn file_offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub const fn installed_pages(&self) -> usize {
        self.installed
    }

    #[must_use]
    pub fn contains(&self, va: VirtualAddress) -> bool {
        va >= self.start && va < self.end
    }

    /// File offset backing the page that contains `va`.
    #[must_use]
    pub fn file_offset_of(&self, va: VirtualAddress) -> u64 {
        self.offset + (va.page().base() - self.start)
    }
}

impl<I: Inode> Vma<I> {
    /// Find or create the physical page holding the file page behind `va`.
    ///
    /// Shared regions first consult the inode's [`SharedPages`](crate::SharedPages);
    /// a miss (and every private fault) allocates a zeroed page, reads the
    /// file into it and, for shared regions, publishes it. All of this
    /// happens under the inode lock, which serializes concurrent faults on
    /// the same file page across processes.
    ///
    /// # Errors
    /// - [`FaultError::BeyondEndOfFile`] if the page starts at or after the
    ///   file size rounded up to a page.
    /// - [`FaultError::OutOfMemory`] if no page could be allocated.
    pub fn resolve_page<A, M, J>(&self, env: &MmapEnv<'_, A, M, J>, va: VirtualAddress) -> Result<PhysicalPage, FaultError>
    where
        A: PageAllocator + ?Sized,
        M: PhysMapper,
        J: ?Sized,
    {
        let offset = self.file_offset_of(va);
        let mut inode = self.file.inode().lock();
        let size = inode.size();
        if offset >= page_round_up(size) {
            return Err(FaultError::BeyondEndOfFile { offset, size });
        }

        if self.sharing == Sharing::Shared
            && let Some(page) = inode.shared_pages().get(offset)
        {
            trace!("mmap: {va:?} hits shared page {page} at offset {offset:#x}");
            return Ok(page);
        }

        let page = env.pages.alloc_page().ok_or(FaultError::OutOfMemory)?;
        // SAFETY: freshly allocated, nobody else can see it yet.
        let bytes = unsafe { env.mapper.page_bytes(page) };
        bytes.fill(0);
        #[allow(clippy::cast_possible_truncation)]
        let want = (size - offset).min(PAGE_SIZE) as usize;
        let got = inode.read(offset, &mut bytes[..want]);
        trace!("mmap: {va:?} read {got} bytes at offset {offset:#x} into {page}");

        if self.sharing == Sharing::Shared {
            inode.shared_pages().publish(offset, page);
        }
        Ok(page)
    }
}

impl<I> fmt::Debug for Vma<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vma")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("prot", &self.prot)
            .field("sharing", &self.sharing)
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("installed", &self.installed)
            .finish_non_exhaustive()
    }
}
