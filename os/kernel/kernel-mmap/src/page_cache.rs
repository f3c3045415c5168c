use alloc::collections::BTreeMap;
use kernel_memory_addresses::PhysicalPage;

/// Per-inode table of pages shared by every `Shared` mapping of the file.
///
/// Keys are page-aligned file offsets. Lives inside the inode and is only
/// reached through [`LockedInode::shared_pages`](crate::LockedInode::shared_pages),
/// so the inode lock serializes lookups and inserts across processes.
///
/// # Invariants
/// - A cached page holds the file's bytes at its offset, plus any writes
///   made through shared mappings that are not yet written back.
/// - Pages are only freed once `sharers` drops to zero.
#[derive(Debug, Default)]
pub struct SharedPages {
    pages: BTreeMap<u64, PhysicalPage>,
    sharers: u32,
}

impl SharedPages {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pages: BTreeMap::new(),
            sharers: 0,
        }
    }

    #[must_use]
    pub fn get(&self, offset: u64) -> Option<PhysicalPage> {
        self.pages.get(&offset).copied()
    }

    /// Cache `page` for `offset`.
    ///
    /// # Panics
    /// If `offset` already has a page; publishing happens under the inode
    /// lock right after a miss, so a second page means a lost update.
    pub fn publish(&mut self, offset: u64, page: PhysicalPage) {
        if let Some(old) = self.pages.insert(offset, page) {
            panic!("shared page for offset {offset:#x} published twice ({old}, {page})");
        }
    }

    pub const fn add_sharer(&mut self) {
        self.sharers += 1;
    }

    /// Drop one sharer and return how many remain.
    ///
    /// # Panics
    /// If there were none.
    pub fn remove_sharer(&mut self) -> u32 {
        self.sharers = self
            .sharers
            .checked_sub(1)
            .unwrap_or_else(|| panic!("shared pages: sharer count underflow"));
        self.sharers
    }

    #[must_use]
    pub const fn sharers(&self) -> u32 {
        self.sharers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Empty the table, yielding every cached page.
    pub fn drain(&mut self) -> impl Iterator<Item = PhysicalPage> + use<> {
        core::mem::take(&mut self.pages).into_values()
    }
}
