use crate::SharedPages;
use alloc::sync::Arc;

/// A file system inode as seen by the mapping layer.
///
/// Reference counting is `Arc`'s: cloning the handle is `dup`, dropping the
/// last one is `put`.
pub trait Inode: Send + Sync {
    /// Proof that the inode's sleep-lock is held.
    type Locked<'a>: LockedInode
    where
        Self: 'a;

    /// Acquire the inode's sleep-lock. May block.
    fn lock(&self) -> Self::Locked<'_>;
}

/// Operations that require the inode lock.
pub trait LockedInode {
    /// Current file size in bytes.
    fn size(&self) -> u64;

    /// Copy file bytes starting at `offset` into `dst`; returns how many
    /// bytes were read, which is short only at the end of the file.
    fn read(&mut self, offset: u64, dst: &mut [u8]) -> usize;

    /// Write `src` at `offset`; returns how many bytes were written.
    /// Must be called inside a journal transaction.
    fn write(&mut self, offset: u64, src: &[u8]) -> usize;

    /// The file's cache of pages shared by its mappers.
    fn shared_pages(&mut self) -> &mut SharedPages;
}

/// An open file: an inode plus the access mode it was opened with.
pub struct OpenFile<I> {
    inode: Arc<I>,
    readable: bool,
    writable: bool,
}

impl<I> OpenFile<I> {
    pub const fn new(inode: Arc<I>, readable: bool, writable: bool) -> Self {
        Self {
            inode,
            readable,
            writable,
        }
    }

    #[must_use]
    pub const fn inode(&self) -> &Arc<I> {
        &self.inode
    }

    #[must_use]
    pub const fn readable(&self) -> bool {
        self.readable
    }

    #[must_use]
    pub const fn writable(&self) -> bool {
        self.writable
    }
}
