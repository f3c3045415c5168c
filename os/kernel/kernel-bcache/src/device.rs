use core::fmt;
use kernel_info::param::BSIZE;

/// Identity of a cached block: device number and block number on it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BlockKey {
    pub dev: u32,
    pub blockno: u32,
}

impl BlockKey {
    #[must_use]
    pub const fn new(dev: u32, blockno: u32) -> Self {
        Self { dev, blockno }
    }
}

impl fmt::Debug for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dev, self.blockno)
    }
}

/// Synchronous block storage underneath the cache (a virtio disk, a RAM
/// disk, a test fake).
///
/// Both calls complete before returning. The cache serializes accesses to
/// any single block, but different blocks may be transferred concurrently.
pub trait BlockDevice: Send + Sync {
    /// Fill `data` with the contents of block `key`.
    fn read_block(&self, key: BlockKey, data: &mut [u8; BSIZE]);

    /// Persist `data` as the new contents of block `key`.
    fn write_block(&self, key: BlockKey, data: &[u8; BSIZE]);
}
