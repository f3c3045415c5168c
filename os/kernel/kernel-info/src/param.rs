//! # Sizing Parameters

/// Maximum number of CPUs.
pub const NCPU: usize = 8;

/// Maximum number of blocks any single filesystem operation writes.
pub const MAXOPBLOCKS: usize = 10;

/// Number of buffers in the block cache.
pub const NBUF: usize = MAXOPBLOCKS * 3;

/// Number of independently locked buffer cache buckets. Prime, so that
/// strided block numbers still spread across buckets.
pub const NBUCKET: usize = 13;

/// Size of a disk block in bytes.
pub const BSIZE: usize = 1024;

/// Number of mapping-region slots per process.
pub const NVMA: usize = 16;

const _: () = {
    assert!(NCPU > 0);
    assert!(NBUF >= NBUCKET);
    assert!(BSIZE.is_power_of_two());
    assert!(NVMA > 0);
};
