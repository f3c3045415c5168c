//! # Memory Layout

use kernel_memory_addresses::{PAGE_SIZE, page_round_down};

/// One beyond the highest user virtual address (Sv39 with the sign bit left clear).
pub const MAXVA: u64 = 1 << (9 + 9 + 9 + 12 - 1);

/// First virtual address handed out to file mappings; the upper half of the
/// user address space is reserved for them.
pub const MMAP_BASE: u64 = MAXVA >> 1;

/// File mappings must end strictly below this address. The two top pages hold
/// the trampoline and the trap frame.
pub const MMAP_LIMIT: u64 = page_round_down(MAXVA - 2 * PAGE_SIZE);

/// Fill pattern for freshly allocated pages, to surface reads of
/// uninitialized memory.
pub const ALLOC_JUNK: u8 = 5;

/// Fill pattern for released pages, to surface dangling references.
pub const FREE_JUNK: u8 = 1;

const _: () = {
    assert!(MMAP_BASE.is_multiple_of(PAGE_SIZE));
    assert!(MMAP_LIMIT > MMAP_BASE);
    assert!(MMAP_LIMIT < MAXVA);
    assert!(ALLOC_JUNK != 0 && ALLOC_JUNK != FREE_JUNK);
};
