use kernel_memory_addresses::VirtualAddress;

/// Rejected [`map`](crate::Mappings::map) or
/// [`unmap`](crate::Mappings::unmap) request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MmapError {
    #[error("mapping length must not be zero")]
    InvalidLength,
    #[error("file offset {0:#x} is not page aligned")]
    UnalignedOffset(u64),
    #[error("shared writable mapping of a file not opened for writing")]
    NotWritable,
    #[error("readable mapping of a file not opened for reading")]
    NotReadable,
    #[error("unmap address {0:?} is not page aligned")]
    UnalignedAddress(VirtualAddress),
}

/// Why a page fault could not be resolved by the mapping layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FaultError {
    /// No region covers the address; the fault belongs to someone else.
    #[error("no mapping covers {0:?}")]
    NotMapped(VirtualAddress),
    /// The region covers the address but the file ends before this page.
    #[error("file offset {offset:#x} is beyond the end of the file ({size} bytes)")]
    BeyondEndOfFile { offset: u64, size: u64 },
    #[error("out of physical memory")]
    OutOfMemory,
    /// The page is already present, so the access violated the region's
    /// protection instead of missing a page.
    #[error("{0:?} is present; the access violates the mapping's protection")]
    Protection(VirtualAddress),
}
