use bitfield_struct::bitfield;
use kernel_vmem::PteFlags;

/// Access rights requested for a mapping.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct Protection {
    pub read: bool,
    pub write: bool,
    pub exec: bool,
    #[bits(29)]
    __: u32,
}

impl Protection {
    pub const NONE: Self = Self::new();
    pub const READ: Self = Self::new().with_read(true);
    pub const READ_WRITE: Self = Self::READ.with_write(true);

    /// Leaf flags for pages of a user mapping with these rights.
    #[must_use]
    pub const fn pte_flags(self) -> PteFlags {
        PteFlags::user_leaf()
            .with_readable(self.read())
            .with_writable(self.write())
            .with_executable(self.exec())
    }
}

/// Whether modifications are visible to other mappers and reach the file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sharing {
    Shared,
    Private,
}
