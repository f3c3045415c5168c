use bitfield_struct::bitfield;

/// Leaf permission bits of a single 4 KiB translation.
///
/// Bit positions follow the common RISC-V Sv39 layout; architectures with a
/// different encoding translate these in their [`TranslationTable`] impl.
///
/// [`TranslationTable`]: crate::TranslationTable
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct PteFlags {
    /// **Valid** (bit 0): the translation exists.
    pub valid: bool,

    /// **Readable** (bit 1).
    pub readable: bool,

    /// **Writable** (bit 2). Meaningless without `readable` on most MMUs.
    pub writable: bool,

    /// **Executable** (bit 3).
    pub executable: bool,

    /// **User** (bit 4): accessible from user mode.
    pub user: bool,

    #[bits(59)]
    __: u64,
}

impl PteFlags {
    /// A valid user-mode leaf with no access rights yet.
    #[inline]
    #[must_use]
    pub const fn user_leaf() -> Self {
        Self::new().with_valid(true).with_user(true)
    }

    /// Whether any of read, write or execute is granted.
    #[inline]
    #[must_use]
    pub const fn grants_access(self) -> bool {
        self.readable() || self.writable() || self.executable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_positions() {
        let f = PteFlags::user_leaf().with_readable(true).with_writable(true);
        assert_eq!(f.into_bits(), 0b1_0111);
        assert!(f.grants_access());
        assert!(!PteFlags::user_leaf().grants_access());
    }

    #[test]
    fn executable_only() {
        let f = PteFlags::new().with_executable(true);
        assert_eq!(f.into_bits(), 1 << 3);
        assert_ne!(f, PteFlags::new());
    }
}
