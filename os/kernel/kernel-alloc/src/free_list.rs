//! Intrusive LIFO list of free pages.

use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};
use kernel_vmem::PhysMapper;

/// Link stored in the first word of every **free** page.
///
/// ```text
/// +--------------+--------------------------------+
/// | next (u64)   |   rest of the page (junk)      |
/// +--------------+--------------------------------+
/// ^ page base
/// ```
#[repr(C)]
struct FreeNode {
    /// Physical base of the next free page, or [`NIL`].
    next: u64,
}

/// Marks the end of the list; never a page base since it is not aligned.
const NIL: u64 = u64::MAX;

/// Stack of free pages threaded through the pages themselves.
///
/// # Invariants
/// - Every page on the list is owned by the list; nobody else reads or
///   writes it until it is popped.
/// - `len` equals the number of pages reachable from `head`.
#[derive(Debug, Default)]
pub struct FreeList {
    head: Option<PhysicalPage>,
    len: usize,
}

impl FreeList {
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Put `page` on top of the list.
    ///
    /// # Safety
    /// - The caller gives up `page`: it must not be on any list and must not
    ///   be used again until popped.
    /// - `mapper` must make `page` writable.
    pub unsafe fn push<M: PhysMapper>(&mut self, mapper: &M, page: PhysicalPage) {
        let node = unsafe { mapper.phys_to_mut::<FreeNode>(page.base()) };
        node.next = self.head.map_or(NIL, |next| next.base().as_u64());
        self.head = Some(page);
        self.len += 1;
    }

    /// Take the most recently pushed page.
    ///
    /// # Safety
    /// `mapper` must be the one the pages were pushed with.
    pub unsafe fn pop<M: PhysMapper>(&mut self, mapper: &M) -> Option<PhysicalPage> {
        let page = self.head?;
        let node = unsafe { mapper.phys_to_mut::<FreeNode>(page.base()) };
        self.head = (node.next != NIL).then(|| PhysicalAddress::new(node.next).page());
        self.len -= 1;
        Some(page)
    }
}
