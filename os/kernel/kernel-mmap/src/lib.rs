//! # Memory-Mapped Files
//!
//! Lazy, demand-paged file mappings for user processes.
//!
//! [`Mappings::map`] only reserves a virtual range and records what backs
//! it; no physical page is touched. The first access to each page faults,
//! and [`Mappings::handle_fault`] reads the corresponding file page into a
//! fresh physical page (or finds it in the file's cache) and installs the
//! translation. [`Mappings::unmap`] reverses this page by page.
//!
//! ## Shared and private mappings
//!
//! ```text
//!  process A            inode (locked)                 process B
//!  ┌────────┐      ┌───────────────────────┐      ┌────────┐
//!  │ shared │─────▶│ SharedPages            │◀─────│ shared │
//!  │  VMA   │      │  offset → page, sharers│      │  VMA   │
//!  └────────┘      └───────────────────────┘      └────────┘
//!  ┌────────┐
//!  │private │──▶ its own pages, never published, never written back
//!  │  VMA   │
//!  └────────┘
//! ```
//!
//! Shared mappings of a file converge on one physical page per file page
//! through the inode's [`SharedPages`], which is what makes writes by one
//! process visible to every other sharer. Pages stay in that cache until
//! the last sharer unmaps; only then are they freed. Writable shared
//! mappings write their pages back to the file as they are unmapped.
//!
//! ## Address space
//!
//! Regions are placed one after another starting at
//! [`MMAP_BASE`](kernel_info::memory::MMAP_BASE). Gaps left by unmapped
//! regions are never reused, so a process that keeps mapping eventually
//! reaches [`MMAP_LIMIT`](kernel_info::memory::MMAP_LIMIT), which is fatal.
//!
//! ## Collaborators
//!
//! | Trait | Provided by |
//! |-------|-------------|
//! | [`Inode`] / [`LockedInode`] | the file system |
//! | [`Journal`] | the file system log |
//! | [`TranslationTable`](kernel_vmem::TranslationTable) | the process' page table |
//! | [`PageAllocator`](kernel_alloc::PageAllocator) | the physical page allocator |
//! | [`PhysMapper`](kernel_vmem::PhysMapper) | the kernel's view of physical memory |

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod error;
mod file;
mod journal;
mod mappings;
mod page_cache;
mod prot;
mod vma;

pub use error::{FaultError, MmapError};
pub use file::{Inode, LockedInode, OpenFile};
pub use journal::{Journal, Transaction};
pub use mappings::{Mappings, MmapEnv};
pub use page_cache::SharedPages;
pub use prot::{Protection, Sharing};
pub use vma::Vma;
