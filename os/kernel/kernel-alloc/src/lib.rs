//! # Physical Page Allocation
//!
//! Whole 4 KiB pages of RAM for page tables, kernel stacks, pipe buffers and
//! file-mapping pages. Two interchangeable strategies sit behind one
//! interface, [`PageAllocator`]:
//!
//! ```text
//!            ┌───────────────────────────────┐
//!            │     dyn PageAllocator         │
//!            │  alloc_page() / free_page()   │
//!            └───────┬───────────────┬───────┘
//!                    │               │
//!   ┌────────────────▼───┐     ┌─────▼────────────────────────┐
//!   │ RefCountedFrameAlloc│     │ PerCpuFrameAlloc              │
//!   │  one locked list    │     │  one locked list per CPU      │
//!   │  + atomic refcounts │     │  steal round-robin when empty │
//!   └─────────────────────┘     └───────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Free list ([`free_list`])
//! An intrusive LIFO stack threaded through the first word of each free page;
//! it never allocates side storage.
//!
//! ### Reference-counted allocator ([`refcount`])
//! For copy-on-write sharing: a page returns to the free list exactly when
//! the last holder lets go.
//!
//! ### Per-CPU allocator ([`per_cpu`])
//! Removes the single-lock bottleneck: each CPU allocates from and frees to
//! its own list and only touches a sibling's list when its own is empty.
//!
//! ### Physical Mapper ([`phys_mapper`])
//! How the allocators reach page contents for the junk fills and the free
//! list links.
//!
//! ### Global instance ([`global`])
//! The allocator the rest of the kernel uses, installed once at boot.
//!
//! ## Debug fills
//!
//! Pages are overwritten with [`ALLOC_JUNK`](kernel_info::memory::ALLOC_JUNK)
//! when handed out and with [`FREE_JUNK`](kernel_info::memory::FREE_JUNK)
//! when returned, so reads of uninitialized or dangling memory show up as
//! recognizable garbage instead of plausible data.
//!
//! ## Usage
//! ```rust
//! use kernel_alloc::frame_alloc::{PageAllocator, PhysRange};
//! use kernel_alloc::phys_mapper::OffsetPhysMapper;
//! use kernel_alloc::refcount::RefCountedFrameAlloc;
//! use kernel_memory_addresses::{PAGE_BYTES, PhysicalAddress};
//!
//! #[repr(C, align(4096))]
//! struct Frame([u8; PAGE_BYTES]);
//!
//! let mut ram: Vec<Frame> = (0..4).map(|_| Frame([0; PAGE_BYTES])).collect();
//! let base = PhysicalAddress::new(0x8000_0000);
//! let mapper = OffsetPhysMapper::for_arena(ram.as_mut_ptr().cast(), base);
//! let range = PhysRange::with_pages(base, 4);
//!
//! let pages = unsafe { RefCountedFrameAlloc::new(mapper, range) };
//! let page = pages.alloc_page().unwrap();
//! pages.free_page(page);
//! assert_eq!(pages.free_pages(), 4);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

pub mod frame_alloc;
pub mod free_list;
pub mod global;
pub mod per_cpu;
pub mod phys_mapper;
pub mod refcount;

pub use frame_alloc::{PageAllocator, PhysRange};
pub use per_cpu::{CpuLocal, PerCpuFrameAlloc};
pub use phys_mapper::OffsetPhysMapper;
pub use refcount::RefCountedFrameAlloc;
