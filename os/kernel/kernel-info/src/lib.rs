//! # Kernel Configuration
//!
//! Compile-time tunables shared by the page allocator, the buffer cache and
//! the mapping subsystem. Pool sizes and the address-space layout live here
//! and nowhere else.
//!
//! ## Modules
//!
//! ### Sizing Parameters ([`param`])
//! * CPU count the per-CPU allocator partitions its free lists across
//! * Buffer cache geometry: number of buffers, buckets and the block size
//! * Per-process pool of mapping regions
//!
//! ### Memory Layout ([`memory`])
//! * Top of the user virtual address space and the half reserved for file
//!   mappings
//! * Debug fill patterns written into pages on allocation and release
//!
//! ## Mapping Area Layout
//!
//! ```text
//! 0x0000_0000_0000      ┌─────────────────────────────────┐
//!                       │  Text, data, heap, stack        │
//! MMAP_BASE             ├─────────────────────────────────┤ MAXVA / 2
//!                       │  File mappings, bump-allocated  │
//!                       │  upwards, never compacted       │
//! MMAP_LIMIT            ├─────────────────────────────────┤ MAXVA - 2 pages
//!                       │  Trap frame, trampoline         │
//! MAXVA                 └─────────────────────────────────┘
//! ```
//!
//! Because the mapping area is never compacted, a process that keeps mapping
//! and unmapping eventually runs into [`memory::MMAP_LIMIT`], which is fatal.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod memory;
pub mod param;
