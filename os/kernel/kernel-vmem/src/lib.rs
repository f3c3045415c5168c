//! # Virtual Memory Interfaces
//!
//! The narrow surface the memory subsystem needs from the MMU layer:
//!
//! - [`PhysMapper`]: turn a physical page into something the kernel can
//!   dereference (identity map, HHDM, or a test arena).
//! - [`PteFlags`]: leaf permission bits for a 4 KiB translation.
//! - [`TranslationTable`]: install, remove and look up single-page
//!   translations in one process' address space.
//!
//! Page tables themselves, and the TLB maintenance that goes with editing
//! them, live behind [`TranslationTable`]; nothing in here walks hardware
//! structures.
//!
//! ## Ownership of mapped pages
//!
//! A translation table never frees the physical page it maps. Removing a
//! translation hands the page back to the caller, who decides whether the
//! page returns to the allocator (a private copy) or stays alive (a page
//! shared through a file's page cache).

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code, clippy::inline_always)]

mod flags;
mod mapper;
mod table;

pub use crate::flags::PteFlags;
pub use crate::mapper::PhysMapper;
pub use crate::table::{MapError, TranslationTable};
