//! # Block Buffer Cache
//!
//! A fixed pool of in-memory copies of disk blocks. Caching avoids repeated
//! disk reads and makes each cached block a synchronization point: at most
//! one caller at a time holds a block's contents.
//!
//! ## Layout
//!
//! ```text
//!  bucket = blockno % NBUCKET        (each bucket behind its own SpinLock)
//!
//!  bucket 0: [MRU] (1,13) ─ (1,0) ─ untagged ─ … [LRU]
//!  bucket 1: [MRU] (1,1) ─ … [LRU]
//!  …
//!
//!  slots:    [valid | SleepLock<[u8; BSIZE]>] × NBUF
//! ```
//!
//! Bucket entries carry the block key and the reference count; the block
//! contents live in a separate slot array, each slot behind a [`SleepLock`].
//!
//! ## Rules
//! * Every entry tagged with a block lives in bucket `blockno % NBUCKET`.
//!   Untagged entries (never used since boot) may live in any bucket.
//! * Acquiring an entry moves it to the front of its bucket. When its last
//!   reference is released it moves to the back, the least-recently-used
//!   position, which is where a miss looks first for a buffer to reuse.
//! * No code path holds two bucket locks at once, and no bucket lock is held
//!   while waiting for a slot's sleep-lock.
//! * An entry with a non-zero reference count is never evicted.
//!
//! ## Usage
//! ```rust
//! use kernel_bcache::{BlockDevice, BlockKey, BufferCache};
//! use kernel_info::param::BSIZE;
//!
//! struct Zeroes;
//! impl BlockDevice for Zeroes {
//!     fn read_block(&self, _key: BlockKey, data: &mut [u8; BSIZE]) {
//!         data.fill(0);
//!     }
//!     fn write_block(&self, _key: BlockKey, _data: &[u8; BSIZE]) {}
//! }
//!
//! let cache = BufferCache::new(Zeroes);
//! let mut buf = cache.get_for_read(1, 42);
//! buf[0] = 7;
//! cache.write_back(&buf);
//! cache.release(buf);
//! ```
//!
//! [`SleepLock`]: kernel_sync::SleepLock

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod bucket;
mod cache;
mod device;

pub use cache::{Buf, BufPin, BufferCache};
pub use device::{BlockDevice, BlockKey};
