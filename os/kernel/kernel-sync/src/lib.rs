//! # Kernel synchronization primitives
//!
//! Two kinds of mutual exclusion, with different rules:
//!
//! * [`SpinLock`]: busy-waits, masks interrupts on the holding CPU for the
//!   duration of the critical section (through [`IrqGuard`]), and must never
//!   be held across anything that can suspend the caller. Used for short
//!   list manipulations: free lists, buffer cache buckets.
//! * [`SleepLock`]: waiters give up the processor through the installed
//!   yield hook instead of spinning. It may be held for long operations such
//!   as disk I/O, but never acquired while a spinlock is held.
//!
//! Platform integration happens through two hooks installed once at boot:
//! [`install_interrupt_hooks`] and [`install_yield_hook`]. Without them the
//! primitives still provide mutual exclusion; masking is a no-op and
//! sleeping degrades to spinning, which is what hosted tests rely on.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod irq;
mod sleep_lock;
mod spin_lock;
mod sync_once_cell;

pub use irq::{InterruptHooks, IrqGuard, install_interrupt_hooks};
pub use sleep_lock::{SleepLock, SleepLockGuard, install_yield_hook};
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
