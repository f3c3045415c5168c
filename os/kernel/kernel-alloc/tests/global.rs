//! The global allocator is process-wide state, so this file holds a single
//! test that owns it.

use kernel_alloc::global::{self, AlreadyInitialized, GlobalPageAllocator};
use kernel_alloc::{OffsetPhysMapper, PageAllocator, PhysRange, RefCountedFrameAlloc};
use kernel_memory_addresses::{PAGE_BYTES, PhysicalAddress};

#[repr(C, align(4096))]
struct Frame([u8; PAGE_BYTES]);

#[test]
fn install_once_then_allocate_through_the_handle() {
    let base = PhysicalAddress::new(0x8000_0000);
    let ram: &'static mut [Frame] = Vec::leak((0..2).map(|_| Frame([0; PAGE_BYTES])).collect());
    let m = OffsetPhysMapper::for_arena(ram.as_mut_ptr().cast(), base);
    let a: &'static RefCountedFrameAlloc<OffsetPhysMapper> =
        Box::leak(Box::new(unsafe { RefCountedFrameAlloc::new(m, PhysRange::with_pages(base, 2)) }));

    assert!(!global::is_initialized());
    assert_eq!(global::init(a), Ok(()));
    assert_eq!(global::init(a), Err(AlreadyInitialized));
    assert!(global::is_initialized());

    let p = global::alloc_page().unwrap();
    let q = GlobalPageAllocator.alloc_page().unwrap();
    assert_ne!(p, q);
    assert_eq!(global::alloc_page(), None);
    assert_eq!(a.free_pages(), 0);

    GlobalPageAllocator.free_page(p);
    global::free_page(q);
    assert_eq!(a.free_pages(), 2);
}
