use crate::bucket::{Bucket, Entry};
use crate::{BlockDevice, BlockKey};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use core::ptr;
use core::sync::atomic::{AtomicBool, Ordering};
use kernel_info::param::{BSIZE, NBUCKET, NBUF};
use kernel_sync::{SleepLock, SleepLockGuard, SpinLock};
use log::{debug, error, info, trace};

/// Contents of one buffer.
struct Slot {
    /// Whether `data` holds the block the slot's entry is tagged with.
    /// Only read or written with `data` locked, or while the entry is
    /// unreferenced and held out of every bucket.
    valid: AtomicBool,
    data: SleepLock<[u8; BSIZE]>,
}

impl Slot {
    const fn new() -> Self {
        Self {
            valid: AtomicBool::new(false),
            data: SleepLock::new([0; BSIZE]),
        }
    }
}

/// Sharded, LRU-ordered cache of disk blocks in front of a [`BlockDevice`].
pub struct BufferCache<D> {
    device: D,
    slots: Box<[Slot]>,
    buckets: Box<[SpinLock<Bucket>]>,
}

impl<D: BlockDevice> BufferCache<D> {
    /// A cache of [`NBUF`] buffers in [`NBUCKET`] buckets.
    pub fn new(device: D) -> Self {
        Self::with_geometry(device, NBUF, NBUCKET)
    }

    /// A cache of `nbuf` buffers spread round-robin over `nbucket` buckets.
    ///
    /// # Panics
    /// If `nbucket` is zero.
    pub fn with_geometry(device: D, nbuf: usize, nbucket: usize) -> Self {
        assert!(nbucket > 0, "buffer cache needs at least one bucket");
        let mut buckets: Box<[SpinLock<Bucket>]> = (0..nbucket).map(|_| SpinLock::new(Bucket::default())).collect();
        for slot in 0..nbuf {
            buckets[slot % nbucket].get_mut().insert_lru(Entry {
                slot,
                key: None,
                refcnt: 0,
            });
        }
        info!("buffer cache: {nbuf} buffers of {BSIZE} bytes in {nbucket} buckets");
        Self {
            device,
            slots: (0..nbuf).map(|_| Slot::new()).collect(),
            buckets,
        }
    }

    #[inline]
    fn bucket_of(&self, key: BlockKey) -> usize {
        key.blockno as usize % self.buckets.len()
    }

    /// Return the buffer for `(dev, blockno)` with its contents locked and
    /// loaded from disk.
    ///
    /// Blocks until no other caller holds the buffer.
    ///
    /// # Panics
    /// If the block is not cached and every buffer is in use.
    pub fn get_for_read(&self, dev: u32, blockno: u32) -> Buf<'_, D> {
        let key = BlockKey::new(dev, blockno);
        let slot = self.get(key);

        let guard = self.slots[slot].data.lock();
        let mut buf = Buf {
            cache: self,
            slot,
            key,
            guard: ManuallyDrop::new(guard),
        };
        if !self.slots[slot].valid.load(Ordering::Acquire) {
            self.device.read_block(key, &mut buf);
            self.slots[slot].valid.store(true, Ordering::Release);
        }
        buf
    }

    /// Find or assign the slot for `key` and take a reference to it.
    fn get(&self, key: BlockKey) -> usize {
        let home = self.bucket_of(key);

        {
            let mut bucket = self.buckets[home].lock();
            if let Some(at) = bucket.position(key) {
                let e = bucket.touch(at);
                e.refcnt += 1;
                trace!("bcache hit {key:?} in slot {}", e.slot);
                return e.slot;
            }
        }

        let n = self.buckets.len();
        for victim in (0..n).map(|k| (home + k) % n) {
            let claimed = self.buckets[victim].lock().claim_free();
            let Some(mut entry) = claimed else {
                continue;
            };
            // Out of every bucket with no references: nobody can reach the slot.
            self.slots[entry.slot].valid.store(false, Ordering::Release);

            let mut bucket = self.buckets[home].lock();
            if let Some(at) = bucket.position(key) {
                // Someone else brought `key` in while no lock was held.
                entry.key = None;
                entry.refcnt = 0;
                bucket.insert_lru(entry);
                let e = bucket.touch(at);
                e.refcnt += 1;
                return e.slot;
            }

            debug!("bcache miss {key:?}: slot {} taken from bucket {victim}", entry.slot);
            let slot = entry.slot;
            entry.key = Some(key);
            entry.refcnt = 1;
            bucket.insert_mru(entry);
            return slot;
        }

        error!("bcache miss {key:?}: all {} buffers are referenced", self.slots.len());
        panic!("get_for_read: no buffers");
    }

    /// Write the buffer's contents to disk.
    ///
    /// # Panics
    /// If `buf` belongs to a different cache.
    pub fn write_back(&self, buf: &Buf<'_, D>) {
        assert!(ptr::eq(self, buf.cache), "write_back: buffer of another cache");
        self.device.write_block(buf.key, buf);
    }

    /// Give up the buffer; the same as dropping it.
    pub fn release(&self, buf: Buf<'_, D>) {
        drop(buf);
    }

    /// Keep the buffer's entry cached after `buf` is released, without
    /// holding its contents.
    pub fn pin(&self, buf: &Buf<'_, D>) -> BufPin<'_, D> {
        let mut bucket = self.buckets[self.bucket_of(buf.key)].lock();
        let at = bucket
            .position_of_slot(buf.slot)
            .unwrap_or_else(|| panic!("pin: {:?} is not cached", buf.key));
        bucket.get_mut(at).refcnt += 1;
        BufPin {
            cache: self,
            slot: buf.slot,
            key: buf.key,
        }
    }

    /// Drop a pin; the same as dropping it.
    pub fn unpin(&self, pin: BufPin<'_, D>) {
        drop(pin);
    }

    fn unref(&self, key: BlockKey, slot: usize) {
        let mut bucket = self.buckets[self.bucket_of(key)].lock();
        let Some(at) = bucket.position_of_slot(slot) else {
            panic!("release: {key:?} is not cached");
        };
        let e = bucket.get_mut(at);
        e.refcnt = e
            .refcnt
            .checked_sub(1)
            .unwrap_or_else(|| panic!("release: {key:?} has no references"));
        if e.refcnt == 0 {
            bucket.demote(at);
        }
    }

    /// References currently held on `(dev, blockno)`, or `None` if it is not
    /// cached.
    #[must_use]
    pub fn ref_count(&self, dev: u32, blockno: u32) -> Option<u32> {
        let key = BlockKey::new(dev, blockno);
        let bucket = self.buckets[self.bucket_of(key)].lock();
        bucket.position(key).map(|at| bucket.get(at).refcnt)
    }

    /// Keys of `bucket`'s entries, front (most recently acquired) first.
    #[must_use]
    pub fn bucket_keys(&self, bucket: usize) -> Vec<Option<BlockKey>> {
        self.buckets[bucket].lock().keys().collect()
    }

    #[must_use]
    pub fn buckets(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn buffers(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }
}

/// A cached block whose contents the holder has exclusive access to.
///
/// Dropping it releases the contents first and then the reference, moving
/// the buffer to the least recently used end of its bucket once unreferenced.
pub struct Buf<'a, D: BlockDevice> {
    cache: &'a BufferCache<D>,
    slot: usize,
    key: BlockKey,
    guard: ManuallyDrop<SleepLockGuard<'a, [u8; BSIZE]>>,
}

impl<D: BlockDevice> Buf<'_, D> {
    #[must_use]
    pub const fn key(&self) -> BlockKey {
        self.key
    }

    #[must_use]
    pub const fn dev(&self) -> u32 {
        self.key.dev
    }

    #[must_use]
    pub const fn blockno(&self) -> u32 {
        self.key.blockno
    }

    /// Index of the buffer in the pool; stable while any reference is held.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

impl<D: BlockDevice> Deref for Buf<'_, D> {
    type Target = [u8; BSIZE];
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<D: BlockDevice> DerefMut for Buf<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<D: BlockDevice> Drop for Buf<'_, D> {
    fn drop(&mut self) {
        // SAFETY: dropped exactly once, here, and never touched again.
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        self.cache.unref(self.key, self.slot);
    }
}

/// A reference that keeps a buffer cached (and its slot from being reused)
/// without holding its contents. Used by the log to keep blocks of an
/// uncommitted transaction in memory.
pub struct BufPin<'a, D: BlockDevice> {
    cache: &'a BufferCache<D>,
    slot: usize,
    key: BlockKey,
}

impl<D: BlockDevice> BufPin<'_, D> {
    #[must_use]
    pub const fn key(&self) -> BlockKey {
        self.key
    }
}

impl<D: BlockDevice> Drop for BufPin<'_, D> {
    fn drop(&mut self) {
        self.cache.unref(self.key, self.slot);
    }
}
