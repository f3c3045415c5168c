#![allow(dead_code)]

use kernel_alloc::{OffsetPhysMapper, PhysRange, RefCountedFrameAlloc};
use kernel_memory_addresses::{PAGE_BYTES, PhysicalAddress, PhysicalPage, VirtualAddress, VirtualPage};
use kernel_mmap::{FaultError, Inode, Journal, LockedInode, Mappings, MmapEnv, OpenFile, SharedPages};
use kernel_sync::{SleepLock, SleepLockGuard};
use kernel_vmem::{MapError, PhysMapper, PteFlags, TranslationTable};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PAGE: u64 = kernel_memory_addresses::PAGE_SIZE;
const BASE: PhysicalAddress = PhysicalAddress::new(0x8000_0000);

#[repr(C, align(4096))]
struct Frame([u8; PAGE_BYTES]);

/// Host memory standing in for RAM, with a refcounted allocator over it.
pub struct Ram {
    _frames: Vec<Frame>,
    pub mapper: OffsetPhysMapper,
    pub pages: RefCountedFrameAlloc<OffsetPhysMapper>,
}

impl Ram {
    pub fn new(pages: usize) -> Self {
        let mut frames: Vec<Frame> = (0..pages).map(|_| Frame([0; PAGE_BYTES])).collect();
        let mapper = OffsetPhysMapper::for_arena(frames.as_mut_ptr().cast(), BASE);
        let alloc = unsafe { RefCountedFrameAlloc::new(mapper, PhysRange::with_pages(BASE, pages)) };
        Self {
            _frames: frames,
            mapper,
            pages: alloc,
        }
    }

    pub fn page_contents(&self, page: PhysicalPage) -> Vec<u8> {
        unsafe { self.mapper.page_bytes(page) }.to_vec()
    }

    pub fn free_pages(&self) -> usize {
        self.pages.free_pages()
    }
}

/// File contents plus the bookkeeping the mapping layer keeps in an inode.
#[derive(Default)]
pub struct MemFile {
    pub data: Vec<u8>,
    pub shared: SharedPages,
    pub writes: usize,
    /// Simulate a full disk: writes store nothing.
    pub fail_writes: bool,
}

pub struct MemInode {
    state: SleepLock<MemFile>,
}

impl MemInode {
    pub fn with_data(data: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            state: SleepLock::new(MemFile {
                data,
                ..MemFile::default()
            }),
        })
    }

    pub fn data(&self) -> Vec<u8> {
        self.state.lock().data.clone()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().writes
    }

    pub fn cached_pages(&self) -> usize {
        self.state.lock().shared.len()
    }

    pub fn sharers(&self) -> u32 {
        self.state.lock().shared.sharers()
    }

    pub fn fail_writes(&self) {
        self.state.lock().fail_writes = true;
    }
}

pub struct LockedMemInode<'a>(SleepLockGuard<'a, MemFile>);

impl Inode for MemInode {
    type Locked<'a> = LockedMemInode<'a>;

    fn lock(&self) -> LockedMemInode<'_> {
        LockedMemInode(self.state.lock())
    }
}

impl LockedInode for LockedMemInode<'_> {
    fn size(&self) -> u64 {
        self.0.data.len() as u64
    }

    fn read(&mut self, offset: u64, dst: &mut [u8]) -> usize {
        let data = &self.0.data;
        let start = usize::try_from(offset).unwrap().min(data.len());
        let n = dst.len().min(data.len() - start);
        dst[..n].copy_from_slice(&data[start..start + n]);
        n
    }

    fn write(&mut self, offset: u64, src: &[u8]) -> usize {
        if self.0.fail_writes {
            return 0;
        }
        let start = usize::try_from(offset).unwrap();
        let data = &mut self.0.data;
        if data.len() < start + src.len() {
            data.resize(start + src.len(), 0);
        }
        data[start..start + src.len()].copy_from_slice(src);
        self.0.writes += 1;
        src.len()
    }

    fn shared_pages(&mut self) -> &mut SharedPages {
        &mut self.0.shared
    }
}

pub fn open(inode: &Arc<MemInode>, readable: bool, writable: bool) -> Arc<OpenFile<MemInode>> {
    Arc::new(OpenFile::new(Arc::clone(inode), readable, writable))
}

/// `len` bytes where byte `i` is `i % 251`, so every page differs.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| u8::try_from(i % 251).unwrap()).collect()
}

#[derive(Default)]
pub struct SoftTable {
    pub entries: BTreeMap<VirtualPage, (PhysicalPage, PteFlags)>,
}

impl TranslationTable for SoftTable {
    fn install(&mut self, va: VirtualPage, pa: PhysicalPage, flags: PteFlags) -> Result<(), MapError> {
        if self.entries.contains_key(&va) {
            return Err(MapError::AlreadyMapped(va));
        }
        self.entries.insert(va, (pa, flags));
        Ok(())
    }

    fn remove(&mut self, va: VirtualPage) -> Option<PhysicalPage> {
        self.entries.remove(&va).map(|(pa, _)| pa)
    }

    fn lookup(&self, va: VirtualPage) -> Option<PhysicalPage> {
        self.entries.get(&va).map(|&(pa, _)| pa)
    }
}

/// Counts transactions and checks they never overlap in these tests.
#[derive(Default)]
pub struct CountingJournal {
    pub begun: AtomicUsize,
    pub ended: AtomicUsize,
}

impl Journal for CountingJournal {
    fn begin_op(&self) {
        assert_eq!(self.begun.load(Ordering::SeqCst), self.ended.load(Ordering::SeqCst), "nested transaction");
        self.begun.fetch_add(1, Ordering::SeqCst);
    }

    fn end_op(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
        assert_eq!(self.begun.load(Ordering::SeqCst), self.ended.load(Ordering::SeqCst));
    }
}

impl CountingJournal {
    pub fn transactions(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

pub type Env<'a> = MmapEnv<'a, RefCountedFrameAlloc<OffsetPhysMapper>, OffsetPhysMapper, CountingJournal>;

pub fn env<'a>(ram: &'a Ram, journal: &'a CountingJournal) -> Env<'a> {
    MmapEnv::new(&ram.pages, &ram.mapper, journal)
}

/// A user process: its mappings and its page table.
#[derive(Default)]
pub struct Proc {
    pub mappings: Mappings<MemInode>,
    pub table: SoftTable,
}

impl Proc {
    /// Fault `va` in unless it is already present.
    pub fn touch(&mut self, env: &Env<'_>, va: VirtualAddress) -> Result<PhysicalPage, FaultError> {
        if let Some(pa) = self.table.lookup(va.page()) {
            return Ok(pa);
        }
        self.mappings.handle_fault(env, &mut self.table, va)?;
        Ok(self.table.lookup(va.page()).unwrap())
    }

    pub fn load(&mut self, env: &Env<'_>, va: VirtualAddress) -> u8 {
        let pa = self.touch(env, va).unwrap();
        let bytes = unsafe { env.mapper.page_bytes(pa) };
        bytes[offset(va)]
    }

    pub fn store(&mut self, env: &Env<'_>, va: VirtualAddress, byte: u8) {
        let pa = self.touch(env, va).unwrap();
        let bytes = unsafe { env.mapper.page_bytes(pa) };
        bytes[offset(va)] = byte;
    }
}

fn offset(va: VirtualAddress) -> usize {
    usize::try_from(va.offset_in_page()).unwrap()
}
