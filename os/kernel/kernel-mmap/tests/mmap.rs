mod common;

use common::{CountingJournal, MemInode, PAGE, Proc, Ram, SoftTable, env, open, pattern};
use kernel_info::memory::{MMAP_BASE, MMAP_LIMIT};
use kernel_info::param::NVMA;
use kernel_memory_addresses::{PhysicalPage, VirtualAddress, VirtualPage};
use kernel_mmap::{FaultError, Mappings, MmapError, Protection, Sharing};
use kernel_vmem::{MapError, PteFlags, TranslationTable};
use std::sync::{Arc, Barrier};
use std::thread;

const LEN_3P: usize = 3 * PAGE as usize;

fn base() -> VirtualAddress {
    VirtualAddress::new(MMAP_BASE)
}

fn proc_with_layout(capacity: usize, limit: VirtualAddress) -> Proc {
    Proc {
        mappings: Mappings::with_layout(capacity, base(), limit),
        table: SoftTable::default(),
    }
}

#[test]
fn map_validates_its_arguments() {
    let file = MemInode::with_data(pattern(LEN_3P));
    let ro = open(&file, true, false);
    let wo = open(&file, false, true);
    let mut p = Proc::default();
    let m = &mut p.mappings;

    assert_eq!(m.map(None, 0, Protection::READ, Sharing::Shared, &ro, 0), Err(MmapError::InvalidLength));
    assert_eq!(
        m.map(None, PAGE, Protection::READ, Sharing::Shared, &ro, 100),
        Err(MmapError::UnalignedOffset(100))
    );
    assert_eq!(
        m.map(None, PAGE, Protection::READ_WRITE, Sharing::Shared, &ro, 0),
        Err(MmapError::NotWritable)
    );
    assert_eq!(
        m.map(None, PAGE, Protection::READ, Sharing::Private, &wo, 0),
        Err(MmapError::NotReadable)
    );
    assert_eq!(m.free_slots(), NVMA, "rejected requests take no slot");
    assert_eq!(file.sharers(), 0);

    // private writes never reach the file, so a read-only file is fine
    assert!(m.map(None, PAGE, Protection::READ_WRITE, Sharing::Private, &ro, 0).is_ok());
    let write_only = Protection::NONE.with_write(true);
    assert!(m.map(None, PAGE, write_only, Sharing::Shared, &wo, 0).is_ok());
    assert_eq!(m.free_slots(), NVMA - 2);
    assert_eq!(file.sharers(), 1);
}

#[test]
fn map_is_lazy_and_places_regions_back_to_back() {
    let ram = Ram::new(4);
    let file = MemInode::with_data(pattern(LEN_3P));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let a = p.mappings.map(None, PAGE + 10, Protection::READ, Sharing::Private, &f, 0).unwrap();
    let hint = Some(VirtualAddress::new(0x1000));
    let b = p.mappings.map(hint, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();

    assert_eq!(a, base());
    assert_eq!(b, a + 2 * PAGE, "next region starts on the page after the previous end");
    assert_eq!(ram.free_pages(), 4);
    assert!(p.table.entries.is_empty());
    assert_eq!(Arc::strong_count(&f), 3);

    let starts: Vec<_> = p.mappings.regions().map(|v| v.start()).collect();
    assert_eq!(starts, vec![a, b]);
    assert_eq!(p.mappings.find(a + PAGE).map(|v| v.start()), Some(a));
    assert!(p.mappings.find(a + PAGE + 10).is_none());
    assert_eq!(p.mappings.find(a).unwrap().installed_pages(), 0);
}

#[test]
fn faulting_every_page_installs_one_translation_per_page() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let len = 2 * PAGE as usize + 1000;
    let data = pattern(len);
    let file = MemInode::with_data(data.clone());
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, len as u64, Protection::READ, Sharing::Private, &f, 0).unwrap();
    for i in 0..3 {
        p.mappings.handle_fault(&env, &mut p.table, va + i * PAGE + 17).unwrap();
    }

    assert_eq!(p.table.entries.len(), len.div_ceil(PAGE as usize));
    assert_eq!(p.mappings.find(va).unwrap().installed_pages(), 3);
    assert_eq!(ram.free_pages(), 5);

    for (i, (vpage, &(pa, flags))) in p.table.entries.iter().enumerate() {
        assert_eq!(*vpage, (va + i as u64 * PAGE).page());
        assert_eq!(flags, PteFlags::user_leaf().with_readable(true));

        let contents = ram.page_contents(pa);
        let from = i * PAGE as usize;
        let in_file = (len - from).min(PAGE as usize);
        assert_eq!(&contents[..in_file], &data[from..from + in_file]);
        assert!(contents[in_file..].iter().all(|&b| b == 0), "zero past end of file");
    }
}

#[test]
fn file_offset_selects_the_backing_pages() {
    let ram = Ram::new(4);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let data = pattern(LEN_3P);
    let file = MemInode::with_data(data.clone());
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, PAGE).unwrap();
    assert_eq!(p.load(&env, va), data[PAGE as usize]);
    assert_eq!(p.load(&env, va + 300), data[PAGE as usize + 300]);
}

#[test]
fn fault_failures() {
    let ram = Ram::new(1);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, 3 * PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();

    let below = VirtualAddress::new(0x4000);
    assert_eq!(p.mappings.handle_fault(&env, &mut p.table, below), Err(FaultError::NotMapped(below)));
    let after = va + 3 * PAGE;
    assert_eq!(p.mappings.handle_fault(&env, &mut p.table, after), Err(FaultError::NotMapped(after)));

    assert_eq!(
        p.mappings.handle_fault(&env, &mut p.table, va + PAGE),
        Err(FaultError::BeyondEndOfFile { offset: PAGE, size: PAGE })
    );
    assert_eq!(ram.free_pages(), 1, "a failed fault allocates nothing");

    assert_eq!(p.mappings.handle_fault(&env, &mut p.table, va), Ok(()));
    assert_eq!(
        p.mappings.handle_fault(&env, &mut p.table, va + 8),
        Err(FaultError::Protection(va + 8))
    );
    assert_eq!(p.mappings.find(va).unwrap().installed_pages(), 1);
}

#[test]
fn out_of_memory_is_reported() {
    let ram = Ram::new(1);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(2 * PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, 2 * PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    assert!(p.touch(&env, va).is_ok());
    assert_eq!(p.touch(&env, va + PAGE), Err(FaultError::OutOfMemory));
    assert_eq!(p.mappings.find(va).unwrap().installed_pages(), 1);
}

#[test]
fn shared_mappings_converge_on_one_page() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(2 * PAGE as usize));
    let f = open(&file, true, true);
    let (mut a, mut b) = (Proc::default(), Proc::default());

    let va = a.mappings.map(None, 2 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    let vb = b.mappings.map(None, 2 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    assert_eq!(file.sharers(), 2);

    a.store(&env, va + 5, 0xAA);
    assert_eq!(b.load(&env, vb + 5), 0xAA);
    assert_eq!(a.table.lookup(va.page()), b.table.lookup(vb.page()));

    b.store(&env, vb + PAGE + 1, 0xBB);
    assert_eq!(a.load(&env, va + PAGE + 1), 0xBB);

    assert_eq!(file.cached_pages(), 2);
    assert_eq!(ram.free_pages(), 6, "two file pages, one physical page each");
    assert_eq!(file.writes(), 0, "nothing is written back before unmap");
}

#[test]
fn private_writes_stay_private_and_are_discarded() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let data = pattern(PAGE as usize);
    let file = MemInode::with_data(data.clone());
    let f = open(&file, true, true);
    let (mut a, mut b) = (Proc::default(), Proc::default());

    let va = a.mappings.map(None, PAGE, Protection::READ_WRITE, Sharing::Private, &f, 0).unwrap();
    let vb = b.mappings.map(None, PAGE, Protection::READ, Sharing::Shared, &f, 0).unwrap();

    a.store(&env, va + 7, 0xEE);
    assert_eq!(b.load(&env, vb + 7), data[7]);
    assert_ne!(a.table.lookup(va.page()), b.table.lookup(vb.page()));
    assert_eq!(file.cached_pages(), 1, "private pages are never published");

    let free = ram.free_pages();
    a.mappings.unmap(&env, &mut a.table, va, PAGE).unwrap();
    assert_eq!(ram.free_pages(), free + 1);
    assert_eq!(file.writes(), 0);
    assert_eq!(file.data(), data);
    assert_eq!(journal.transactions(), 1, "only the file reference release");
}

#[test]
fn unmapping_the_last_shared_mapping_writes_back_and_frees_the_cache() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let data = pattern(LEN_3P);
    let file = MemInode::with_data(data.clone());
    let f = open(&file, true, true);
    let mut p = Proc::default();
    let initial = ram.free_pages();

    let va = p.mappings.map(None, 3 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    p.store(&env, va + 3, 0x42);
    assert_eq!(ram.free_pages(), initial - 1);

    p.mappings.unmap(&env, &mut p.table, va, 3 * PAGE).unwrap();

    assert_eq!(file.writes(), 1, "only the touched page is written back");
    let mut expected = data;
    expected[3] = 0x42;
    assert_eq!(file.data(), expected);

    assert_eq!(file.sharers(), 0);
    assert_eq!(file.cached_pages(), 0);
    assert_eq!(ram.free_pages(), initial, "last sharer frees the cached page");
    assert_eq!(p.mappings.free_slots(), NVMA);
    assert_eq!(p.mappings.regions().count(), 0);
    assert!(p.table.entries.is_empty());
    assert_eq!(Arc::strong_count(&f), 1, "file reference released");
    assert_eq!(journal.transactions(), 2, "one write back plus the file release");
}

#[test]
fn shared_pages_outlive_an_unmapping_sharer() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(LEN_3P));
    let f = open(&file, true, true);
    let (mut a, mut b) = (Proc::default(), Proc::default());
    let initial = ram.free_pages();

    let va = a.mappings.map(None, 3 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    let vb = b.mappings.map(None, 3 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();

    a.store(&env, va, 0x11);
    a.mappings.unmap(&env, &mut a.table, va, 3 * PAGE).unwrap();

    assert_eq!(file.writes(), 1);
    assert_eq!(file.sharers(), 1);
    assert_eq!(file.cached_pages(), 1, "b may still fault the page in");
    assert_eq!(ram.free_pages(), initial - 1);
    assert_eq!(a.mappings.free_slots(), NVMA);

    assert_eq!(b.load(&env, vb), 0x11);
    assert_eq!(ram.free_pages(), initial - 1, "b hits the cached page");

    b.mappings.unmap(&env, &mut b.table, vb, 3 * PAGE).unwrap();
    assert_eq!(file.cached_pages(), 0);
    assert_eq!(ram.free_pages(), initial);
    assert_eq!(file.data()[0], 0x11);
}

#[test]
fn read_only_shared_pages_are_not_written_back() {
    let ram = Ram::new(4);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, PAGE, Protection::READ, Sharing::Shared, &f, 0).unwrap();
    let _ = p.load(&env, va);
    p.mappings.unmap(&env, &mut p.table, va, PAGE).unwrap();

    assert_eq!(file.writes(), 0);
    assert_eq!(journal.transactions(), 1);
    assert_eq!(ram.free_pages(), 4);
}

#[test]
fn write_back_stops_at_end_of_file() {
    let ram = Ram::new(4);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(100));
    let f = open(&file, true, true);
    let mut p = Proc::default();

    let va = p.mappings.map(None, PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    p.store(&env, va + 50, 0x99);
    p.store(&env, va + 200, 0x77);
    p.mappings.unmap(&env, &mut p.table, va, PAGE).unwrap();

    let data = file.data();
    assert_eq!(data.len(), 100, "the file does not grow");
    assert_eq!(data[50], 0x99);
}

#[test]
fn front_trim_advances_start_and_offset() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let data = pattern(LEN_3P);
    let file = MemInode::with_data(data.clone());
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, 3 * PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    let _ = p.load(&env, va);
    let free = ram.free_pages();

    p.mappings.unmap(&env, &mut p.table, va, PAGE).unwrap();
    let vma = p.mappings.find(va + PAGE).unwrap();
    assert_eq!(vma.start(), va + PAGE);
    assert_eq!(vma.file_offset(), PAGE);
    assert_eq!(vma.installed_pages(), 0);
    assert_eq!(ram.free_pages(), free + 1);
    assert_eq!(p.mappings.handle_fault(&env, &mut p.table, va), Err(FaultError::NotMapped(va)));

    // later faults still read the right file page
    assert_eq!(p.load(&env, va + 2 * PAGE + 9), data[2 * PAGE as usize + 9]);
}

#[test]
fn interior_unmap_trims_through_the_end() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(4 * PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, 4 * PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    for i in 0..4 {
        let _ = p.load(&env, va + i * PAGE);
    }
    let free = ram.free_pages();

    p.mappings.unmap(&env, &mut p.table, va + PAGE, PAGE).unwrap();
    let vma = p.mappings.find(va).unwrap();
    assert_eq!(vma.end(), va + PAGE);
    assert_eq!(vma.installed_pages(), 1);
    assert_eq!(ram.free_pages(), free + 3);
    assert_eq!(p.table.entries.keys().copied().collect::<Vec<_>>(), vec![va.page()]);

    p.mappings.unmap(&env, &mut p.table, va, PAGE).unwrap();
    assert_eq!(p.mappings.free_slots(), NVMA);
    assert_eq!(ram.free_pages(), 8);
}

#[test]
fn oversized_unmap_lengths_stop_at_the_region_end() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(LEN_3P));
    let f = open(&file, true, true);
    let mut p = Proc::default();

    let a = p.mappings.map(None, 3 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    let b = p.mappings.map(None, 3 * PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    p.store(&env, a, 0x5A);
    let _ = p.load(&env, b + PAGE);

    assert_eq!(p.mappings.unmap(&env, &mut p.table, b + PAGE, u64::MAX - 2 * PAGE), Ok(()));
    assert_eq!(p.mappings.find(b).unwrap().end(), b + PAGE);

    assert_eq!(p.mappings.unmap(&env, &mut p.table, a, u64::MAX), Ok(()));
    assert!(p.mappings.find(a).is_none());
    assert_eq!(file.data()[0], 0x5A, "written back before the region went away");

    assert_eq!(p.mappings.unmap(&env, &mut p.table, b, u64::MAX), Ok(()));
    assert_eq!(p.mappings.free_slots(), NVMA);
    assert!(p.table.entries.is_empty());
    assert_eq!(ram.free_pages(), 8);
}

#[test]
fn unmap_address_checks() {
    let ram = Ram::new(2);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();
    let va = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();

    assert_eq!(
        p.mappings.unmap(&env, &mut p.table, va + 1, PAGE),
        Err(MmapError::UnalignedAddress(va + 1))
    );
    assert_eq!(p.mappings.unmap(&env, &mut p.table, VirtualAddress::new(0x1000), PAGE), Ok(()));
    assert_eq!(p.mappings.regions().count(), 1);
    assert_eq!(journal.transactions(), 0);
}

#[test]
fn gaps_left_by_unmapping_are_not_reused() {
    let ram = Ram::new(2);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let a = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    let b = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    p.mappings.unmap(&env, &mut p.table, a, PAGE).unwrap();
    let c = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();

    assert_eq!(c, b + PAGE);
    assert_eq!(p.mappings.find(a).map(|v| v.start()), None);
}

#[test]
fn unmap_all_releases_everything() {
    let ram = Ram::new(8);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(2 * PAGE as usize));
    let f = open(&file, true, true);
    let mut p = Proc::default();

    let a = p.mappings.map(None, 2 * PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    let b = p.mappings.map(None, 2 * PAGE, Protection::READ_WRITE, Sharing::Private, &f, 0).unwrap();
    for va in [a, a + PAGE, b, b + PAGE] {
        p.store(&env, va, 1);
    }
    assert_eq!(ram.free_pages(), 4);

    p.mappings.unmap_all(&env, &mut p.table);
    assert_eq!(p.mappings.regions().count(), 0);
    assert_eq!(p.mappings.free_slots(), NVMA);
    assert!(p.table.entries.is_empty());
    assert_eq!(ram.free_pages(), 8);
    assert_eq!(file.sharers(), 0);
    assert_eq!(file.writes(), 2);
    assert_eq!(Arc::strong_count(&f), 1);
}

#[test]
#[should_panic(expected = "out of vma")]
fn running_out_of_slots_panics() {
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = proc_with_layout(2, VirtualAddress::new(MMAP_LIMIT));
    for _ in 0..3 {
        let _ = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0);
    }
}

#[test]
#[should_panic(expected = "out of address space")]
fn running_out_of_address_space_panics() {
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = proc_with_layout(4, base() + 3 * PAGE);
    assert!(p.mappings.map(None, 2 * PAGE, Protection::READ, Sharing::Private, &f, 0).is_ok());
    let _ = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0);
}

#[test]
#[should_panic(expected = "installed pages")]
fn losing_track_of_an_installed_page_panics() {
    let ram = Ram::new(2);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    let _ = p.load(&env, va);
    // the translation disappears behind the mapping layer's back
    p.table.remove(va.page());
    let _ = p.mappings.unmap(&env, &mut p.table, va, PAGE);
}

#[test]
#[should_panic(expected = "short write back")]
fn short_write_back_panics() {
    let ram = Ram::new(2);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, true);
    let mut p = Proc::default();

    let va = p.mappings.map(None, PAGE, Protection::READ_WRITE, Sharing::Shared, &f, 0).unwrap();
    p.store(&env, va, 3);
    file.fail_writes();
    let _ = p.mappings.unmap(&env, &mut p.table, va, PAGE);
}

/// A page table that cannot grow.
struct FullTable;

impl TranslationTable for FullTable {
    fn install(&mut self, _: VirtualPage, _: PhysicalPage, _: PteFlags) -> Result<(), MapError> {
        Err(MapError::OutOfMemory)
    }

    fn remove(&mut self, _: VirtualPage) -> Option<PhysicalPage> {
        None
    }

    fn lookup(&self, _: VirtualPage) -> Option<PhysicalPage> {
        None
    }
}

#[test]
#[should_panic(expected = "cannot install")]
fn failing_to_install_a_translation_panics() {
    let ram = Ram::new(2);
    let journal = CountingJournal::default();
    let env = env(&ram, &journal);
    let file = MemInode::with_data(pattern(PAGE as usize));
    let f = open(&file, true, false);
    let mut p = Proc::default();

    let va = p.mappings.map(None, PAGE, Protection::READ, Sharing::Private, &f, 0).unwrap();
    let _ = p.mappings.handle_fault(&env, &mut FullTable, va);
}

#[test]
fn concurrent_faults_on_shared_pages_publish_each_page_once() {
    const THREADS: usize = 4;
    const PAGES: u64 = 4;

    let ram = Ram::new(16);
    let journal = CountingJournal::default();
    let file = MemInode::with_data(pattern(4 * PAGE as usize));
    let f = open(&file, true, true);
    let start = Barrier::new(THREADS);

    let seen: Vec<Vec<PhysicalPage>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS as u64)
            .map(|t| {
                let (ram, journal, f, start) = (&ram, &journal, &f, &start);
                s.spawn(move || {
                    let env = env(ram, journal);
                    let mut p = Proc::default();
                    let va = p
                        .mappings
                        .map(None, PAGES * PAGE, Protection::READ_WRITE, Sharing::Shared, f, 0)
                        .unwrap();
                    start.wait();
                    // every process walks the file from a different page
                    for k in 0..PAGES {
                        p.touch(&env, va + (k + t) % PAGES * PAGE).unwrap();
                    }
                    (0..PAGES)
                        .map(|page| p.table.lookup((va + page * PAGE).page()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for pages in &seen[1..] {
        assert_eq!(pages, &seen[0], "all processes share one physical page per file page");
    }
    let mut distinct = seen[0].clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 4);
    assert_eq!(file.cached_pages(), 4);
    assert_eq!(file.sharers(), 4);
    assert_eq!(ram.free_pages(), 16 - 4, "one allocation per file page");
}
