use crate::BlockKey;
use alloc::collections::VecDeque;

/// Bookkeeping for one buffer, kept in the bucket its key hashes to.
#[derive(Debug)]
pub struct Entry {
    /// Index into the slot array; fixed for the entry's lifetime.
    pub slot: usize,
    /// `None` until the buffer first holds a block.
    pub key: Option<BlockKey>,
    pub refcnt: u32,
}

/// Recency-ordered entries of one hash bucket.
///
/// Front is most recently acquired; released entries are moved to the back
/// and reclaimed from there.
#[derive(Debug, Default)]
pub struct Bucket {
    entries: VecDeque<Entry>,
}

impl Bucket {
    pub fn position(&self, key: BlockKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == Some(key))
    }

    pub fn position_of_slot(&self, slot: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.slot == slot)
    }

    pub fn get(&self, at: usize) -> &Entry {
        &self.entries[at]
    }

    pub fn get_mut(&mut self, at: usize) -> &mut Entry {
        &mut self.entries[at]
    }

    /// Move the entry at `at` to the front and return it.
    pub fn touch(&mut self, at: usize) -> &mut Entry {
        if at != 0
            && let Some(e) = self.entries.remove(at)
        {
            self.entries.push_front(e);
        }
        &mut self.entries[0]
    }

    /// Move the entry at `at` to the back.
    pub fn demote(&mut self, at: usize) {
        if let Some(e) = self.entries.remove(at) {
            self.entries.push_back(e);
        }
    }

    /// Take out the unreferenced entry nearest the back, if any.
    pub fn claim_free(&mut self) -> Option<Entry> {
        let at = self.entries.iter().rposition(|e| e.refcnt == 0)?;
        self.entries.remove(at)
    }

    pub fn insert_mru(&mut self, e: Entry) {
        self.entries.push_front(e);
    }

    pub fn insert_lru(&mut self, e: Entry) {
        self.entries.push_back(e);
    }

    pub fn keys(&self) -> impl Iterator<Item = Option<BlockKey>> + '_ {
        self.entries.iter().map(|e| e.key)
    }
}
