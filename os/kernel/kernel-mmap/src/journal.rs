/// The file system's write-ahead log, seen as a bracket around every
/// modifying operation.
pub trait Journal {
    /// Enter a file system operation; may block until the log has room.
    fn begin_op(&self);

    /// Leave it; the last one out commits.
    fn end_op(&self);
}

/// RAII scope of one file system operation.
#[must_use = "the operation ends when the transaction is dropped"]
pub struct Transaction<'a, J: Journal + ?Sized> {
    journal: &'a J,
}

impl<'a, J: Journal + ?Sized> Transaction<'a, J> {
    pub fn begin(journal: &'a J) -> Self {
        journal.begin_op();
        Self { journal }
    }

    /// End the operation now; the same as dropping it.
    pub fn end(self) {
        drop(self);
    }
}

impl<J: Journal + ?Sized> Drop for Transaction<'_, J> {
    fn drop(&mut self) {
        self.journal.end_op();
    }
}
