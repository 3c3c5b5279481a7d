use crate::reader::{Reader, ReaderEpochs};
use crate::table::Table;
use crate::types::*;

/// Thread-safe creator and registrar of [`Reader`]s against one left-right
/// primitive.
///
/// Cloning a `ReaderFactory` is cheap and shares the same underlying registry
/// and publication pointer as the original -- any clone can mint Readers
/// against the same primitive instance, from any thread, at any time,
/// including concurrently with the Writer's [`crate::Writer::refresh`]. The
/// registry lock it takes is only ever held across registration/snapshot,
/// never across a Reader's read.
#[derive(Clone)]
pub struct ReaderFactory<C> {
    pub(crate) table: Arc<Table<C>>,
    pub(crate) readers: ReaderEpochs,
}

impl<C> ReaderFactory<C> {
    pub(crate) fn new(table: Arc<Table<C>>, readers: ReaderEpochs) -> ReaderFactory<C> {
        ReaderFactory { table, readers }
    }

    /// Create and register a new [`Reader`] bound to the calling thread.
    ///
    /// Registration takes the registry mutex, which is otherwise only held by
    /// the Writer while snapshotting readers at the start of a refresh; this
    /// call may block briefly on that, but never on a reader's in-flight read.
    pub fn create_reader(&self) -> Reader<C> {
        Reader::new(&self.readers, &self.table)
    }
}

impl<C> std::fmt::Debug for ReaderFactory<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderFactory")
            .field("num_live_readers", &self.readers.lock().unwrap().len())
            .finish()
    }
}
