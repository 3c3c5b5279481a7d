use crate::table::Table;
use crate::types::*;
use slab::Slab;
use std::fmt;

/// Per-reader epoch counters, shared between every [`crate::Reader`] and the
/// [`crate::Writer`] that synchronizes against them.
///
/// `{reader_key: epoch}`. Entries are inserted by [`crate::ReaderFactory::create_reader`]
/// and removed by `Reader`'s `Drop`, so the registry's size tracks the number
/// of *live* readers, not every reader ever minted.
pub(crate) type ReaderEpochs = Arc<Mutex<Slab<Arc<AtomicU64>>>>;

/// An epoch-gated read handle into a left-right primitive, bound to one
/// logical thread.
///
/// Obtaining a read via [`Reader::perform_read`] never blocks and never
/// contends with the Writer or with other Readers: it is a pointer load
/// guarded by an atomic counter, not a lock. The Writer is responsible for
/// never mutating the table a `Reader` is in the middle of observing; see
/// `writer.rs` for how it proves that to itself before mutating.
///
/// `Reader<C>` is `Send` -- it may be handed off to another thread and used
/// there -- but calling `perform_read` concurrently from two threads, or
/// reentrantly from within its own read closure, corrupts the epoch parity
/// invariant and is a precondition violation (see the crate's error handling
/// notes). Nothing in the type system prevents this; it is checked cheaply
/// with `debug_assert!` in debug builds.
pub struct Reader<C> {
    // Lets Reader register a clone of itself and deregister on Drop.
    readers: ReaderEpochs,

    // Key into `readers` identifying this Reader's slot.
    key: usize,

    // This Reader's own epoch cell, also reachable through `readers[key]`.
    epoch: Arc<AtomicU64>,

    // Shared two-copy table this Reader draws its publication pointer from.
    table: Arc<Table<C>>,

    // Every other field here is Sync, which would make Reader Sync too (since
    // it derives auto traits from its fields). That is exactly what the
    // single-thread-per-handle contract forbids: a shared `&Reader` must not
    // be usable from two threads at once. An UnsafeCell is !Sync, so adding
    // one opts Reader back out.
    _not_sync: std::cell::UnsafeCell<fn(&C)>,
}

impl<C> Reader<C> {
    pub(crate) fn new(readers: &ReaderEpochs, table: &Arc<Table<C>>) -> Reader<C> {
        let epoch = Arc::new(AtomicU64::new(0));
        let key = readers.lock().unwrap().insert(Arc::clone(&epoch));
        Reader {
            readers: Arc::clone(readers),
            key,
            epoch,
            table: Arc::clone(table),
            _not_sync: std::cell::UnsafeCell::new(|_| {}),
        }
    }

    /// Run `f` against a momentary snapshot of the container and return its
    /// result.
    ///
    /// This is wait-free: there is no lock to acquire, only a pointer
    /// dereference guarded by this Reader's own epoch counter. `f` must be
    /// pure with respect to the container (no mutation through interior
    /// mutability) and must not call back into this or any other `Reader`'s
    /// or `Writer`'s methods -- doing so is undefined behavior by contract,
    /// not prevented by the type system.
    ///
    /// The epoch is restored to even even if `f` panics, so a poisoned read
    /// closure cannot wedge the Writer's drain forever; see
    /// [`crate::Writer::refresh`].
    pub fn perform_read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&C) -> T,
    {
        let _guard = EpochGuard::enter(&self.epoch);

        // Safety: `EpochGuard::enter` has already made our epoch odd and
        // fenced, so the Writer will not mutate whichever table we are about
        // to load until it observes our epoch move again. The guard's Drop
        // runs that increment unconditionally, including on unwind.
        let active_table = unsafe { self.table.active_table() };
        f(active_table)
    }
}

impl<C> Clone for Reader<C> {
    /// Creates an independent Reader against the same primitive; all Readers
    /// of a primitive are otherwise indistinguishable to callers.
    fn clone(&self) -> Reader<C> {
        Reader::new(&self.readers, &self.table)
    }
}

impl<C> Drop for Reader<C> {
    fn drop(&mut self) {
        self.readers.lock().unwrap().remove(self.key);
    }
}

impl<C: fmt::Debug> fmt::Debug for Reader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("num_live_readers", &self.readers.lock().unwrap().len())
            .field("epoch", &self.epoch.load(Ordering::Relaxed))
            .finish()
    }
}

/// RAII scoped-release around a single read's epoch transition (spec §4.2,
/// steps 1-4): entering makes the epoch odd and fences before the publication
/// pointer is loaded; dropping makes it even again, unconditionally,
/// including when unwinding through a panicking read closure.
struct EpochGuard<'e> {
    epoch: &'e AtomicU64,
}

impl<'e> EpochGuard<'e> {
    fn enter(epoch: &'e AtomicU64) -> EpochGuard<'e> {
        let old = epoch.load(Ordering::Relaxed);
        debug_assert_eq!(old % 2, 0, "Reader is not reentrant");
        epoch.store(old + 1, Ordering::Release);

        // The publication pointer load in `perform_read` must happen after
        // this increment is visible, so that a Writer which observes our
        // epoch as even-or-new can be sure our *next* load will see its new
        // pointer. A fence makes that ordering explicit beyond what the
        // Release store alone guarantees between this thread and the table
        // load immediately below.
        fence(Ordering::SeqCst);

        EpochGuard { epoch }
    }
}

impl<'e> Drop for EpochGuard<'e> {
    fn drop(&mut self) {
        let old = self.epoch.load(Ordering::Relaxed);
        debug_assert_eq!(old % 2, 1, "epoch was not odd on read exit");
        self.epoch.store(old + 1, Ordering::Release);
    }
}
