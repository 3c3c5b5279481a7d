use crate::factory::ReaderFactory;
use crate::operation::Operation;
use crate::reader::ReaderEpochs;
use crate::table::Table;
use crate::types::*;

/// The single mutator of a left-right primitive.
///
/// A `Writer<C>` owns both copies exclusively (readers only ever see the
/// active one) and the pending op-log. Exactly one `Writer` exists per
/// primitive -- there is no way to clone or otherwise duplicate one, which is
/// how "only one writer ever exists" (spec Non-goals) is enforced
/// structurally rather than by convention.
pub struct Writer<C> {
    table: Arc<Table<C>>,
    readers: ReaderEpochs,

    // Operations applied to the standby table since the last refresh, kept in
    // program order so they can be replayed against the newly-retired copy.
    op_log: Vec<Box<dyn FnOnce(&mut C) + Send>>,
}

impl<C> Writer<C> {
    /// Construct a primitive from two already-equal copies, returning the
    /// Writer and a factory for minting Readers against it. This is the
    /// primitive building block; [`crate::map::create`] is the façade most
    /// callers reach for directly.
    pub(crate) fn from_identical(t1: C, t2: C) -> (ReaderFactory<C>, Writer<C>) {
        let table = Arc::new(Table::from_identical(t1, t2));
        let readers: ReaderEpochs = Arc::new(Mutex::new(slab::Slab::new()));

        let factory = ReaderFactory::new(Arc::clone(&table), Arc::clone(&readers));
        let writer = Writer {
            table,
            readers,
            op_log: Vec::new(),
        };
        (factory, writer)
    }

    /// Apply `op` to the write-side copy, log it for replay, and return the
    /// result of this (first) application. Never blocks on readers -- it only
    /// ever touches the copy the Writer exclusively owns.
    pub fn write<Op>(&mut self, op: Op) -> Op::Output
    where
        Op: Operation<C> + Send + 'static,
    {
        // Safety: the Writer is the only party that ever calls
        // `standby_table_mut`, and this is the only live reference to it for
        // the duration of this call.
        let standby = unsafe { self.table.standby_table_mut() };
        let result = op.apply(standby);

        // The op is replayed (not the result), so the second application
        // recomputes its own result against the retired copy's state, which
        // by I4 is equal to what `standby` was when `op` was first applied.
        self.op_log.push(Box::new(move |c: &mut C| {
            op.apply(c);
        }));

        result
    }

    /// Run `f` against the write-side copy directly. This sees every prior
    /// write in this Writer's lifetime, including ones not yet refreshed --
    /// by design, so a read-modify-write sequence through the Writer alone
    /// never needs extra synchronization (spec §4.4, property 3). Never
    /// blocks.
    pub fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&C) -> T,
    {
        // Safety: see `write`.
        f(unsafe { self.table.standby_table() })
    }

    /// Publish every write applied since the last refresh and resynchronize
    /// the retired copy. See the module-level documentation in `lib.rs` for
    /// the full eight-step protocol; this is steps 1-8 verbatim.
    pub fn refresh(&mut self) {
        // Step 3 (brought forward): hold the registry lock across publish and
        // snapshot so no reader can register and start a read on the
        // about-to-be-retired copy between "publish" and "collect stragglers".
        let readers = self.readers.lock().unwrap();

        // Steps 1-2: publish the write-side copy, retiring the old read-side
        // copy. New reads from this point target what was just written.
        self.table.swap_active_and_standby();

        // Step 4: snapshot which readers might still be mid-read against the
        // copy we just retired. An odd epoch means "possibly still in
        // `perform_read`"; record what it was so step 5 can tell when it
        // moves on.
        let mut stragglers: Vec<(Arc<AtomicU64>, u64)> = readers
            .iter()
            .filter_map(|(_, epoch)| {
                let observed = epoch.load(Ordering::Acquire);
                (observed % 2 == 1).then(|| (Arc::clone(epoch), observed))
            })
            .collect();

        // Step 6: release the registry lock before draining. New readers may
        // register now; they will only ever observe the newly-published copy,
        // so they cannot become stragglers against the retired one.
        drop(readers);

        // Step 5: wait for every straggler's epoch to move past what we
        // observed. A straggler that finishes its read (epoch becomes even)
        // or starts a new one (any different odd value) has moved on, since
        // its next publication-pointer load is guaranteed to see the new
        // pointer (step 1 happened-before that load). No timeout: refresh is
        // allowed to wait as long as correctness requires.
        while !stragglers.is_empty() {
            stragglers.retain(|(epoch, observed)| epoch.load(Ordering::Acquire) == *observed);
            if !stragglers.is_empty() {
                spin_loop();
            }
        }

        // Steps 7-8: the retired copy is now provably unobserved. Replay the
        // op-log against it to bring it back in sync, then clear the log.
        //
        // Safety: no reader holds a reference into this copy (proved above),
        // and the Writer never aliases it with another reference concurrently.
        let standby = unsafe { self.table.standby_table_mut() };
        for op in self.op_log.drain(..) {
            op(standby);
        }
    }

    /// A scoped wrapper that calls [`Writer::refresh`] when it goes out of
    /// scope, for callers who would otherwise just call `refresh()` manually
    /// at the end of every write block. Purely an ergonomic convenience --
    /// `writer.write(..); writer.write(..); writer.refresh();` is equivalent
    /// to `{ let mut w = writer.release_on_drop(); w.write(..); w.write(..); }`.
    pub fn release_on_drop(&mut self) -> ScopedWriter<'_, C> {
        ScopedWriter { writer: self }
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Writer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Safety: see `write`.
        let standby = unsafe { self.table.standby_table() };
        f.debug_struct("Writer")
            .field("num_live_readers", &self.readers.lock().unwrap().len())
            .field("ops_since_last_refresh", &self.op_log.len())
            .field("standby_table", standby)
            .finish()
    }
}

/// Ergonomic wrapper returned by [`Writer::release_on_drop`]: behaves like the
/// `Writer` it borrows, and calls [`Writer::refresh`] on drop.
pub struct ScopedWriter<'w, C> {
    writer: &'w mut Writer<C>,
}

impl<'w, C> std::ops::Deref for ScopedWriter<'w, C> {
    type Target = Writer<C>;
    fn deref(&self) -> &Writer<C> {
        self.writer
    }
}

impl<'w, C> std::ops::DerefMut for ScopedWriter<'w, C> {
    fn deref_mut(&mut self) -> &mut Writer<C> {
        self.writer
    }
}

impl<'w, C> Drop for ScopedWriter<'w, C> {
    fn drop(&mut self) {
        self.writer.refresh();
    }
}
