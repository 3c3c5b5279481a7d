use crate::types::*;

/// The two copies a left-right primitive alternates between.
///
/// `active_table` is the copy Readers are permitted to dereference (the
/// *R-copy*); `standby_table` is the copy the Writer is currently mutating
/// (the *W-copy*). The labels swap on every refresh -- neither field is
/// permanently "the" active table, only whichever one `active_table` happens
/// to point at right now.
///
/// `Table` only guarantees that both pointers stay valid for its lifetime and
/// that dropping it frees both allocations exactly once. It has no opinion on
/// thread safety: that is the joint responsibility of [`crate::Reader`]
/// (which only ever loads `active_table`, under the epoch protocol) and
/// [`crate::Writer`] (which owns `standby_table` exclusively and is the only
/// party that may call [`Table::swap_active_and_standby`]).
///
/// All operations on the two pointers use `SeqCst`: they happen at most once
/// per refresh, so there is no reason to reach for a weaker ordering.
#[derive(Debug)]
pub(crate) struct Table<C> {
    active_table: AtomicPtr<C>,
    standby_table: AtomicPtr<C>,
}

impl<C> Table<C> {
    /// Build a table from two independently-allocated, structurally equal
    /// copies. The caller is responsible for `t1` and `t2` being equal;
    /// `Table` has no way to check that for an arbitrary `C`.
    pub(crate) fn from_identical(t1: C, t2: C) -> Table<C> {
        Table {
            active_table: AtomicPtr::new(Box::into_raw(Box::new(t1))),
            standby_table: AtomicPtr::new(Box::into_raw(Box::new(t2))),
        }
    }

    /// Load the publication pointer. Only [`crate::Reader`] should call this,
    /// and only after incrementing its epoch to odd.
    ///
    /// # Safety
    /// The caller must follow the epoch protocol in `reader.rs`: the returned
    /// reference must not outlive the read it was taken for, so that the
    /// Writer's drain can rely on the epoch going even again once it is
    /// dropped.
    pub(crate) unsafe fn active_table(&self) -> &C {
        &*self.active_table.load(Ordering::SeqCst)
    }

    /// Read access to the table the Writer currently owns.
    ///
    /// # Safety
    /// Only the Writer may call this.
    pub(crate) unsafe fn standby_table(&self) -> &C {
        &*self.standby_table.load(Ordering::SeqCst)
    }

    /// Mutable access to the table the Writer currently owns.
    ///
    /// # Safety
    /// Only the Writer may call this, and the caller must not alias the
    /// returned reference with any other live reference into the same table.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn standby_table_mut(&self) -> &mut C {
        &mut *self.standby_table.load(Ordering::SeqCst)
    }

    /// Flip which allocation `active_table` and `standby_table` point at.
    ///
    /// After this returns, new reads observe what used to be the standby
    /// table; the former active table becomes the new (stale) standby table.
    /// The caller -- [`crate::Writer::refresh`] -- is responsible for waiting
    /// out any reader still touching it before mutating it further.
    pub(crate) fn swap_active_and_standby(&self) {
        let active = self.active_table.load(Ordering::SeqCst);
        let standby = self.standby_table.load(Ordering::SeqCst);
        assert_ne!(active, standby, "active and standby must never alias");

        let res =
            self.active_table
                .compare_exchange(active, standby, Ordering::SeqCst, Ordering::SeqCst);
        assert_eq!(res, Ok(active));

        let res = self.standby_table.compare_exchange(
            standby,
            active,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        assert_eq!(res, Ok(standby));
    }
}

impl<C> Drop for Table<C> {
    fn drop(&mut self) {
        // Safety: both pointers were built from `Box::into_raw` above and are
        // never freed anywhere else; `Table` cannot be cloned.
        unsafe {
            drop(Box::from_raw(self.active_table.load(Ordering::SeqCst)));
            drop(Box::from_raw(self.standby_table.load(Ordering::SeqCst)));
        }
    }
}
