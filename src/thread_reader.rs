//! Optional per-thread reader cache, for callers who would rather not thread
//! an explicit [`Reader`] through their code. Lazily constructs (and keeps)
//! one `Reader` per calling thread per primitive instance.
//!
//! This is a documented tradeoff, not a bug: the registry grows monotonically
//! with the thread population, exactly like a `Reader` created and never
//! dropped. Callers whose thread identities churn (e.g. a thread pool that is
//! torn down and rebuilt often) should use explicit [`Reader`] handles
//! instead, since those deregister on `Drop`.

use crate::factory::ReaderFactory;
use crate::reader::Reader;
use crate::table::Table;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;

/// A cloneable handle that lazily creates and caches a [`Reader`] bound to
/// whichever thread calls [`ThreadLocalReader::perform_read`].
///
/// Cloning shares the same underlying primitive (like [`ReaderFactory`]) but
/// each clone's cache is independent per-thread storage, keyed by the
/// primitive instance so that one process can hold any number of primitives
/// of the same container type without their cached Readers colliding.
pub struct ThreadLocalReader<C: 'static> {
    factory: ReaderFactory<C>,
}

impl<C: 'static> Clone for ThreadLocalReader<C> {
    fn clone(&self) -> Self {
        ThreadLocalReader {
            factory: self.factory.clone(),
        }
    }
}

impl<C: 'static> ThreadLocalReader<C> {
    pub fn new(factory: ReaderFactory<C>) -> ThreadLocalReader<C> {
        ThreadLocalReader { factory }
    }

    /// Run `f` against the calling thread's cached Reader, creating and
    /// caching one first if this thread has not read through this primitive
    /// before.
    pub fn perform_read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&C) -> T,
    {
        thread_local! {
            static CACHE: RefCell<HashMap<usize, Box<dyn Any>>> = RefCell::new(HashMap::new());
        }

        let key = &*self.factory.table as *const Table<C> as usize;
        CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            let reader = cache
                .entry(key)
                .or_insert_with(|| Box::new(self.factory.create_reader()) as Box<dyn Any>);
            let reader = reader
                .downcast_ref::<Reader<C>>()
                .expect("cache key uniquely identifies the primitive's container type");
            reader.perform_read(f)
        })
    }
}
