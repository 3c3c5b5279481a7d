//! A left-right concurrency primitive, and a read-optimized key-value map
//! built on top of it.
//!
//! This library is named after the two (structurally identical) copies it
//! holds internally:
//! - **R-copy** (called `active` internally) -- what every [`Reader`] sees.
//!   Reading it never takes a lock, so Readers never face contention.
//! - **W-copy** (called `standby` internally) -- what the [`Writer`] mutates.
//!   The Writer only waits on Readers that are still mid-read against the
//!   copy it is about to take over; it never waits on the copy Readers are
//!   currently using.
//!
//! The two labels swap every time [`Writer::refresh`] is called, which is the
//! only point at which accumulated writes become visible to Readers.
//!
//! The cost of wait-free reads and non-blocking writes is:
//! 1. **Memory** -- two copies of the underlying container are held at all
//!    times, not one.
//! 2. **Writer CPU** -- every write is eventually applied twice: once
//!    immediately against the write-side copy, once more during `refresh`
//!    against the copy just retired, to bring it back in sync.
//!
//! Usage is meant to evoke `RwLock`, but with the read/write split pushed out
//! to separate types instead of one lock shared by every caller: a single
//! [`Writer`] mutates the data and periodically calls `refresh`; any number of
//! [`Reader`]s, each created from a [`ReaderFactory`] and each bound to one
//! thread, read it without ever contending with the Writer or each other.
//!
//! ```
//! use left_right_map::{Operation, create};
//!
//! struct Increment;
//! impl Operation<i32> for Increment {
//!     type Output = i32;
//!     fn apply(&self, n: &mut i32) -> i32 {
//!         *n += 1;
//!         *n
//!     }
//! }
//!
//! let (factory, mut writer) = create(|| 0);
//! let reader = factory.create_reader();
//!
//! assert_eq!(reader.perform_read(|n| *n), 0);
//! writer.write(Increment);
//! assert_eq!(reader.perform_read(|n| *n), 0); // not yet refreshed
//! writer.refresh();
//! assert_eq!(reader.perform_read(|n| *n), 1);
//! ```
//!
//! For a `HashMap<K, V>`, the [`map`] module provides `put`/`remove`/`clear`/
//! `get`/`contains_key`/`for_each`/... directly on [`Writer`] and [`Reader`]
//! without requiring a hand-written [`Operation`]:
//!
//! ```
//! use left_right_map::map;
//!
//! let (factory, mut writer) = map::new::<&str, i32, std::collections::hash_map::RandomState>();
//! let reader = factory.create_reader();
//!
//! writer.put("a", 1);
//! assert_eq!(reader.get("a"), None);
//! writer.refresh();
//! assert_eq!(reader.get("a"), Some(1));
//! ```

mod factory;
mod operation;
mod reader;
mod table;
mod thread_reader;
mod types;
mod writer;

pub mod map;

pub use factory::ReaderFactory;
pub use operation::Operation;
pub use reader::Reader;
pub use thread_reader::ThreadLocalReader;
pub use writer::{ScopedWriter, Writer};

/// Construct a new left-right primitive over container `C`.
///
/// `factory` is invoked twice to produce the two initially-equal copies; it
/// must be deterministic (e.g. `HashMap::new`, not something seeded from
/// ambient mutable state) since the two invocations are expected to return
/// structurally equal containers.
///
/// Returns a [`ReaderFactory`] for minting any number of [`Reader`]s and the
/// sole [`Writer`]. Use [`map::new`] instead if `C` is a `HashMap` and you
/// want the map façade's `put`/`get`/etc. for free.
pub fn create<C, F>(mut factory: F) -> (ReaderFactory<C>, Writer<C>)
where
    F: FnMut() -> C,
{
    Writer::from_identical(factory(), factory())
}
