//! The read-optimized map façade: a thin layer converting map-shaped calls
//! into [`Operation`]s over a [`HashMap`] and forwarding read-shaped queries
//! to whichever handle the caller has (a [`Reader`] or the [`Writer`]
//! itself). The primitive in `table.rs`/`reader.rs`/`writer.rs` carries all
//! the hard engineering; everything here is pass-through.

use crate::factory::ReaderFactory;
use crate::operation::Operation;
use crate::reader::Reader;
use crate::writer::Writer;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Construct a new left-right `HashMap`, returning a factory for minting
/// Readers and the sole Writer. Mirrors [`crate::create`], specialized to the
/// map façade's most common container.
pub fn new<K, V, S>() -> (ReaderFactory<HashMap<K, V, S>>, Writer<HashMap<K, V, S>>)
where
    S: Default,
{
    crate::create(|| HashMap::with_hasher(S::default()))
}

/// One of the five mutations the map façade exposes, represented as a single
/// closed tagged variant rather than an open trait-object hierarchy: the
/// op-log only ever replays operations the Writer already owns, so there is
/// nothing to gain from letting a caller inject a new variant into somebody
/// else's log.
pub(crate) enum MapOp<K, V> {
    Put(K, V),
    PutIfAbsent(K, V),
    Remove(K),
    RemoveIfEqual(K, V),
    Clear,
}

/// The result of applying a [`MapOp`]. Kept as one enum (rather than giving
/// each variant its own `Operation` impl with its own `Output`) so that
/// `MapOp` itself can stay a single tagged variant with one `apply` routine,
/// per spec.
pub(crate) enum MapOpResult<V> {
    PrevValue(Option<V>),
    Removed(bool),
    Cleared,
}

impl<V> MapOpResult<V> {
    fn prev_value(self) -> Option<V> {
        match self {
            MapOpResult::PrevValue(v) => v,
            _ => unreachable!("MapOp variant and MapOpResult variant must stay in lockstep"),
        }
    }

    fn removed(self) -> bool {
        match self {
            MapOpResult::Removed(b) => b,
            _ => unreachable!("MapOp variant and MapOpResult variant must stay in lockstep"),
        }
    }
}

impl<K, V, S> Operation<HashMap<K, V, S>> for MapOp<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
    S: BuildHasher,
{
    type Output = MapOpResult<V>;

    fn apply(&self, container: &mut HashMap<K, V, S>) -> MapOpResult<V> {
        match self {
            MapOp::Put(k, v) => MapOpResult::PrevValue(container.insert(k.clone(), v.clone())),
            MapOp::PutIfAbsent(k, v) => {
                if let Some(existing) = container.get(k) {
                    MapOpResult::PrevValue(Some(existing.clone()))
                } else {
                    container.insert(k.clone(), v.clone());
                    MapOpResult::PrevValue(None)
                }
            }
            MapOp::Remove(k) => MapOpResult::PrevValue(container.remove(k)),
            MapOp::RemoveIfEqual(k, v) => {
                if container.get(k) == Some(v) {
                    container.remove(k);
                    MapOpResult::Removed(true)
                } else {
                    MapOpResult::Removed(false)
                }
            }
            MapOp::Clear => {
                container.clear();
                MapOpResult::Cleared
            }
        }
    }
}

impl<K, V, S> Writer<HashMap<K, V, S>>
where
    K: 'static + Eq + Hash + Clone + Send,
    V: 'static + Clone + PartialEq + Send,
    S: BuildHasher,
{
    /// Insert `(key, value)`, returning the previous value of `key` if any.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.write(MapOp::Put(key, value)).prev_value()
    }

    /// Insert `(key, value)` only if `key` is absent, returning the existing
    /// value of `key` if there was one.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<V> {
        self.write(MapOp::PutIfAbsent(key, value)).prev_value()
    }

    /// Remove `key`, returning its previous value if any.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.write(MapOp::Remove(key)).prev_value()
    }

    /// Remove `key` only if its current value equals `value`. Returns whether
    /// the removal happened.
    pub fn remove_if_equal(&mut self, key: K, value: V) -> bool {
        self.write(MapOp::RemoveIfEqual(key, value)).removed()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.write(MapOp::Clear);
    }
}

impl<K, V, S> Writer<HashMap<K, V, S>>
where
    K: Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// The value of `key`, if present, as seen through the write-side copy
    /// (i.e. including writes not yet refreshed).
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read(|m| m.get(key).cloned())
    }

    /// Like [`Writer::get`], but returns `default` instead of `None`.
    pub fn get_or_default<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read(|m| m.get(key).cloned().unwrap_or(default))
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read(|m| m.contains_key(key))
    }

    /// The number of entries.
    pub fn size(&self) -> usize {
        self.read(|m| m.len())
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.read(|m| m.is_empty())
    }

    /// Visit every `(key, value)` pair. Iteration order is unspecified.
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(&K, &V),
    {
        self.read(|m| {
            for (k, v) in m.iter() {
                action(k, v);
            }
        })
    }
}

impl<K, V, S> Writer<HashMap<K, V, S>>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    /// Whether any entry currently has value `value`. O(n).
    pub fn contains_value(&self, value: &V) -> bool {
        self.read(|m| m.values().any(|v| v == value))
    }
}

impl<K, V, S> Reader<HashMap<K, V, S>>
where
    K: Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// The value of `key`, if present, as of this call's observed copy.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.perform_read(|m| m.get(key).cloned())
    }

    /// Like [`Reader::get`], but returns `default` instead of `None`.
    pub fn get_or_default<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.perform_read(|m| m.get(key).cloned().unwrap_or(default))
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.perform_read(|m| m.contains_key(key))
    }

    /// The number of entries.
    pub fn size(&self) -> usize {
        self.perform_read(|m| m.len())
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.perform_read(|m| m.is_empty())
    }

    /// Visit every `(key, value)` pair. Iteration order is unspecified.
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(&K, &V),
    {
        self.perform_read(|m| {
            for (k, v) in m.iter() {
                action(k, v);
            }
        })
    }
}

impl<K, V, S> Reader<HashMap<K, V, S>>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    /// Whether any entry currently has value `value`. O(n).
    pub fn contains_value(&self, value: &V) -> bool {
        self.perform_read(|m| m.values().any(|v| v == value))
    }
}
