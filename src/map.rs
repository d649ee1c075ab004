//! Persistent CHAMP map.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops;

use crate::hash::{self, DefaultHashBuilder, FixedBuildHasher};
use crate::iter::{Iter, Keys, Values};
use crate::mutable::MutableChampMap;
use crate::node::Entry;
use crate::raw::RawTrie;
use crate::set::ChampSet;

/// Persistent hash map based on a CHAMP trie.
///
/// Every update returns a new map sharing all untouched subtrees with the
/// receiver; an update that changes nothing returns a map with the very same
/// root, observable through [`ptr_eq`](Self::ptr_eq). Cloning is O(1).
///
/// The hasher `S` is instantiated on demand and never stored, so all maps of
/// one type place keys identically. Bulk operations between two maps
/// exploit that by merging node against node.
pub struct ChampMap<K, V, S = DefaultHashBuilder> {
    pub(crate) raw: RawTrie<K, V>,
    hasher: PhantomData<fn() -> S>,
}

// ---------------------------------------------------------------------------
// Construction & accessors (no trait bounds)
// ---------------------------------------------------------------------------

impl<K, V> ChampMap<K, V> {
    /// Creates an empty map using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S> ChampMap<K, V, S> {
    pub(crate) const fn from_raw(raw: RawTrie<K, V>) -> Self {
        Self {
            raw,
            hasher: PhantomData,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len == 0
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// An update that changes nothing returns a map for which this holds.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.raw.ptr_eq(&other.raw)
    }

    /// Returns an iterator over `(&K, &V)` pairs, in trie order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw.root, self.raw.len)
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns the shape of the underlying trie.
    #[cfg(feature = "stats")]
    #[must_use]
    pub fn stats(&self) -> crate::TrieStats {
        crate::TrieStats::collect(&self.raw.root)
    }
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

impl<K, V, S: FixedBuildHasher> ChampMap<K, V, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value associated with `key`.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.raw.get(hash::hash_key::<S, _>(key), key)?;
        Some((&entry.key, &entry.value))
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Copy-on-write updates
// ---------------------------------------------------------------------------

impl<K, V, S> ChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    /// Builds a map from `entries` through a transient; a repeated key keeps
    /// its last value.
    #[must_use]
    pub fn copy_of<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        Self::default().copy_put_each(entries)
    }

    /// Returns a map with `key` mapped to `value`.
    ///
    /// If `key` is already mapped to an equal value, the result shares the
    /// receiver's root.
    #[must_use]
    pub fn copy_put(&self, key: K, value: V) -> Self {
        let mut raw = self.raw.clone();
        raw.put(Entry::new(hash::hash_key::<S, _>(&key), key, value), None);
        Self::from_raw(raw)
    }

    /// Returns a map without `key`.
    #[must_use]
    pub fn copy_remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut raw = self.raw.clone();
        raw.remove(hash::hash_key::<S, _>(key), key, None);
        Self::from_raw(raw)
    }

    /// Returns a map holding the entries of both maps.
    ///
    /// For a key present in both, `other`'s value wins unless the two
    /// values are equal. Shared subtrees are merged without descending, so
    /// `m.copy_put_all(&m)` is O(1) and returns `m` itself.
    #[must_use]
    pub fn copy_put_all(&self, other: &Self) -> Self {
        Self::from_raw(self.raw.union(&other.raw, None, &|ours: &V, theirs: &V| ours != theirs))
    }

    /// Returns a map with every pair of `entries` put in order.
    #[must_use]
    pub fn copy_put_each<I: IntoIterator<Item = (K, V)>>(&self, entries: I) -> Self {
        let mut map = self.to_mutable();
        map.extend(entries);
        map.into_immutable()
    }

    /// Returns a map without the keys in `keys`.
    #[must_use]
    pub fn copy_remove_all(&self, keys: &ChampSet<K, S>) -> Self {
        Self::from_raw(self.raw.difference(&keys.raw, None))
    }

    /// Returns a map without any of the keys yielded by `keys`.
    #[must_use]
    pub fn copy_remove_each<'a, I>(&self, keys: I) -> Self
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let mut map = self.to_mutable();
        for key in keys {
            map.remove(key);
        }
        map.into_immutable()
    }

    /// Returns a map restricted to the keys in `keys`.
    #[must_use]
    pub fn copy_retain_all(&self, keys: &ChampSet<K, S>) -> Self {
        Self::from_raw(self.raw.intersect(&keys.raw, None))
    }

    /// Returns a map restricted to the keys of `other`, keeping this map's
    /// values.
    #[must_use]
    pub fn copy_retain_keys_of<W>(&self, other: &ChampMap<K, W, S>) -> Self {
        Self::from_raw(self.raw.intersect(&other.raw, None))
    }

    /// Returns a map holding only the entries for which `keep` is `true`.
    #[must_use]
    pub fn copy_retain_if<F: FnMut(&K, &V) -> bool>(&self, keep: F) -> Self {
        let mut map = self.to_mutable();
        map.retain(keep);
        map.into_immutable()
    }

    /// Returns an empty map, or the receiver if it is already empty.
    #[must_use]
    pub fn copy_clear(&self) -> Self {
        if self.is_empty() { self.clone() } else { Self::default() }
    }

    /// Returns a mutable view seeded with this map's entries.
    ///
    /// O(1): nodes are copied lazily as the view writes to them.
    #[must_use]
    pub fn to_mutable(&self) -> MutableChampMap<K, V, S> {
        MutableChampMap::from_raw(self.raw.clone())
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, S> Clone for ChampMap<K, V, S> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<K, V, S> Default for ChampMap<K, V, S> {
    fn default() -> Self {
        Self::from_raw(RawTrie::new(None))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChampMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for ChampMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: FixedBuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v == w))
    }
}

impl<K, V, S> Eq for ChampMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: FixedBuildHasher,
{
}

impl<K: Hash, V: Hash, S: FixedBuildHasher> Hash for ChampMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(hash::unordered::<S, _, _, _>(self.iter()));
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MutableChampMap::from_iter(iter).into_immutable()
    }
}

impl<K, Q, V, S> ops::Index<&Q> for ChampMap<K, V, S>
where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: FixedBuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChampMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
