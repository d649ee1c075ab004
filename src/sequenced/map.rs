//! Sequenced maps: CHAMP maps that remember the order of their keys.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops;

use crate::ChampSet;
use crate::cursor::{Cursor, CursorTarget};
use crate::hash::{self, DefaultHashBuilder, FixedBuildHasher};
use crate::iter::SeqIter;
use crate::ops::put::PutOutcome;
use crate::owner::OwnerToken;
use crate::sequenced::Reversed;
use crate::sequenced::data::{Position, SeqTrie};

// ---------------------------------------------------------------------------
// SequencedChampMap
// ---------------------------------------------------------------------------

/// Persistent hash map that iterates in insertion order.
///
/// [`copy_put`](Self::copy_put) appends new keys and leaves existing keys
/// where they are; [`copy_put_first`](Self::copy_put_first) and
/// [`copy_put_last`](Self::copy_put_last) move a key to either end.
///
/// Lookups cost the same as in [`ChampMap`](crate::ChampMap); every update
/// touches two tries, one keyed by key and one by sequence number.
pub struct SequencedChampMap<K, V, S = DefaultHashBuilder> {
    data: SeqTrie<K, V>,
    hasher: PhantomData<fn() -> S>,
}

impl<K, V> SequencedChampMap<K, V> {
    /// Creates an empty map using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S> SequencedChampMap<K, V, S> {
    const fn from_data(data: SeqTrie<K, V>) -> Self {
        Self {
            data,
            hasher: PhantomData,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns `true` if both maps share the same root nodes.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.data.ptr_eq(&other.data)
    }

    /// Returns an iterator over `(&K, &V)` pairs, in sequence order.
    ///
    /// The iterator is double-ended; `.rev()` walks from the last entry.
    /// Creating it sorts the entries by sequence number in linear time.
    #[must_use]
    pub fn iter(&self) -> SeqIter<'_, K, V> {
        SeqIter::new(self.data.ordered_pairs())
    }

    /// Returns a view with the sequence order reversed.
    #[must_use]
    pub const fn reversed(&self) -> Reversed<'_, K, V> {
        Reversed { data: &self.data }
    }
}

impl<K: Eq, V, S> SequencedChampMap<K, V, S> {
    /// Returns the first entry.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.data
            .first_entry()
            .map(|entry| (&entry.key, &entry.value.value))
    }

    /// Returns the last entry.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.data
            .last_entry()
            .map(|entry| (&entry.key, &entry.value.value))
    }
}

impl<K, V, S: FixedBuildHasher> SequencedChampMap<K, V, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.data.get(hash::hash_key::<S, _>(key), key)?;
        Some(&entry.value.value)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V, S> SequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn updated(&self, update: impl FnOnce(&mut SeqTrie<K, V>)) -> Self {
        let mut data = self.data.clone();
        update(&mut data);
        Self::from_data(data)
    }

    fn put_at(&self, key: K, value: V, position: Position) -> Self {
        self.updated(|data| {
            data.put(hash::hash_key::<S, _>(&key), key, value, position, None);
        })
    }

    /// Builds a map from `entries`, in the order given. A repeated key keeps
    /// its first position and its last value.
    #[must_use]
    pub fn copy_of<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        Self::default().copy_put_each(entries)
    }

    /// Returns a map with `key` mapped to `value`.
    ///
    /// A new key is appended; an existing key keeps its position. If the
    /// stored value is equal, the result shares the receiver's roots.
    #[must_use]
    pub fn copy_put(&self, key: K, value: V) -> Self {
        self.put_at(key, value, Position::Keep)
    }

    /// Returns a map with `key` mapped to `value` at the front.
    #[must_use]
    pub fn copy_put_first(&self, key: K, value: V) -> Self {
        self.put_at(key, value, Position::First)
    }

    /// Returns a map with `key` mapped to `value` at the back.
    #[must_use]
    pub fn copy_put_last(&self, key: K, value: V) -> Self {
        self.put_at(key, value, Position::Last)
    }

    /// Returns a map without `key`.
    #[must_use]
    pub fn copy_remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.updated(|data| {
            data.remove(hash::hash_key::<S, _>(key), key, None);
        })
    }

    /// Returns a map without its first entry.
    #[must_use]
    pub fn copy_remove_first(&self) -> Self {
        self.updated(|data| {
            data.poll_first(None);
        })
    }

    /// Returns a map without its last entry.
    #[must_use]
    pub fn copy_remove_last(&self) -> Self {
        self.updated(|data| {
            data.poll_last(None);
        })
    }

    /// Returns a map with the entries of `other` put in `other`'s order.
    ///
    /// Keys new to this map are appended; existing keys keep their position
    /// and take `other`'s value.
    #[must_use]
    pub fn copy_put_all(&self, other: &Self) -> Self {
        if self.ptr_eq(other) || other.is_empty() {
            return self.clone();
        }
        let mut map = self.to_mutable();
        map.put_all(other);
        map.into_immutable()
    }

    /// Returns a map with every pair of `entries` put in order.
    #[must_use]
    pub fn copy_put_each<I: IntoIterator<Item = (K, V)>>(&self, entries: I) -> Self {
        let mut map = self.to_mutable();
        map.extend(entries);
        map.into_immutable()
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

    /// Returns a map without the keys in `keys`, in this map's order.
    #[must_use]
    pub fn copy_remove_all(&self, keys: &ChampSet<K, S>) -> Self {
        if self.is_empty() || keys.is_empty() {
            return self.clone();
        }
        let mut map = self.to_mutable();
        map.remove_all(keys);
        map.into_immutable()
    }

    /// Returns a map restricted to the keys in `keys`, in this map's order.
    #[must_use]
    pub fn copy_retain_all(&self, keys: &ChampSet<K, S>) -> Self {
        if keys.is_empty() {
            return self.copy_clear();
        }
        let mut map = self.to_mutable();
        map.retain_all(keys);
        map.into_immutable()
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
    #[must_use]
    pub fn to_mutable(&self) -> MutableSequencedChampMap<K, V, S> {
        MutableSequencedChampMap::from_data(self.data.clone())
    }
}

impl<K, V, S> Clone for SequencedChampMap<K, V, S> {
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<K, V, S> Default for SequencedChampMap<K, V, S> {
    fn default() -> Self {
        Self::from_data(SeqTrie::new(None))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for SequencedChampMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equality ignores order: two sequenced maps are equal when they hold the
/// same entries.
impl<K, V, S> PartialEq for SequencedChampMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: FixedBuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len()
                && self
                    .iter()
                    .all(|(k, v)| other.get(k).is_some_and(|w| v == w)))
    }
}

impl<K, V, S> Eq for SequencedChampMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: FixedBuildHasher,
{
}

impl<K: Hash, V: Hash, S: FixedBuildHasher> Hash for SequencedChampMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(hash::unordered::<S, _, _, _>(self.data.pairs()));
    }
}

impl<K, V, S> FromIterator<(K, V)> for SequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MutableSequencedChampMap::from_iter(iter).into_immutable()
    }
}

impl<K, Q, V, S> ops::Index<&Q> for SequencedChampMap<K, V, S>
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

impl<'a, K, V, S> IntoIterator for &'a SequencedChampMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = SeqIter<'a, K, V>;

    fn into_iter(self) -> SeqIter<'a, K, V> {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// MutableSequencedChampMap
// ---------------------------------------------------------------------------

/// Mutable counterpart of [`SequencedChampMap`].
pub struct MutableSequencedChampMap<K, V, S = DefaultHashBuilder> {
    data: SeqTrie<K, V>,
    owner: OwnerToken,
    mod_count: u64,
    hasher: PhantomData<fn() -> S>,
}

impl<K, V> MutableSequencedChampMap<K, V> {
    /// Creates an empty map using the default hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S> MutableSequencedChampMap<K, V, S> {
    fn from_data(data: SeqTrie<K, V>) -> Self {
        Self {
            data,
            owner: OwnerToken::new(),
            mod_count: 0,
            hasher: PhantomData,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns an iterator over `(&K, &V)` pairs, in sequence order.
    #[must_use]
    pub fn iter(&self) -> SeqIter<'_, K, V> {
        SeqIter::new(self.data.ordered_pairs())
    }

    /// Returns a view with the sequence order reversed.
    #[must_use]
    pub const fn reversed(&self) -> Reversed<'_, K, V> {
        Reversed { data: &self.data }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.data = SeqTrie::new(Some(self.owner));
            self.bump();
        }
    }

    /// Returns an immutable snapshot and keeps the view usable.
    #[must_use]
    pub fn to_immutable(&mut self) -> SequencedChampMap<K, V, S> {
        self.owner = OwnerToken::new();
        SequencedChampMap::from_data(self.data.clone())
    }

    /// Consumes the view and returns its contents as an immutable map.
    #[must_use]
    pub fn into_immutable(self) -> SequencedChampMap<K, V, S> {
        SequencedChampMap::from_data(self.data)
    }

    const fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }
}

impl<K: Eq, V, S> MutableSequencedChampMap<K, V, S> {
    /// Returns the first entry.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.data
            .first_entry()
            .map(|entry| (&entry.key, &entry.value.value))
    }

    /// Returns the last entry.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.data
            .last_entry()
            .map(|entry| (&entry.key, &entry.value.value))
    }
}

impl<K: Clone, V: Clone, S> MutableSequencedChampMap<K, V, S> {
    /// Returns a fail-fast cursor over a snapshot of the entries, in
    /// sequence order.
    #[must_use]
    pub fn cursor(&self) -> Cursor<K, V> {
        let entries = self
            .data
            .ordered_pairs()
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Cursor::over_ordered(entries, self.mod_count)
    }
}

impl<K, V, S: FixedBuildHasher> MutableSequencedChampMap<K, V, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.data.get(hash::hash_key::<S, _>(key), key)?;
        Some(&entry.value.value)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K, V, S> MutableSequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn put_at(&mut self, key: K, value: V, position: Position) -> Option<V> {
        let hash = hash::hash_key::<S, _>(&key);
        match self.data.put(hash, key, value, position, Some(self.owner)) {
            PutOutcome::Inserted => {
                self.bump();
                None
            }
            PutOutcome::Replaced(old) => {
                self.bump();
                Some(old)
            }
            PutOutcome::Unchanged(same) => Some(same),
        }
    }

    /// Maps `key` to `value`, appending a new key and leaving an existing
    /// key at its position. Returns the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put_at(key, value, Position::Keep)
    }

    /// Maps `key` to `value` and moves it to the front.
    pub fn put_first(&mut self, key: K, value: V) -> Option<V> {
        self.put_at(key, value, Position::First)
    }

    /// Maps `key` to `value` and moves it to the back.
    pub fn put_last(&mut self, key: K, value: V) -> Option<V> {
        self.put_at(key, value, Position::Last)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (_, value) = self
            .data
            .remove(hash::hash_key::<S, _>(key), key, Some(self.owner))?;
        self.bump();
        Some(value)
    }

    /// Removes and returns the first entry.
    pub fn poll_first(&mut self) -> Option<(K, V)> {
        let polled = self.data.poll_first(Some(self.owner))?;
        self.bump();
        Some(polled)
    }

    /// Removes and returns the last entry.
    pub fn poll_last(&mut self) -> Option<(K, V)> {
        let polled = self.data.poll_last(Some(self.owner))?;
        self.bump();
        Some(polled)
    }

    /// Puts the entries of `other` in `other`'s order. Returns `true` if the
    /// map changed.
    pub fn put_all(&mut self, other: &SequencedChampMap<K, V, S>) -> bool {
        let before = self.mod_count;
        for entry in other.data.ordered() {
            self.put_at(entry.key.clone(), entry.value.value.clone(), Position::Keep);
        }
        self.mod_count != before
    }

    /// Removes the keys in `keys`. Returns `true` if the map changed.
    pub fn remove_all(&mut self, keys: &ChampSet<K, S>) -> bool {
        let before = self.mod_count;
        if keys.len() < self.len() {
            for key in keys {
                self.remove(key);
            }
        } else {
            self.retain(|k, _| !keys.contains(k));
        }
        self.mod_count != before
    }

    /// Keeps only the keys in `keys`. Returns `true` if the map changed.
    pub fn retain_all(&mut self, keys: &ChampSet<K, S>) -> bool {
        let before = self.mod_count;
        self.retain(|k, _| keys.contains(k));
        self.mod_count != before
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
        let doomed: Vec<K> = self
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
    }
}

impl<K, V, S> CursorTarget<K, V> for MutableSequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn mod_count(&self) -> u64 {
        self.mod_count
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

impl<K, V, S> Clone for MutableSequencedChampMap<K, V, S> {
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<K, V, S> Default for MutableSequencedChampMap<K, V, S> {
    fn default() -> Self {
        let owner = OwnerToken::new();
        Self {
            data: SeqTrie::new(Some(owner)),
            owner,
            mod_count: 0,
            hasher: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for MutableSequencedChampMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for MutableSequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for MutableSequencedChampMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: FixedBuildHasher,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> From<MutableSequencedChampMap<K, V, S>> for SequencedChampMap<K, V, S> {
    fn from(map: MutableSequencedChampMap<K, V, S>) -> Self {
        map.into_immutable()
    }
}

impl<'a, K, V, S> IntoIterator for &'a MutableSequencedChampMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = SeqIter<'a, K, V>;

    fn into_iter(self) -> SeqIter<'a, K, V> {
        self.iter()
    }
}
