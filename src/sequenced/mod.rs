//! Insertion-ordered CHAMP collections.
//!
//! Each entry carries a sequence number next to its value. Sequence numbers
//! decide iteration order and the `first`/`last` ends; they never influence
//! where an entry sits in the hash trie. When the numbers drift too far
//! apart, or toward the ends of the `i32` range, they are reassigned densely
//! from zero in their current order.

use std::iter::Rev;

use crate::iter::{SeqIter, SeqSetIter};
use data::SeqTrie;

pub(crate) mod data;
pub mod map;
pub mod set;

/// View of a sequenced map with the sequence order reversed.
///
/// Returned by `reversed()` on the sequenced map types.
pub struct Reversed<'a, K, V> {
    data: &'a SeqTrie<K, V>,
}

impl<'a, K: Eq, V> Reversed<'a, K, V> {
    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying map is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the last entry of the underlying map.
    #[must_use]
    pub fn first(&self) -> Option<(&'a K, &'a V)> {
        self.data
            .last_entry()
            .map(|entry| (&entry.key, &entry.value.value))
    }

    /// Returns the first entry of the underlying map.
    #[must_use]
    pub fn last(&self) -> Option<(&'a K, &'a V)> {
        self.data
            .first_entry()
            .map(|entry| (&entry.key, &entry.value.value))
    }

    /// Iterates from the last entry to the first.
    ///
    /// Like the forward iterator, setup is linear in the length.
    #[must_use]
    pub fn iter(&self) -> Rev<SeqIter<'a, K, V>> {
        SeqIter::new(self.data.ordered_pairs()).rev()
    }
}

/// View of a sequenced set with the sequence order reversed.
pub struct ReversedSet<'a, K> {
    data: &'a SeqTrie<K, ()>,
}

impl<'a, K: Eq> ReversedSet<'a, K> {
    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the last element of the underlying set.
    #[must_use]
    pub fn first(&self) -> Option<&'a K> {
        self.data.last_entry().map(|entry| &entry.key)
    }

    /// Returns the first element of the underlying set.
    #[must_use]
    pub fn last(&self) -> Option<&'a K> {
        self.data.first_entry().map(|entry| &entry.key)
    }

    /// Iterates from the last element to the first.
    #[must_use]
    pub fn iter(&self) -> Rev<SeqSetIter<'a, K>> {
        SeqSetIter {
            inner: SeqIter::new(self.data.ordered_pairs()),
        }
        .rev()
    }
}

impl<'a, K: Eq, V> IntoIterator for &Reversed<'a, K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Rev<SeqIter<'a, K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: Eq> IntoIterator for &ReversedSet<'a, K> {
    type Item = &'a K;
    type IntoIter = Rev<SeqSetIter<'a, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
