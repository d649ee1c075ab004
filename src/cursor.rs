//! Owning, fail-fast cursors over mutable collections.
//!
//! A cursor walks a snapshot taken when it was created, so the collection
//! stays free to be borrowed mutably between steps. It records the
//! collection's modification count and refuses to continue once the
//! collection has been changed by anything but the cursor's own `remove`.

use crate::error::CursorError;
use crate::node::{self, NodeRef};

/// A mutable collection a [`Cursor`] can walk and remove from.
pub trait CursorTarget<K, V> {
    /// Number of modifications applied so far.
    fn mod_count(&self) -> u64;

    /// Removes `key`, returning its value.
    fn remove_key(&mut self, key: &K) -> Option<V>;
}

enum Source<K, V> {
    /// Depth-first walk over shared node handles.
    Trie(Vec<(NodeRef<K, V>, usize)>),
    /// Pre-ordered entries of a sequenced collection.
    Ordered(std::vec::IntoIter<(K, V)>),
}

impl<K: Clone, V: Clone> Source<K, V> {
    fn advance(&mut self) -> Option<(K, V)> {
        match self {
            Self::Trie(stack) => loop {
                let (node, pos) = stack.last_mut()?;
                let at = *pos;
                *pos += 1;

                let data_len = node.data_len();
                if at < data_len {
                    let entry = node.data_at(at);
                    return Some((entry.key.clone(), entry.value.clone()));
                }
                let child = node.child_at(at - data_len).cloned();
                match child {
                    Some(child) => stack.push((child, 0)),
                    None => {
                        stack.pop();
                    }
                }
            },
            Self::Ordered(entries) => entries.next(),
        }
    }
}

/// Fail-fast cursor over a mutable collection.
///
/// Obtained from `cursor()` on the mutable collection types and advanced by
/// handing it the collection on every step:
///
/// ```
/// use champ_collections::MutableChampMap;
///
/// let mut map: MutableChampMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
/// let mut cursor = map.cursor();
/// while let Some((key, _)) = cursor.next(&map).unwrap() {
///     if key % 2 == 0 {
///         cursor.remove(&mut map).unwrap();
///     }
/// }
/// assert_eq!(map.len(), 5);
/// ```
pub struct Cursor<K, V> {
    source: Source<K, V>,
    expected: u64,
    last: Option<K>,
}

impl<K, V> Cursor<K, V> {
    pub(crate) fn over_trie(root: &NodeRef<K, V>, len: usize, mod_count: u64) -> Self {
        let mut stack = Vec::with_capacity(node::MAX_DEPTH as usize + 1);
        if len > 0 {
            stack.push((NodeRef::clone(root), 0));
        }
        Self {
            source: Source::Trie(stack),
            expected: mod_count,
            last: None,
        }
    }

    pub(crate) fn over_ordered(entries: Vec<(K, V)>, mod_count: u64) -> Self {
        Self {
            source: Source::Ordered(entries.into_iter()),
            expected: mod_count,
            last: None,
        }
    }
}

impl<K: Clone, V: Clone> Cursor<K, V> {
    /// Returns the next entry, or `Ok(None)` once the walk is complete.
    ///
    /// # Errors
    ///
    /// [`CursorError::ConcurrentModification`] if `target` was modified
    /// since this cursor was created or last removed through.
    pub fn next<T>(&mut self, target: &T) -> Result<Option<(K, V)>, CursorError>
    where
        T: CursorTarget<K, V> + ?Sized,
    {
        if target.mod_count() != self.expected {
            return Err(CursorError::ConcurrentModification);
        }
        let item = self.source.advance();
        if let Some((key, _)) = &item {
            self.last = Some(key.clone());
        }
        Ok(item)
    }

    /// Like [`next`](Self::next), returning only the key. Convenient for
    /// sets.
    ///
    /// # Errors
    ///
    /// As for [`next`](Self::next).
    pub fn next_key<T>(&mut self, target: &T) -> Result<Option<K>, CursorError>
    where
        T: CursorTarget<K, V> + ?Sized,
    {
        Ok(self.next(target)?.map(|(key, _)| key))
    }

    /// Removes the entry most recently returned by `next` from `target`.
    ///
    /// # Errors
    ///
    /// [`CursorError::IllegalState`] if nothing was returned since the last
    /// removal; [`CursorError::ConcurrentModification`] if `target` was
    /// modified behind the cursor's back.
    pub fn remove<T>(&mut self, target: &mut T) -> Result<V, CursorError>
    where
        T: CursorTarget<K, V> + ?Sized,
    {
        if self.last.is_none() {
            return Err(CursorError::IllegalState);
        }
        if target.mod_count() != self.expected {
            return Err(CursorError::ConcurrentModification);
        }
        let key = self.last.take().ok_or(CursorError::IllegalState)?;
        let value = target
            .remove_key(&key)
            .ok_or(CursorError::ConcurrentModification)?;
        self.expected = target.mod_count();
        Ok(value)
    }
}
