//! Iterator types for CHAMP collections.

use std::iter::FusedIterator;

use crate::node::{self, Entry, Node};

/// Iterator over references to key-value pairs, in trie order.
///
/// Depth-first walk with an explicit stack of `(node, next position)`
/// frames, where positions run over a node's inline entries first and its
/// children after.
pub struct Iter<'a, K, V> {
    stack: Vec<(&'a Node<K, V>, usize)>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>, len: usize) -> Self {
        let mut stack = Vec::with_capacity(node::MAX_DEPTH as usize + 1);
        if len > 0 {
            stack.push((root, 0));
        }
        Self { stack, remaining: len }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Advances to the next stored entry.
    pub(crate) fn next_entry(&mut self) -> Option<&'a Entry<K, V>> {
        loop {
            let top = self.stack.last_mut()?;
            let node: &'a Node<K, V> = top.0;
            let pos = top.1;
            top.1 += 1;

            let data_len = node.data_len();
            if pos < data_len {
                self.remaining -= 1;
                return Some(node.data_at(pos));
            }
            match node.child_at(pos - data_len) {
                Some(child) => self.stack.push((&**child, 0)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over the keys of a map.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over the values of a map.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Iterator over the elements of a set.
pub struct SetIter<'a, K> {
    pub(crate) inner: Iter<'a, K, ()>,
}

impl<'a, K> Iterator for SetIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, ())| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for SetIter<'_, K> {}

impl<K> FusedIterator for SetIter<'_, K> {}

/// Iterator over key-value pairs in sequence order.
///
/// Entries are gathered and sorted by sequence number when the iterator is
/// created, which is linear in the length of the collection. After that,
/// stepping from either end is O(1). Use `first`/`last` to read one end
/// without paying for the rest.
pub struct SeqIter<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
    front: usize,
    back: usize,
}

impl<'a, K, V> SeqIter<'a, K, V> {
    pub(crate) fn new(entries: Vec<(&'a K, &'a V)>) -> Self {
        let back = entries.len();
        Self {
            entries,
            front: 0,
            back,
        }
    }
}

impl<'a, K, V> Iterator for SeqIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let item = self.entries[self.front];
            self.front += 1;
            Some(item)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<K, V> DoubleEndedIterator for SeqIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.entries[self.back])
        } else {
            None
        }
    }
}

impl<K, V> ExactSizeIterator for SeqIter<'_, K, V> {}

impl<K, V> FusedIterator for SeqIter<'_, K, V> {}

/// Iterator over the elements of a sequenced set, in sequence order.
pub struct SeqSetIter<'a, K> {
    pub(crate) inner: SeqIter<'a, K, ()>,
}

impl<'a, K> Iterator for SeqSetIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, ())| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for SeqSetIter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, ())| k)
    }
}

impl<K> ExactSizeIterator for SeqSetIter<'_, K> {}

impl<K> FusedIterator for SeqSetIter<'_, K> {}
