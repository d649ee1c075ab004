//! Persistent hash collections based on CHAMP.
//!
//! CHAMP (Compressed Hash-Array Mapped Prefix-tree) is a refined HAMT that
//! guarantees **canonical form**: the same set of entries always produces
//! the same trie structure, regardless of insertion or deletion history.
//!
//! # Collections
//!
//! | | persistent | mutable view |
//! |---|---|---|
//! | map | [`ChampMap`] | [`MutableChampMap`] |
//! | set | [`ChampSet`] | [`MutableChampSet`] |
//! | insertion-ordered map | [`SequencedChampMap`] | [`MutableSequencedChampMap`] |
//! | insertion-ordered set | [`SequencedChampSet`] | [`MutableSequencedChampSet`] |
//!
//! Persistent collections never change; every `copy_*` update returns a new
//! collection sharing all untouched subtrees with the old one, and returns
//! the very same root when nothing changed. Mutable views update nodes in
//! place once they own them and freeze into a persistent collection in
//! O(1).
//!
//! # Key properties
//!
//! - **Canonical form**: same contents = same structure
//! - **Structural sharing**: `Arc` node handles, shared across snapshots
//! - **Node-level bulk merges**: union, intersection and difference skip
//!   shared subtrees without descending
//! - **Transient mutation**: owner tokens plus unique-handle checks decide
//!   between in-place update and copy-on-write
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Features
//!
//! - `foldhash` (default): [`DefaultHashBuilder`] is fixed-seed foldhash
//! - `serde`: `Serialize`/`Deserialize` for the persistent collections
//! - `stats`: `stats()` reports the trie shape as [`TrieStats`]
//!
//! # References
//!
//! - Steindorfer & Vinju, 2015, "Optimizing Hash-Array Mapped Tries
//!   for Fast and Lean Immutable JVM Collections", OOPSLA 2015
//! - Bagwell, 2001, "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod cursor;
mod error;
mod hash;
mod iter;
mod map;
mod mutable;
mod node;
mod ops;
mod owner;
mod raw;
mod sequenced;
mod set;

#[cfg(feature = "serde")]
mod serde;
#[cfg(feature = "stats")]
mod stats;

#[cfg(test)]
mod tests;

pub use cursor::{Cursor, CursorTarget};
pub use error::CursorError;
pub use hash::{DefaultHashBuilder, FixedBuildHasher};
pub use iter::{Iter, Keys, SeqIter, SeqSetIter, SetIter, Values};
pub use map::ChampMap;
pub use mutable::{MutableChampMap, MutableChampSet};
pub use sequenced::map::{MutableSequencedChampMap, SequencedChampMap};
pub use sequenced::set::{MutableSequencedChampSet, SequencedChampSet};
pub use sequenced::{Reversed, ReversedSet};
pub use set::ChampSet;
#[cfg(feature = "stats")]
pub use stats::TrieStats;
