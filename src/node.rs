//! CHAMP trie node types and bitmap helpers.

use std::fmt;
use std::sync::Arc;

use crate::owner::OwnerToken;

/// Bits per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Maximum bit-shift value of a bitmap level (depth 7, last level uses 2 bits).
///
/// Two keys still sharing a fragment past this shift share all 32 hash bits
/// and go into a collision node.
pub const MAX_SHIFT: u32 = 30;

/// Number of bitmap levels: ⌈32 / 5⌉.
pub const MAX_DEPTH: u32 = MAX_SHIFT / BITS_PER_LEVEL + 1;

/// Shared handle to a node.
pub type NodeRef<K, V> = Arc<Node<K, V>>;

/// Inline entry storing a key-value pair with its precomputed hash.
#[derive(Clone)]
pub struct Entry<K, V> {
    /// Precomputed 32-bit hash of the key.
    pub hash: u32,
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry.
    pub const fn new(hash: u32, key: K, value: V) -> Self {
        Self { hash, key, value }
    }
}

/// CHAMP trie node.
///
/// - [`Bitmap`](Self::Bitmap): bitmap-compressed node at shift `≤ MAX_SHIFT`
/// - [`Collision`](Self::Collision): linear node for full 32-bit hash collisions
#[derive(Clone)]
pub enum Node<K, V> {
    /// Bitmap-compressed inner node.
    Bitmap(BitmapNode<K, V>),
    /// Collision node for keys sharing the same 32-bit hash.
    Collision(CollisionNode<K, V>),
}

/// Bitmap-compressed node.
///
/// Invariant: `data_map & node_map == 0` (disjoint positions). `data` and
/// `children` are packed in ascending bit order.
#[derive(Clone)]
pub struct BitmapNode<K, V> {
    /// Transient that may mutate this node in place.
    pub owner: Option<OwnerToken>,
    /// Bitmap of positions occupied by inline entries.
    pub data_map: u32,
    /// Bitmap of positions occupied by child subtrees.
    pub node_map: u32,
    /// Inline entries.
    pub data: Vec<Entry<K, V>>,
    /// Child subtrees.
    pub children: Vec<NodeRef<K, V>>,
}

/// Collision node.
///
/// Invariant: `entries.len() >= 2` once linked into a parent.
#[derive(Clone)]
pub struct CollisionNode<K, V> {
    /// Transient that may mutate this node in place.
    pub owner: Option<OwnerToken>,
    /// The shared 32-bit hash value.
    pub hash: u32,
    /// Colliding entries, unordered.
    pub entries: Vec<Entry<K, V>>,
}

/// Contents of one bitmap position.
pub enum Cell<'a, K, V> {
    /// Nothing at this position.
    Empty,
    /// Inline entry.
    Data(&'a Entry<K, V>),
    /// Child subtree.
    Node(&'a NodeRef<K, V>),
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
#[must_use]
pub const fn fragment(hash: u32, shift: u32) -> u32 {
    (hash >> shift) & 0x1F
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
#[must_use]
pub const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the compact index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

/// Iterates the set bits of `bitmap`, lowest first, as single-bit masks.
pub fn bits(bitmap: u32) -> impl Iterator<Item = u32> {
    let mut rest = bitmap;
    std::iter::from_fn(move || {
        if rest == 0 {
            return None;
        }
        let bit = rest & rest.wrapping_neg();
        rest &= rest - 1;
        Some(bit)
    })
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<K, V> BitmapNode<K, V> {
    /// Creates an empty bitmap node.
    pub const fn empty(owner: Option<OwnerToken>) -> Self {
        Self {
            owner,
            data_map: 0,
            node_map: 0,
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Appends an entry at `bit`. Bits must arrive in ascending order.
    pub fn push_data(&mut self, bit: u32, entry: Entry<K, V>) {
        self.data_map |= bit;
        self.data.push(entry);
    }

    /// Appends a child at `bit`. Bits must arrive in ascending order.
    pub fn push_child(&mut self, bit: u32, child: NodeRef<K, V>) {
        self.node_map |= bit;
        self.children.push(child);
    }

    /// Returns what occupies `bit`.
    pub fn cell(&self, bit: u32) -> Cell<'_, K, V> {
        if self.data_map & bit != 0 {
            Cell::Data(&self.data[index(self.data_map, bit)])
        } else if self.node_map & bit != 0 {
            Cell::Node(&self.children[index(self.node_map, bit)])
        } else {
            Cell::Empty
        }
    }

    /// Inserts `entry` as inline data at `bit` (position must be empty).
    pub fn insert_data(&mut self, bit: u32, entry: Entry<K, V>) {
        self.data_map |= bit;
        self.data.insert(index(self.data_map, bit), entry);
    }

    /// Removes and returns the inline entry at `bit`.
    pub fn remove_data(&mut self, bit: u32) -> Entry<K, V> {
        let entry = self.data.remove(index(self.data_map, bit));
        self.data_map &= !bit;
        entry
    }

    /// Inserts `child` at `bit` (position must be empty).
    pub fn insert_child(&mut self, bit: u32, child: NodeRef<K, V>) {
        self.node_map |= bit;
        self.children.insert(index(self.node_map, bit), child);
    }

    /// Removes and returns the child at `bit`.
    pub fn remove_child(&mut self, bit: u32) -> NodeRef<K, V> {
        let child = self.children.remove(index(self.node_map, bit));
        self.node_map &= !bit;
        child
    }
}

impl<K, V> Node<K, V> {
    /// Creates an empty root node.
    pub const fn empty(owner: Option<OwnerToken>) -> Self {
        Self::Bitmap(BitmapNode::empty(owner))
    }

    /// Creates a root node holding a single entry.
    pub fn singleton(entry: Entry<K, V>, owner: Option<OwnerToken>) -> Self {
        let mut node = BitmapNode::empty(owner);
        node.push_data(mask(fragment(entry.hash, 0)), entry);
        Self::Bitmap(node)
    }

    /// Builds the subtree holding two entries with different keys whose
    /// fragments agree on every level above `shift`.
    ///
    /// Descends until the fragments differ, or creates a collision node past
    /// `MAX_SHIFT`.
    pub fn pair(e1: Entry<K, V>, e2: Entry<K, V>, shift: u32, owner: Option<OwnerToken>) -> Self {
        if shift > MAX_SHIFT {
            return Self::Collision(CollisionNode {
                owner,
                hash: e1.hash,
                entries: vec![e1, e2],
            });
        }

        let f1 = fragment(e1.hash, shift);
        let f2 = fragment(e2.hash, shift);
        let mut node = BitmapNode::empty(owner);
        if f1 == f2 {
            let child = Self::pair(e1, e2, shift + BITS_PER_LEVEL, owner);
            node.push_child(mask(f1), Arc::new(child));
        } else if f1 < f2 {
            node.push_data(mask(f1), e1);
            node.push_data(mask(f2), e2);
        } else {
            node.push_data(mask(f2), e2);
            node.push_data(mask(f1), e1);
        }
        Self::Bitmap(node)
    }
}

// ---------------------------------------------------------------------------
// Node accessors
// ---------------------------------------------------------------------------

impl<K, V> Node<K, V> {
    /// Returns the owner stamp of this node.
    pub const fn owner(&self) -> Option<OwnerToken> {
        match self {
            Self::Bitmap(node) => node.owner,
            Self::Collision(node) => node.owner,
        }
    }

    /// Re-stamps this node.
    pub const fn set_owner(&mut self, owner: Option<OwnerToken>) {
        match self {
            Self::Bitmap(node) => node.owner = owner,
            Self::Collision(node) => node.owner = owner,
        }
    }

    /// Returns the number of inline data entries.
    pub fn data_len(&self) -> usize {
        match self {
            Self::Bitmap(node) => node.data.len(),
            Self::Collision(node) => node.entries.len(),
        }
    }

    /// Returns the number of child subtrees (always 0 for collision nodes).
    pub fn children_len(&self) -> usize {
        match self {
            Self::Bitmap(node) => node.children.len(),
            Self::Collision(_) => 0,
        }
    }

    /// Returns the inline entry at `i` (data block order).
    pub fn data_at(&self, i: usize) -> &Entry<K, V> {
        match self {
            Self::Bitmap(node) => &node.data[i],
            Self::Collision(node) => &node.entries[i],
        }
    }

    /// Returns the child subtree at `i`.
    pub fn child_at(&self, i: usize) -> Option<&NodeRef<K, V>> {
        match self {
            Self::Bitmap(node) => node.children.get(i),
            Self::Collision(_) => None,
        }
    }

    /// `true` if this node holds exactly one entry and no children and must
    /// therefore be inlined into its parent.
    pub fn is_singleton(&self) -> bool {
        self.data_len() == 1 && self.children_len() == 0
    }

    /// Counts the entries of the subtree.
    pub fn size(&self) -> usize {
        match self {
            Self::Bitmap(node) => {
                node.data.len() + node.children.iter().map(|c| c.size()).sum::<usize>()
            }
            Self::Collision(node) => node.entries.len(),
        }
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Extracts the single entry of a singleton node, moving it out when the
    /// handle is unique.
    pub fn take_singleton(node: NodeRef<K, V>) -> Entry<K, V> {
        match Arc::try_unwrap(node) {
            Ok(Self::Bitmap(mut node)) => node.data.swap_remove(0),
            Ok(Self::Collision(mut node)) => node.entries.swap_remove(0),
            Err(shared) => shared.data_at(0).clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Owner-guarded editing
// ---------------------------------------------------------------------------

/// Returns `true` if `owner` may mutate the node behind `slot` in place:
/// the node carries that token and nobody else holds the handle.
pub fn is_editable<K, V>(slot: &mut NodeRef<K, V>, owner: Option<OwnerToken>) -> bool {
    owner.is_some() && slot.owner() == owner && Arc::get_mut(slot).is_some()
}

/// Returns a mutable reference to the node behind `slot`, copying it first
/// (and stamping the copy with `owner`) unless it is editable in place.
pub fn edit<K: Clone, V: Clone>(
    slot: &mut NodeRef<K, V>,
    owner: Option<OwnerToken>,
) -> &mut Node<K, V> {
    if !is_editable(slot, owner) {
        let mut copy = Node::clone(&**slot);
        copy.set_owner(owner);
        *slot = Arc::new(copy);
    }
    // Unique at this point, so no clone happens.
    Arc::make_mut(slot)
}

/// Clones the handle of the child at `bit` of the bitmap node behind `slot`.
pub fn child_handle<K, V>(slot: &NodeRef<K, V>, bit: u32) -> NodeRef<K, V> {
    match &**slot {
        Node::Bitmap(node) => Arc::clone(&node.children[index(node.node_map, bit)]),
        Node::Collision(_) => unreachable!("collision nodes have no children"),
    }
}

/// Like [`edit`], for a slot known to hold a bitmap node.
pub fn edit_bitmap<K: Clone, V: Clone>(
    slot: &mut NodeRef<K, V>,
    owner: Option<OwnerToken>,
) -> &mut BitmapNode<K, V> {
    match edit(slot, owner) {
        Node::Bitmap(node) => node,
        Node::Collision(_) => unreachable!("bitmap slot holds a collision node"),
    }
}

/// Like [`edit`], for a slot known to hold a collision node.
pub fn edit_collision<K: Clone, V: Clone>(
    slot: &mut NodeRef<K, V>,
    owner: Option<OwnerToken>,
) -> &mut CollisionNode<K, V> {
    match edit(slot, owner) {
        Node::Collision(node) => node,
        Node::Bitmap(_) => unreachable!("collision slot holds a bitmap node"),
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls to avoid false `K: Debug, V: Debug` bounds.
// ---------------------------------------------------------------------------

impl<K, V> fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitmap(node) => f
                .debug_struct("Bitmap")
                .field("data_map", &format_args!("{:#034b}", node.data_map))
                .field("node_map", &format_args!("{:#034b}", node.node_map))
                .field("owned", &node.owner.is_some())
                .field("children", &node.children)
                .finish(),
            Self::Collision(node) => f
                .debug_struct("Collision")
                .field("hash", &format_args!("{:#010x}", node.hash))
                .field("entries_len", &node.entries.len())
                .finish(),
        }
    }
}
