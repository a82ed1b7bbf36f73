//! Persistent AVL tree node types and the duplicates chain.
//!
//! Nodes are immutable after construction. Every mutation builds a new node
//! (and new ancestors up to the root) while untouched subtrees are shared by
//! reference — a reader holding an old root sees a permanently consistent
//! tree regardless of concurrent inserts elsewhere.

use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

/// Immutable `(hash, key, value)` triple, created once when inserted.
#[derive(Clone)]
pub struct HashEntry<V> {
    /// Precomputed 64-bit hash of the key.
    pub hash: u64,
    /// The registration key.
    pub key: TypeKey,
    /// The stored value.
    pub value: V,
}

impl<V: fmt::Debug> fmt::Debug for HashEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashEntry")
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PersistentList — duplicates chain
// ---------------------------------------------------------------------------

/// Immutable singly linked list of entries sharing one node's hash code but
/// differing by key.
///
/// `push` prepends in O(1) and shares the tail with the previous list.
pub struct PersistentList<V> {
    head: Option<Arc<ListNode<V>>>,
    len: usize,
}

struct ListNode<V> {
    entry: HashEntry<V>,
    next: Option<Arc<ListNode<V>>>,
}

impl<V> PersistentList<V> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a new list with `entry` prepended; the tail is shared.
    #[must_use]
    pub fn push(&self, entry: HashEntry<V>) -> Self {
        Self {
            head: Some(Arc::new(ListNode {
                entry,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Returns the value stored for `key`, if present.
    #[must_use]
    pub fn find(&self, key: &TypeKey) -> Option<&V> {
        self.iter().find(|e| e.key == *key).map(|e| &e.value)
    }

    /// Returns an iterator over the entries, most recently pushed first.
    #[must_use]
    pub const fn iter(&self) -> ListIter<'_, V> {
        ListIter {
            next: self.head.as_ref(),
        }
    }
}

impl<V: Clone> PersistentList<V> {
    /// Returns a new list with the entry for `entry.key` swapped for `entry`.
    ///
    /// Entries before the match are copied; the tail after it is shared.
    /// Returns the entry back via `Err` if no entry has a matching key.
    pub fn replace(&self, entry: HashEntry<V>) -> Result<Self, HashEntry<V>> {
        let mut prefix = Vec::new();
        let mut cursor = self.head.as_ref();
        while let Some(node) = cursor {
            if node.entry.key == entry.key {
                let mut head = Some(Arc::new(ListNode {
                    entry,
                    next: node.next.clone(),
                }));
                for e in prefix.into_iter().rev() {
                    head = Some(Arc::new(ListNode { entry: e, next: head }));
                }
                return Ok(Self {
                    head,
                    len: self.len,
                });
            }
            prefix.push(node.entry.clone());
            cursor = node.next.as_ref();
        }
        Err(entry)
    }
}

// Manual impls — the list shares nodes by Arc, so cloning never needs
// `V: Clone` and default construction never needs `V: Default`.

impl<V> Clone for PersistentList<V> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<V> Default for PersistentList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for PersistentList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over `&HashEntry` items of a [`PersistentList`].
pub struct ListIter<'a, V> {
    next: Option<&'a Arc<ListNode<V>>>,
}

impl<'a, V> Iterator for ListIter<'a, V> {
    type Item = &'a HashEntry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_ref();
        Some(&node.entry)
    }
}

// ---------------------------------------------------------------------------
// Tree / AvlNode
// ---------------------------------------------------------------------------

/// A persistent AVL tree keyed by `(hash, key)`.
///
/// Children are always a real node or [`Empty`](Self::Empty) — never a
/// nullable reference — so traversal needs no null checks.
pub enum Tree<V> {
    /// The canonical empty tree. `height() == 0`, `entry_count() == 0`.
    Empty,
    /// A non-empty subtree.
    Node(Arc<AvlNode<V>>),
}

/// One immutable node of the tree.
///
/// Invariant: `|left.height() - right.height()| <= 1` at every node.
/// `height`, `node_count`, and `entry_count` are cached at construction for
/// O(1) reads — never recomputed by traversal.
pub struct AvlNode<V> {
    /// The entry stored at this node.
    pub entry: HashEntry<V>,
    /// Entries sharing this node's hash but with a different key.
    pub duplicates: PersistentList<V>,
    /// Left subtree (strictly smaller hashes).
    pub left: Tree<V>,
    /// Right subtree (strictly larger hashes).
    pub right: Tree<V>,
    /// Height of this subtree (leaf = 1).
    pub height: u32,
    /// Number of tree nodes in this subtree.
    pub node_count: usize,
    /// Number of entries in this subtree, duplicates included.
    pub entry_count: usize,
}

impl<V> AvlNode<V> {
    /// Builds a node from its parts, computing the cached totals bottom-up.
    #[must_use]
    pub fn new(
        entry: HashEntry<V>,
        duplicates: PersistentList<V>,
        left: Tree<V>,
        right: Tree<V>,
    ) -> Self {
        let height = 1 + left.height().max(right.height());
        let node_count = 1 + left.node_count() + right.node_count();
        let entry_count = 1 + duplicates.len() + left.entry_count() + right.entry_count();
        Self {
            entry,
            duplicates,
            left,
            right,
            height,
            node_count,
            entry_count,
        }
    }
}

impl<V> Tree<V> {
    /// Wraps a node into a tree.
    #[must_use]
    pub fn node(node: AvlNode<V>) -> Self {
        Self::Node(Arc::new(node))
    }

    /// Creates a single-node tree holding `entry`.
    #[must_use]
    pub fn leaf(entry: HashEntry<V>) -> Self {
        Self::node(AvlNode::new(
            entry,
            PersistentList::new(),
            Self::Empty,
            Self::Empty,
        ))
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the height of the tree (empty = 0).
    #[must_use]
    pub fn height(&self) -> u32 {
        match self {
            Self::Empty => 0,
            Self::Node(n) => n.height,
        }
    }

    /// Returns the number of tree nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(n) => n.node_count,
        }
    }

    /// Returns the number of entries, duplicates included.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(n) => n.entry_count,
        }
    }

    /// Returns the root node, or `None` for the empty tree.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Arc<AvlNode<V>>> {
        match self {
            Self::Empty => None,
            Self::Node(n) => Some(n),
        }
    }
}

// Manual impls — subtrees are shared by Arc, so cloning a tree never clones
// values and never needs `V: Clone`.

impl<V> Clone for Tree<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Node(n) => Self::Node(Arc::clone(n)),
        }
    }
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<V> fmt::Debug for Tree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Node(n) => f
                .debug_struct("Tree")
                .field("height", &n.height)
                .field("node_count", &n.node_count)
                .field("entry_count", &n.entry_count)
                .finish_non_exhaustive(),
        }
    }
}
