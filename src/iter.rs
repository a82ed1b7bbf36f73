//! In-order tree cursor.
//!
//! Traversal uses an explicit stack sized to the tree height instead of
//! recursion, so degenerate inputs never consume call-stack proportional to
//! the entry count. The cursor is a plain value: restartable via
//! [`reset`](TreeCursor::reset), safe to abandon at any point.

use crate::node::{AvlNode, HashEntry, ListIter, Tree};

/// Restartable in-order cursor over a [`Tree`].
///
/// Yields entries in ascending hash order; within one node, the node's own
/// entry first, then its duplicates.
pub struct TreeCursor<'a, V> {
    root: &'a Tree<V>,
    stack: Vec<&'a AvlNode<V>>,
    duplicates: Option<ListIter<'a, V>>,
}

impl<'a, V> TreeCursor<'a, V> {
    /// Creates a cursor positioned before the first entry of `root`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // heights are far below usize::MAX
    pub fn new(root: &'a Tree<V>) -> Self {
        let mut cursor = Self {
            root,
            stack: Vec::with_capacity(root.height() as usize),
            duplicates: None,
        };
        cursor.descend_left(root);
        cursor
    }

    /// Rewinds the cursor to the first entry.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.duplicates = None;
        let root = self.root;
        self.descend_left(root);
    }

    fn descend_left(&mut self, mut tree: &'a Tree<V>) {
        while let Tree::Node(node) = tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }
}

impl<'a, V> Iterator for TreeCursor<'a, V> {
    type Item = &'a HashEntry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(duplicates) = &mut self.duplicates {
            if let Some(entry) = duplicates.next() {
                return Some(entry);
            }
            self.duplicates = None;
        }
        let node = self.stack.pop()?;
        self.descend_left(&node.right);
        self.duplicates = Some(node.duplicates.iter());
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Exact remaining count is not tracked; the total is an upper bound.
        (0, Some(self.root.entry_count()))
    }
}
