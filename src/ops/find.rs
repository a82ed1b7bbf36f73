//! Lookup operation — hash-steered descent with a duplicates scan.

use std::cmp::Ordering;

use crate::key::TypeKey;
use crate::node::Tree;

/// Searches for `(hash, key)` in `tree`.
///
/// O(log n) descent comparing hash codes; an exact hash match compares the
/// node's key, then falls back to the duplicates list. Safe to call
/// concurrently with any number of other reads and with mutations building
/// new, not-yet-published trees.
#[must_use]
pub fn find<'a, V>(tree: &'a Tree<V>, hash: u64, key: &TypeKey) -> Option<&'a V> {
    let mut current = tree;
    while let Tree::Node(node) = current {
        match hash.cmp(&node.entry.hash) {
            Ordering::Less => current = &node.left,
            Ordering::Greater => current = &node.right,
            Ordering::Equal => {
                if node.entry.key == *key {
                    return Some(&node.entry.value);
                }
                return node.duplicates.find(key);
            }
        }
    }
    None
}
