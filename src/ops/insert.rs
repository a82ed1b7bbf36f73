//! Insertion and replacement — COW path-copy with AVL rebalancing.
//!
//! Every node on the path from the mutation point to the root is rebuilt;
//! every off-path subtree is shared by reference with the previous tree.

use std::cmp::Ordering;

use crate::error::RegistryError;
use crate::node::{AvlNode, HashEntry, PersistentList, Tree};

/// Returns a new tree containing all prior entries plus `entry`.
///
/// Equal-hash entries with a different key go onto the node's duplicates
/// list; the tree structure is untouched in that case. The caller must have
/// checked absence under the registry's single-writer discipline — an entry
/// with the same hash and key is a precondition violation.
///
/// # Errors
///
/// [`RegistryError::DuplicateEntry`] if an entry with the same hash and key
/// already exists.
pub fn add<V: Clone>(tree: &Tree<V>, entry: HashEntry<V>) -> Result<Tree<V>, RegistryError> {
    match tree {
        Tree::Empty => Ok(Tree::leaf(entry)),
        Tree::Node(node) => match entry.hash.cmp(&node.entry.hash) {
            Ordering::Less => {
                let left = add(&node.left, entry)?;
                Ok(rebalanced(
                    node.entry.clone(),
                    node.duplicates.clone(),
                    left,
                    node.right.clone(),
                ))
            }
            Ordering::Greater => {
                let right = add(&node.right, entry)?;
                Ok(rebalanced(
                    node.entry.clone(),
                    node.duplicates.clone(),
                    node.left.clone(),
                    right,
                ))
            }
            Ordering::Equal => {
                if node.entry.key == entry.key || node.duplicates.find(&entry.key).is_some() {
                    return Err(RegistryError::DuplicateEntry { key: entry.key });
                }
                // Full hash collision, distinct key — chain it; no
                // structural change, so no rebalancing.
                Ok(Tree::node(AvlNode::new(
                    node.entry.clone(),
                    node.duplicates.push(entry),
                    node.left.clone(),
                    node.right.clone(),
                )))
            }
        },
    }
}

/// Returns a tree with the value for `entry`'s key swapped.
///
/// The key set is unchanged, so the structure is copied along the path but
/// never rebalanced.
///
/// # Errors
///
/// [`RegistryError::EntryNotFound`] if no entry matches the hash and key.
pub fn replace<V: Clone>(tree: &Tree<V>, entry: HashEntry<V>) -> Result<Tree<V>, RegistryError> {
    match tree {
        Tree::Empty => Err(RegistryError::EntryNotFound { key: entry.key }),
        Tree::Node(node) => match entry.hash.cmp(&node.entry.hash) {
            Ordering::Less => {
                let left = replace(&node.left, entry)?;
                Ok(Tree::node(AvlNode::new(
                    node.entry.clone(),
                    node.duplicates.clone(),
                    left,
                    node.right.clone(),
                )))
            }
            Ordering::Greater => {
                let right = replace(&node.right, entry)?;
                Ok(Tree::node(AvlNode::new(
                    node.entry.clone(),
                    node.duplicates.clone(),
                    node.left.clone(),
                    right,
                )))
            }
            Ordering::Equal => {
                if node.entry.key == entry.key {
                    return Ok(Tree::node(AvlNode::new(
                        entry,
                        node.duplicates.clone(),
                        node.left.clone(),
                        node.right.clone(),
                    )));
                }
                match node.duplicates.replace(entry) {
                    Ok(duplicates) => Ok(Tree::node(AvlNode::new(
                        node.entry.clone(),
                        duplicates,
                        node.left.clone(),
                        node.right.clone(),
                    ))),
                    Err(entry) => Err(RegistryError::EntryNotFound { key: entry.key }),
                }
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Rebalancing
// ---------------------------------------------------------------------------

/// Builds a node from its parts, rotating if the height difference of the
/// children exceeds 1.
///
/// The standard four cases, chosen by the taller child's own lean: single
/// right, left-right, single left, right-left. Heights and counts are
/// recomputed bottom-up as new nodes are built.
fn rebalanced<V: Clone>(
    entry: HashEntry<V>,
    duplicates: PersistentList<V>,
    left: Tree<V>,
    right: Tree<V>,
) -> Tree<V> {
    let factor = i64::from(left.height()) - i64::from(right.height());

    if factor > 1 {
        let l = left.as_node().expect("left subtree taller than empty");
        if l.left.height() >= l.right.height() {
            // Single right rotation.
            Tree::node(AvlNode::new(
                l.entry.clone(),
                l.duplicates.clone(),
                l.left.clone(),
                Tree::node(AvlNode::new(entry, duplicates, l.right.clone(), right)),
            ))
        } else {
            // Left-right double rotation with the left-right grandchild as pivot.
            let lr = l.right.as_node().expect("left-right subtree present");
            Tree::node(AvlNode::new(
                lr.entry.clone(),
                lr.duplicates.clone(),
                Tree::node(AvlNode::new(
                    l.entry.clone(),
                    l.duplicates.clone(),
                    l.left.clone(),
                    lr.left.clone(),
                )),
                Tree::node(AvlNode::new(entry, duplicates, lr.right.clone(), right)),
            ))
        }
    } else if factor < -1 {
        let r = right.as_node().expect("right subtree taller than empty");
        if r.right.height() >= r.left.height() {
            // Single left rotation.
            Tree::node(AvlNode::new(
                r.entry.clone(),
                r.duplicates.clone(),
                Tree::node(AvlNode::new(entry, duplicates, left, r.left.clone())),
                r.right.clone(),
            ))
        } else {
            // Right-left double rotation with the right-left grandchild as pivot.
            let rl = r.left.as_node().expect("right-left subtree present");
            Tree::node(AvlNode::new(
                rl.entry.clone(),
                rl.duplicates.clone(),
                Tree::node(AvlNode::new(entry, duplicates, left, rl.left.clone())),
                Tree::node(AvlNode::new(
                    r.entry.clone(),
                    r.duplicates.clone(),
                    rl.right.clone(),
                    r.right.clone(),
                )),
            ))
        }
    } else {
        Tree::node(AvlNode::new(entry, duplicates, left, right))
    }
}
