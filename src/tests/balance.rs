use crate::iter::TreeCursor;
use crate::key::TypeKey;
use crate::node::{HashEntry, Tree};
use crate::ops::insert;

struct Svc;

fn entry(hash: u64) -> HashEntry<u64> {
    HashEntry {
        hash,
        key: TypeKey::named::<Svc>(&hash.to_string()),
        value: hash,
    }
}

/// Checks the AVL invariant and cached heights at every node; returns the
/// subtree height.
fn assert_balanced(tree: &Tree<u64>) -> u32 {
    match tree {
        Tree::Empty => 0,
        Tree::Node(node) => {
            let left = assert_balanced(&node.left);
            let right = assert_balanced(&node.right);
            assert!(
                left.abs_diff(right) <= 1,
                "unbalanced node: left {left}, right {right}"
            );
            let height = 1 + left.max(right);
            assert_eq!(node.height, height, "stale cached height");
            height
        }
    }
}

fn build(hashes: impl IntoIterator<Item = u64>) -> Tree<u64> {
    let mut tree = Tree::Empty;
    for hash in hashes {
        tree = insert::add(&tree, entry(hash)).unwrap();
    }
    tree
}

#[test]
fn ascending_inserts_stay_balanced() {
    let tree = build(0..100);
    assert_balanced(&tree);
    assert_eq!(tree.entry_count(), 100);
    // 100 nodes fit in height ~1.44·log2(101) < 10.
    assert!(tree.height() <= 9, "height {}", tree.height());
}

#[test]
fn descending_inserts_stay_balanced() {
    let tree = build((0..100).rev());
    assert_balanced(&tree);
    assert_eq!(tree.entry_count(), 100);
}

#[test]
fn zigzag_inserts_stay_balanced() {
    // Alternate low/high to exercise the double rotations.
    let hashes = (0..50_u64).flat_map(|i| [i, 1000 - i]);
    let tree = build(hashes);
    assert_balanced(&tree);
    assert_eq!(tree.entry_count(), 100);
}

#[test]
fn every_intermediate_tree_is_balanced() {
    let mut tree = Tree::Empty;
    for hash in [50, 25, 75, 10, 30, 60, 90, 5, 1, 2, 3, 100, 99, 98] {
        tree = insert::add(&tree, entry(hash)).unwrap();
        assert_balanced(&tree);
    }
}

#[test]
fn in_order_cursor_yields_ascending_hashes() {
    let tree = build([50, 10, 90, 5, 40, 70, 100, 1, 7]);
    let hashes: Vec<u64> = TreeCursor::new(&tree).map(|e| e.hash).collect();
    assert_eq!(hashes.len(), 9);
    assert!(hashes.windows(2).all(|w| w[0] < w[1]), "{hashes:?}");
}

#[test]
fn cursor_yields_duplicates_with_their_node() {
    let tree = build([10, 20]);
    let tree = insert::add(
        &tree,
        HashEntry {
            hash: 10,
            key: TypeKey::named::<Svc>("other"),
            value: 11,
        },
    )
    .unwrap();

    let hashes: Vec<u64> = TreeCursor::new(&tree).map(|e| e.hash).collect();
    assert_eq!(hashes, [10, 10, 20]);
}

#[test]
fn cursor_reset_restarts() {
    let tree = build([3, 1, 2]);
    let mut cursor = TreeCursor::new(&tree);
    assert_eq!(cursor.next().map(|e| e.hash), Some(1));
    assert_eq!(cursor.next().map(|e| e.hash), Some(2));

    cursor.reset();
    let hashes: Vec<u64> = cursor.map(|e| e.hash).collect();
    assert_eq!(hashes, [1, 2, 3]);
}

#[test]
fn cursor_on_empty_tree() {
    let tree: Tree<u64> = Tree::Empty;
    assert_eq!(TreeCursor::new(&tree).count(), 0);
}
