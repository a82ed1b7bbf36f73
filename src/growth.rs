//! Bucket-count growth policy.
//!
//! A policy is a plain value constructed by the caller and carried by each
//! bucket array — never a process-wide static — so tests can run distinct,
//! deterministic policies side by side.
//!
//! All bucket counts are powers of two: the bucket index is
//! `hash & (count - 1)`, and the progression table continues by doubling
//! once exhausted.

use std::any::TypeId;

use crate::iter::TreeCursor;
use crate::node::Tree;

/// Default progression of bucket counts.
pub const DEFAULT_TABLE: &[usize] = &[
    2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536,
];

/// Default tree-height limit before a bucket is considered overgrown.
pub const DEFAULT_HEIGHT_LIMIT: u32 = 3;

/// Decides when a bucket array grows and how many buckets the next snapshot
/// gets.
#[derive(Clone, Copy, Debug)]
pub struct GrowthPolicy {
    table: &'static [usize],
    height_limit: u32,
}

impl GrowthPolicy {
    /// Creates a policy over [`DEFAULT_TABLE`] with the given height limit.
    #[must_use]
    pub const fn new(height_limit: u32) -> Self {
        Self {
            table: DEFAULT_TABLE,
            height_limit,
        }
    }

    /// Creates a policy with a custom progression table.
    ///
    /// Every table entry must be a power of two; the progression continues
    /// by doubling once the table is exhausted.
    #[must_use]
    pub const fn with_table(table: &'static [usize], height_limit: u32) -> Self {
        Self {
            table,
            height_limit,
        }
    }

    /// Returns the bucket count for a freshly created array.
    #[must_use]
    pub fn initial_count(&self) -> usize {
        self.table.first().copied().unwrap_or(2)
    }

    /// Returns the next bucket count strictly greater than `current`.
    #[must_use]
    pub fn next_count(&self, current: usize) -> usize {
        self.table
            .iter()
            .copied()
            .find(|&count| count > current)
            .unwrap_or(current * 2)
    }

    /// Returns `true` if inserting into `bucket` should trigger a resize.
    ///
    /// Two conditions must hold: the bucket's tree height exceeds the limit,
    /// and the bucket mixes entries of more than one underlying type. A
    /// bucket deep only because one type carries many registration names is
    /// exempt — growing cannot shorten that chain.
    #[must_use]
    pub fn should_grow<V>(&self, bucket: &Tree<V>) -> bool {
        bucket.height() > self.height_limit && !all_same_type(bucket)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HEIGHT_LIMIT)
    }
}

/// Returns `true` if every entry in `tree` registers the same underlying
/// type (ignoring registration names). Vacuously true for the empty tree.
fn all_same_type<V>(tree: &Tree<V>) -> bool {
    let mut entries = TreeCursor::new(tree);
    let Some(first) = entries.next() else {
        return true;
    };
    let type_id: TypeId = first.key.type_id();
    entries.all(|entry| entry.key.type_id() == type_id)
}
