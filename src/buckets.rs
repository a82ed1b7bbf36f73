//! Immutable bucket array — the registry's snapshot type.
//!
//! An array of persistent tree roots. Hashing selects a bucket; the tree
//! inside handles ordering and full-hash collisions. The array is replaced
//! wholesale on every successful insert: a non-resizing insert rebuilds only
//! the touched bucket's path and shares every other bucket by reference,
//! while a resize redistributes every entry into a freshly sized array.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::growth::GrowthPolicy;
use crate::iter::TreeCursor;
use crate::key::TypeKey;
use crate::node::{HashEntry, Tree};
use crate::ops::{find, insert};

/// Outcome of [`BucketArray::get_or_add`].
pub enum GetOrAddOutcome<V> {
    /// The key already had a value; nothing was built.
    Found(V),
    /// A new entry was created; `array` is the snapshot to publish.
    Inserted {
        /// The freshly created value.
        value: V,
        /// The new array containing it.
        array: BucketArray<V>,
    },
}

// Manual impl — reporting the variant never needs `V: Debug`.
impl<V> fmt::Debug for GetOrAddOutcome<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(_) => f.write_str("Found"),
            Self::Inserted { array, .. } => f
                .debug_struct("Inserted")
                .field("array", array)
                .finish_non_exhaustive(),
        }
    }
}

/// Immutable array of tree roots plus the growth policy it was built with.
pub struct BucketArray<V> {
    buckets: Box<[Tree<V>]>,
    entry_count: usize,
    policy: GrowthPolicy,
    values_cache: OnceCell<Arc<[V]>>,
    keys_cache: OnceCell<Arc<[TypeKey]>>,
}

impl<V> BucketArray<V> {
    /// Creates an empty array sized by the policy's initial count.
    #[must_use]
    pub fn new(policy: GrowthPolicy) -> Self {
        Self::with_buckets(vec![Tree::Empty; policy.initial_count()], 0, policy)
    }

    fn with_buckets(buckets: Vec<Tree<V>>, entry_count: usize, policy: GrowthPolicy) -> Self {
        debug_assert!(buckets.len().is_power_of_two());
        Self {
            buckets: buckets.into_boxed_slice(),
            entry_count,
            policy,
            values_cache: OnceCell::new(),
            keys_cache: OnceCell::new(),
        }
    }

    /// Returns the number of buckets.
    #[must_use]
    pub const fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of entries across all buckets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entry_count
    }

    /// Returns `true` if the array holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Returns the growth policy this array was built with.
    #[must_use]
    pub const fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Returns the tree in the bucket `key` hashes to.
    #[must_use]
    pub fn bucket_of(&self, key: &TypeKey) -> &Tree<V> {
        &self.buckets[self.bucket_index(key.hash())]
    }

    /// Selects a bucket by masking; bucket counts are always powers of two.
    const fn bucket_index(&self, hash: u64) -> usize {
        index_for(hash, self.buckets.len())
    }

    /// Returns a reference to the value stored for `key`, if present.
    #[must_use]
    pub fn find(&self, key: &TypeKey) -> Option<&V> {
        let hash = key.hash();
        find::find(&self.buckets[self.bucket_index(hash)], hash, key)
    }
}

impl<V: Clone> BucketArray<V> {
    /// Looks up `key`, invoking `create` to build the value if absent.
    ///
    /// The found path is a pure read: no allocation, no new array. The
    /// insert path may invoke `create` and still lose at the registry layer
    /// — this component alone does not guarantee `create` runs at most
    /// once; the registry's writer lock does.
    ///
    /// # Errors
    ///
    /// Whatever `create` returns; nothing is built on error.
    pub fn get_or_add<F, E>(&self, key: &TypeKey, create: F) -> Result<GetOrAddOutcome<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(existing) = self.find(key) {
            return Ok(GetOrAddOutcome::Found(existing.clone()));
        }
        let value = create()?;
        let array = self.with_added(key, value.clone());
        Ok(GetOrAddOutcome::Inserted { value, array })
    }

    /// Unconditionally installs `value` for `key`.
    ///
    /// Replacing an existing entry swaps it in place and never resizes;
    /// inserting a fresh entry is resize-eligible. Returns the new array and
    /// `true` if an existing entry was replaced.
    #[must_use]
    pub fn add_or_replace(&self, key: &TypeKey, value: V) -> (Self, bool) {
        let hash = key.hash();
        let index = self.bucket_index(hash);
        if find::find(&self.buckets[index], hash, key).is_some() {
            let entry = HashEntry {
                hash,
                key: key.clone(),
                value,
            };
            let mut buckets = self.buckets.to_vec();
            buckets[index] = insert::replace(&buckets[index], entry)
                .expect("presence checked before replace");
            (
                Self::with_buckets(buckets, self.entry_count, self.policy),
                true,
            )
        } else {
            (self.with_added(key, value), false)
        }
    }

    /// Builds a new array containing this array's entries plus `(key, value)`.
    ///
    /// The key must be absent. Grows first when the policy says the target
    /// bucket is overgrown.
    fn with_added(&self, key: &TypeKey, value: V) -> Self {
        let hash = key.hash();
        let index = self.bucket_index(hash);

        let mut buckets = if self.policy.should_grow(&self.buckets[index]) {
            let next = self.policy.next_count(self.bucket_count());
            tracing::debug!(
                from = self.bucket_count(),
                to = next,
                entries = self.entry_count,
                "growing bucket array"
            );
            self.redistributed(next)
        } else {
            self.buckets.to_vec()
        };

        let index = index_for(hash, buckets.len());
        let entry = HashEntry {
            hash,
            key: key.clone(),
            value,
        };
        buckets[index] =
            insert::add(&buckets[index], entry).expect("absence checked before add");
        Self::with_buckets(buckets, self.entry_count + 1, self.policy)
    }

    /// Rehashes every entry into `new_count` buckets. O(total entries).
    fn redistributed(&self, new_count: usize) -> Vec<Tree<V>> {
        let mut buckets = vec![Tree::Empty; new_count];
        for bucket in &self.buckets {
            for entry in TreeCursor::new(bucket) {
                let index = index_for(entry.hash, new_count);
                buckets[index] = insert::add(&buckets[index], entry.clone())
                    .expect("keys are distinct within a snapshot");
            }
        }
        buckets
    }

    /// Returns the materialized values of this snapshot, computed lazily and
    /// cached for the snapshot's lifetime.
    #[must_use]
    pub fn values(&self) -> Arc<[V]> {
        Arc::clone(self.values_cache.get_or_init(|| {
            self.entries().map(|entry| entry.value.clone()).collect()
        }))
    }

    /// Returns the materialized keys of this snapshot, computed lazily and
    /// cached for the snapshot's lifetime.
    #[must_use]
    pub fn keys(&self) -> Arc<[TypeKey]> {
        Arc::clone(
            self.keys_cache
                .get_or_init(|| self.entries().map(|entry| entry.key.clone()).collect()),
        )
    }

    /// Returns clones of every value registered for `type_id`, across all
    /// registration names.
    #[must_use]
    pub fn values_of_type(&self, type_id: TypeId) -> Vec<V> {
        self.entries()
            .filter(|entry| entry.key.type_id() == type_id)
            .map(|entry| entry.value.clone())
            .collect()
    }

    fn entries(&self) -> impl Iterator<Item = &HashEntry<V>> {
        self.buckets.iter().flat_map(TreeCursor::new)
    }
}

/// Masks `hash` into a bucket index. `bucket_count` is always a power of
/// two, so the masked value is strictly below it and fits in `usize`.
#[allow(clippy::cast_possible_truncation)]
const fn index_for(hash: u64, bucket_count: usize) -> usize {
    (hash & (bucket_count as u64 - 1)) as usize
}

impl<V> fmt::Debug for BucketArray<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketArray")
            .field("buckets", &self.buckets.len())
            .field("entries", &self.entry_count)
            .finish_non_exhaustive()
    }
}
