//! The registration dictionary — lock-free reads, single-writer publication.
//!
//! One mutable slot holds the current [`BucketArray`] snapshot. Readers load
//! it with acquire semantics and never block or spin. Writers serialize on a
//! dedicated mutex, re-check under the lock, build a complete new snapshot,
//! and publish it with a release store before unlocking. Concurrent readers
//! keep seeing the old, fully consistent snapshot until publication.

use std::any::TypeId;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::buckets::{BucketArray, GetOrAddOutcome};
use crate::growth::GrowthPolicy;
use crate::key::TypeKey;

/// Concurrent registry mapping [`TypeKey`]s to registrations.
///
/// At most one successful create-and-insert wins per distinct key; every
/// loser of the race observes the winner's value.
pub struct Registry<V> {
    current: ArcSwap<BucketArray<V>>,
    write_lock: Mutex<()>,
}

impl<V> Registry<V> {
    /// Creates an empty registry with the default growth policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(GrowthPolicy::default())
    }

    /// Creates an empty registry with an explicit growth policy.
    #[must_use]
    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self {
            current: ArcSwap::from_pointee(BucketArray::new(policy)),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the number of registered entries in the current snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    /// Returns `true` if the current snapshot holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Returns the current snapshot.
    ///
    /// The snapshot is immutable: it remains valid and internally consistent
    /// for as long as the caller holds it, regardless of later writes.
    #[must_use]
    pub fn snapshot(&self) -> Arc<BucketArray<V>> {
        self.current.load_full()
    }

    /// Creates an independent registry sharing this one's current snapshot.
    ///
    /// Snapshots are immutable, so the copy is O(1); subsequent writes to
    /// either registry never affect the other.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            current: ArcSwap::new(self.current.load_full()),
            write_lock: Mutex::new(()),
        }
    }
}

impl<V: Clone> Registry<V> {
    /// Returns the value registered for `key`, if any. Lock-free.
    #[must_use]
    pub fn try_get(&self, key: &TypeKey) -> Option<V> {
        self.current.load().find(key).cloned()
    }

    /// Returns the value for `key`, invoking `create` to build it if absent.
    ///
    /// Exactly one `create` result is ever published per key for the
    /// registry's lifetime, even under concurrent callers. `create` runs
    /// while the writer lock is held; it must be pure relative to the key,
    /// since its result is cached forever.
    pub fn get_or_add<F>(&self, key: &TypeKey, create: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_add(key, || Ok::<V, Infallible>(create())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_or_add`](Self::get_or_add).
    ///
    /// An optimistic lock-free check runs first; on miss, the writer lock is
    /// taken, the current snapshot is re-read and re-checked, and only a
    /// genuinely new entry builds and publishes a new snapshot.
    ///
    /// # Errors
    ///
    /// Propagates `create`'s error verbatim. Nothing is published and the
    /// registry is left exactly as it was before the call.
    pub fn try_get_or_add<F, E>(&self, key: &TypeKey, create: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(existing) = self.try_get(key) {
            return Ok(existing);
        }

        let _guard = self.write_lock.lock();
        let snapshot = self.current.load_full();
        match snapshot.get_or_add(key, create)? {
            GetOrAddOutcome::Found(existing) => Ok(existing),
            GetOrAddOutcome::Inserted { value, array } => {
                tracing::trace!(%key, entries = array.len(), "published registry snapshot");
                self.current.store(Arc::new(array));
                Ok(value)
            }
        }
    }

    /// Unconditionally installs `value` for `key`, overwriting any previous
    /// registration for that exact key.
    ///
    /// Returns `true` if an existing entry was replaced.
    pub fn add_or_replace(&self, key: &TypeKey, value: V) -> bool {
        let _guard = self.write_lock.lock();
        let snapshot = self.current.load_full();
        let (array, replaced) = snapshot.add_or_replace(key, value);
        tracing::trace!(%key, replaced, entries = array.len(), "published registry snapshot");
        self.current.store(Arc::new(array));
        replaced
    }

    /// Returns a point-in-time materialized view of all registered values,
    /// computed lazily and cached per snapshot.
    #[must_use]
    pub fn values(&self) -> Arc<[V]> {
        self.current.load().values()
    }

    /// Returns a point-in-time materialized view of all registered keys,
    /// computed lazily and cached per snapshot.
    #[must_use]
    pub fn keys(&self) -> Arc<[TypeKey]> {
        self.current.load().keys()
    }

    /// Returns every value registered for `type_id` across all registration
    /// names, as of the current snapshot.
    ///
    /// The iteration is finite and restartable: call again for a fresh pass
    /// over the then-current snapshot.
    #[must_use]
    pub fn entries_of(&self, type_id: TypeId) -> std::vec::IntoIter<V> {
        self.current.load().values_of_type(type_id).into_iter()
    }
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for Registry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("Registry")
            .field("entries", &snapshot.len())
            .field("buckets", &snapshot.bucket_count())
            .finish_non_exhaustive()
    }
}
