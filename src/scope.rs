//! Hierarchical container scopes.
//!
//! A scope is a node in a parent-linked tree. Each scope owns a singleton
//! cache keyed by [`TypeKey`] and tracks the disposable instances it
//! personally constructed. Singleton lookup walks child → parent, never the
//! other direction; an ancestor's instance always wins over creating a new
//! one, so a key maps to one instance across the whole chain.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::key::TypeKey;

/// A type-erased service instance shared across scopes.
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// Contract for instances that hold resources needing explicit release.
pub trait Disposable: Send + Sync {
    /// Releases the instance's resources. Called exactly once per tracked
    /// instance when the owning scope is disposed.
    fn dispose(&self);
}

/// One node of the scope hierarchy.
pub struct ContainerScope {
    parent: Option<Arc<ContainerScope>>,
    singletons: RwLock<HashMap<TypeKey, AnyInstance>>,
    disposables: Mutex<Vec<Arc<dyn Disposable>>>,
}

impl ContainerScope {
    /// Creates a root scope with no parent.
    #[must_use]
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            singletons: RwLock::new(HashMap::new()),
            disposables: Mutex::new(Vec::new()),
        })
    }

    /// Creates a child scope chained to `self`.
    #[must_use]
    pub fn create_child(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(self)),
            singletons: RwLock::new(HashMap::new()),
            disposables: Mutex::new(Vec::new()),
        })
    }

    /// Returns this scope's parent, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Returns the singleton for `key` from this scope or the nearest
    /// ancestor holding it. Never writes.
    #[must_use]
    pub fn try_get_singleton(&self, key: &TypeKey) -> Option<AnyInstance> {
        if let Some(instance) = self.singletons.read().get(key) {
            return Some(Arc::clone(instance));
        }
        self.parent.as_ref()?.try_get_singleton(key)
    }

    /// Returns the singleton for `key`, creating it locally if neither this
    /// scope nor any ancestor holds it.
    ///
    /// An ancestor's existing instance is returned without invoking
    /// `create` — children never shadow a parent's singleton. Creation runs
    /// under this scope's own lock with a chain re-check, so concurrent
    /// callers on one scope invoke `create` at most once.
    pub fn get_or_add_singleton<F>(&self, key: &TypeKey, create: F) -> AnyInstance
    where
        F: FnOnce() -> AnyInstance,
    {
        if let Some(existing) = self.try_get_singleton(key) {
            return existing;
        }

        let mut singletons = self.singletons.write();
        if let Some(existing) = singletons.get(key) {
            return Arc::clone(existing);
        }
        if let Some(parent) = &self.parent {
            if let Some(existing) = parent.try_get_singleton(key) {
                return existing;
            }
        }
        let instance = create();
        singletons.insert(key.clone(), Arc::clone(&instance));
        instance
    }

    /// Registers `disposable` for release when this scope is disposed.
    ///
    /// Ownership is local: the scope that constructed an instance is the one
    /// that tracks and disposes it.
    pub fn track_disposable(&self, disposable: Arc<dyn Disposable>) {
        self.disposables.lock().push(disposable);
    }

    /// Disposes every instance this scope tracked, exactly once each.
    ///
    /// Idempotent and thread-safe: the tracked list is drained atomically,
    /// so repeated or concurrent calls find nothing left to dispose.
    pub fn dispose(&self) {
        let drained = std::mem::take(&mut *self.disposables.lock());
        for disposable in drained {
            disposable.dispose();
        }
    }
}

impl Drop for ContainerScope {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ContainerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerScope")
            .field("singletons", &self.singletons.read().len())
            .field("has_parent", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}
