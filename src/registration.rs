//! The narrow contract between the registry and the lifetime layer.
//!
//! A [`Registration`] pairs a key with a lifetime and a type-erased
//! constructor. The fluent configuration surface and reflection-based
//! construction planning live outside this crate; the registry only stores
//! and hands back these values.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;

use crate::key::TypeKey;
use crate::scope::{AnyInstance, ContainerScope};

/// Type-erased constructor invoked to build one service instance.
pub type Constructor = Arc<dyn Fn(&ContainerScope) -> AnyInstance + Send + Sync>;

/// Policy governing how many instances a registration produces and over
/// what scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifetime {
    /// A fresh instance per resolution.
    Transient,
    /// One instance for the whole scope chain.
    Singleton,
    /// One instance per scope.
    Scoped,
    /// One instance per thread.
    PerThread,
    /// One instance per top-level resolve call.
    PerResolve,
}

/// The stored association between a [`TypeKey`] and its construction
/// strategy.
#[derive(Clone)]
pub struct Registration {
    key: TypeKey,
    lifetime: Lifetime,
    ctor: Constructor,
}

impl Registration {
    /// Creates a registration from its parts.
    #[must_use]
    pub const fn new(key: TypeKey, lifetime: Lifetime, ctor: Constructor) -> Self {
        Self {
            key,
            lifetime,
            ctor,
        }
    }

    /// Returns the key this registration was stored under.
    #[must_use]
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Returns the registration's lifetime policy.
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Invokes the constructor against `scope`.
    #[must_use]
    pub fn construct(&self, scope: &ContainerScope) -> AnyInstance {
        (self.ctor)(scope)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// Per-thread instance cache for [`Lifetime::PerThread`] registrations.
///
/// An explicit thread-identifier-keyed map owned by the lifetime value —
/// not intrinsic thread-local storage — so the policy stays portable and
/// testable without spinning a real OS thread per case.
pub struct PerThreadSlot {
    instances: Mutex<HashMap<ThreadId, AnyInstance>>,
}

impl PerThreadSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the calling thread's instance, creating it on first use.
    pub fn get_or_create<F>(&self, create: F) -> AnyInstance
    where
        F: FnOnce() -> AnyInstance,
    {
        let thread = std::thread::current().id();
        let mut instances = self.instances.lock();
        if let Some(existing) = instances.get(&thread) {
            return Arc::clone(existing);
        }
        let instance = create();
        instances.insert(thread, Arc::clone(&instance));
        instance
    }

    /// Returns the number of threads holding an instance.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    /// Returns `true` if no thread holds an instance yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}

impl Default for PerThreadSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PerThreadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerThreadSlot")
            .field("threads", &self.len())
            .finish_non_exhaustive()
    }
}
