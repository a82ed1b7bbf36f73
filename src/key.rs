//! `TypeKey` — the (type identity, optional registration name) composite
//! that identifies a registration.
//!
//! The 64-bit hash is precomputed at construction: from the type alone when
//! unnamed (keeping unnamed lookups fast), from type and name when named.

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifies a registration by service type and optional name.
///
/// Equality is structural: both the type and the name must match. The key
/// is a value type — cheap to clone, never mutated after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Arc<str>>,
    hash: u64,
}

impl TypeKey {
    /// Creates the unnamed key for type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        let type_id = TypeId::of::<T>();
        Self {
            type_id,
            type_name: std::any::type_name::<T>(),
            name: None,
            hash: hash_one(&type_id),
        }
    }

    /// Creates a named key for type `T`.
    ///
    /// An empty name normalizes to the unnamed key, so
    /// `TypeKey::named::<T>("")` equals `TypeKey::of::<T>()`.
    #[must_use]
    pub fn named<T: 'static>(name: &str) -> Self {
        if name.is_empty() {
            return Self::of::<T>();
        }
        let type_id = TypeId::of::<T>();
        let mut hasher = DefaultHasher::new();
        type_id.hash(&mut hasher);
        name.hash(&mut hasher);
        Self {
            type_id,
            type_name: std::any::type_name::<T>(),
            name: Some(Arc::from(name)),
            hash: hasher.finish(),
        }
    }

    /// Returns the precomputed 64-bit hash.
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    /// Returns the identity of the underlying service type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the diagnostic name of the underlying service type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the registration name, if this key is named.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeKey")
            .field("type", &self.type_name)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{name}", self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}

/// Computes the 64-bit hash of a value using the standard hasher.
#[must_use]
pub fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
