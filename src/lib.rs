//! Concurrent registration registry for dependency injection.
//!
//! The registry maps "what I need" requests — a type, optionally qualified
//! by a name — to stored registrations, with lock-free reads while writes
//! proceed on other threads.
//!
//! # Key properties
//!
//! - **Persistent AVL buckets**: every insert returns a new tree sharing
//!   off-path subtrees by reference, so readers holding an old snapshot see
//!   a permanently consistent structure
//! - **Atomic get-or-create**: two threads racing to register the same key
//!   never produce two different registrations
//! - **Single-writer publication**: one mutex per registry serializes
//!   writers; readers never block and never spin
//! - **Hierarchical scopes**: parent-walk singleton caches with idempotent
//!   disposal ownership
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod growth;
pub mod iter;
pub mod key;
pub mod node;

mod buckets;
mod container;
mod error;
mod ops;
mod registration;
mod registry;
mod scope;

#[cfg(test)]
mod tests;

pub use buckets::{BucketArray, GetOrAddOutcome};
pub use container::Container;
pub use error::RegistryError;
pub use growth::GrowthPolicy;
pub use key::TypeKey;
pub use registration::{Constructor, Lifetime, PerThreadSlot, Registration};
pub use registry::Registry;
pub use scope::{AnyInstance, ContainerScope, Disposable};
