//! Error types for the registration registry.
//!
//! Only construction-precondition violations live here. A lookup miss is
//! never an error — it is an `Option::None` driving routine fallback logic.
//! Factory failures propagate to the caller untranslated.

use thiserror::Error;

use crate::key::TypeKey;

/// Precondition violations raised by tree-level mutation.
///
/// Both variants signal caller bugs: under the registry's single-writer
/// discipline the offending states are checked before mutating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `add` was called for a key that already has an entry.
    #[error("an entry for `{key}` already exists")]
    DuplicateEntry {
        /// The key that was already present.
        key: TypeKey,
    },

    /// `replace` was called for a key with no existing entry.
    #[error("no entry for `{key}` to replace")]
    EntryNotFound {
        /// The key that was absent.
        key: TypeKey,
    },
}
