//! Container — a registry paired with a scope.
//!
//! Parent/child composition: a child either shares the parent's registry
//! instance or receives an independent snapshot copy, and always chains its
//! scope to the parent's for singleton lookup.

use std::fmt;
use std::sync::Arc;

use crate::growth::GrowthPolicy;
use crate::registration::Registration;
use crate::registry::Registry;
use crate::scope::ContainerScope;

/// A dependency-injection container: registration registry plus scope.
#[derive(Clone)]
pub struct Container {
    registry: Arc<Registry<Registration>>,
    scope: Arc<ContainerScope>,
}

impl Container {
    /// Creates a root container with the default growth policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(GrowthPolicy::default())
    }

    /// Creates a root container with an explicit growth policy.
    #[must_use]
    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self {
            registry: Arc::new(Registry::with_policy(policy)),
            scope: ContainerScope::root(),
        }
    }

    /// Returns the container's registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry<Registration>> {
        &self.registry
    }

    /// Returns the container's scope.
    #[must_use]
    pub const fn scope(&self) -> &Arc<ContainerScope> {
        &self.scope
    }

    /// Creates a child container.
    ///
    /// With `copy_registry` the child receives an independent snapshot copy:
    /// subsequent registrations on parent or child never affect the other.
    /// Without it, parent and child share the same registry instance. The
    /// child's scope always chains to this container's scope.
    #[must_use]
    pub fn create_child(&self, copy_registry: bool) -> Self {
        let registry = if copy_registry {
            Arc::new(self.registry.fork())
        } else {
            Arc::clone(&self.registry)
        };
        Self {
            registry,
            scope: self.scope.create_child(),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registry", &self.registry)
            .field("scope", &self.scope)
            .finish()
    }
}
