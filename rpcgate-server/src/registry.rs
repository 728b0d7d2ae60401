//! Registry of service targets
//!
//! The registry maps registry names (the form produced by a
//! [`NamespaceRule`](crate::NamespaceRule)) to [`Target`] descriptors. It is
//! filled once at startup and then shared read-only by every dispatch.
//!
//! # Thread Safety
//!
//! Registries are cheaply cloneable (`Arc`-based); clones made after startup
//! share the same map.
//!
//! # Examples
//!
//! ```rust
//! use rpcgate_server::{Arity, Service, ServiceRegistry};
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register(
//!     Service::builder("Echo", |_token| Ok(()))
//!         .method("say", Arity::exact(1), |_: &(), params| params.required::<serde_json::Value>(0))
//!         .build(),
//! );
//!
//! assert!(registry.contains("Echo"));
//! ```

use crate::service::Target;
use std::collections::HashMap;
use std::sync::Arc;

/// Map of registry names to targets
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    targets: Arc<HashMap<String, Arc<dyn Target>>>,
}

impl ServiceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target under its own name
    ///
    /// A target registered under an existing name replaces the earlier one.
    pub fn register<T: Target + 'static>(&mut self, target: T) {
        self.register_arc(Arc::new(target));
    }

    /// Register an already shared target
    pub fn register_arc(&mut self, target: Arc<dyn Target>) {
        let name = target.name().to_string();
        let targets = Arc::make_mut(&mut self.targets);
        if targets.insert(name.clone(), target).is_some() {
            tracing::warn!(target_name = %name, "Replacing previously registered target");
        }
    }

    /// Look up a target by registry name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Target>> {
        self.targets.get(name).cloned()
    }

    /// Whether a target is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// All registry names
    pub fn names(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry").field("targets", &self.names()).finish()
    }
}

/// Builder for constructing a registry
#[derive(Default)]
pub struct RegistryBuilder {
    registry: ServiceRegistry,
}

impl RegistryBuilder {
    /// Create a new registry builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target
    pub fn target<T: Target + 'static>(mut self, target: T) -> Self {
        self.registry.register(target);
        self
    }

    /// Build the registry
    pub fn build(self) -> ServiceRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Arity, Declaration, Service, TargetKind};

    fn counter(name: &str) -> Service<()> {
        Service::builder(name, |_| Ok(()))
            .method("count", Arity::exact(0), |_: &(), _| Ok(1))
            .build()
    }

    #[test]
    fn test_registry_basic() {
        let mut registry = ServiceRegistry::new();
        assert!(registry.is_empty());

        registry.register(counter("Counter"));

        assert!(registry.contains("Counter"));
        assert!(!registry.contains("counter"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Counter").unwrap().name(), "Counter");
    }

    #[test]
    fn test_registry_replaces_same_name() {
        let mut registry = ServiceRegistry::new();
        registry.register(counter("Shape"));
        registry.register(Declaration::abstract_target("Shape"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Shape").unwrap().kind(), TargetKind::Abstract);
    }

    #[test]
    fn test_registry_clones_share_targets() {
        let registry = RegistryBuilder::new()
            .target(counter("A"))
            .target(counter("billing::B"))
            .build();
        let clone = registry.clone();

        let mut names = clone.names();
        names.sort();
        assert_eq!(names, vec!["A", "billing::B"]);
    }
}
