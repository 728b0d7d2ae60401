//! Target resolution
//!
//! Resolution turns the target identifier of a request (`"billing.Invoice"`
//! in `"billing.Invoice.send"`) into a registered [`Target`]. It happens in
//! two steps:
//!
//! 1. A [`NamespaceRule`] rewrites the dotted identifier into a registry
//!    name, e.g. `"app::billing::Invoice"`.
//! 2. A [`Resolver`] looks that name up.
//!
//! Identifiers that cannot name anything (empty, with empty segments, or
//! with characters outside `[A-Za-z0-9_]`) resolve to
//! [`Resolution::NotFound`]; resolution never fails in any other way.
//!
//! Nothing is cached: every dispatch resolves again against the registry.

use crate::registry::ServiceRegistry;
use crate::service::{MemberInfo, Target, TargetKind};
use rpcgate_core::METHOD_DELIMITER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Separator used between namespace segments in registry names by default
pub const DEFAULT_NAMESPACE_SEPARATOR: &str = "::";

/// Rule mapping dotted target identifiers onto registry names
///
/// The registry name is `root` followed by the identifier with every
/// delimiter replaced by `separator`.
///
/// ```rust
/// use rpcgate_server::NamespaceRule;
///
/// let rule = NamespaceRule::new("app::rpc::", "::");
/// assert_eq!(rule.translate("billing.Invoice").as_deref(), Some("app::rpc::billing::Invoice"));
/// assert_eq!(rule.translate("billing..Invoice"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRule {
    root: String,
    separator: String,
}

impl NamespaceRule {
    /// Create a rule from a root prefix and a segment separator
    pub fn new(root: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            separator: separator.into(),
        }
    }

    /// Prefix prepended to every registry name
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Separator placed between segments
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Registry name for `target_id`, or `None` if the identifier is malformed
    pub fn translate(&self, target_id: &str) -> Option<String> {
        if !is_well_formed(target_id) {
            return None;
        }

        let mut name = self.root.clone();
        for (i, segment) in target_id.split(METHOD_DELIMITER).enumerate() {
            if i > 0 {
                name.push_str(&self.separator);
            }
            name.push_str(segment);
        }
        Some(name)
    }
}

impl Default for NamespaceRule {
    fn default() -> Self {
        Self::new("", DEFAULT_NAMESPACE_SEPARATOR)
    }
}

fn is_well_formed(target_id: &str) -> bool {
    !target_id.is_empty()
        && target_id.split(METHOD_DELIMITER).all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// A target found by the resolver
#[derive(Clone)]
pub struct ResolvedTarget {
    registry_name: String,
    target: Arc<dyn Target>,
}

impl ResolvedTarget {
    /// Wrap a looked-up target
    pub fn new(registry_name: impl Into<String>, target: Arc<dyn Target>) -> Self {
        Self {
            registry_name: registry_name.into(),
            target,
        }
    }

    /// Name the target was found under
    pub fn registry_name(&self) -> &str {
        &self.registry_name
    }

    /// Target kind
    pub fn kind(&self) -> TargetKind {
        self.target.kind()
    }

    /// Member description, if the member exists
    pub fn member(&self, name: &str) -> Option<MemberInfo> {
        self.target.member(name)
    }

    /// The target itself
    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }
}

impl fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTarget")
            .field("registry_name", &self.registry_name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Outcome of resolving a target identifier
#[derive(Debug, Clone)]
pub enum Resolution {
    /// No target answers to the identifier
    NotFound,
    /// A target was found; it may still be undispatchable
    Found(ResolvedTarget),
}

impl Resolution {
    /// Whether a target was found
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Looks up targets by identifier
///
/// Implementations must not panic and must report lookup problems as
/// [`Resolution::NotFound`].
pub trait Resolver: Send + Sync {
    /// Resolve a dotted target identifier
    fn resolve(&self, target_id: &str) -> Resolution;
}

/// Resolver backed by a [`ServiceRegistry`]
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    registry: ServiceRegistry,
    namespace: NamespaceRule,
}

impl RegistryResolver {
    /// Create a resolver over `registry` using `namespace` for name translation
    pub fn new(registry: ServiceRegistry, namespace: NamespaceRule) -> Self {
        Self { registry, namespace }
    }

    /// The translation rule in use
    pub fn namespace(&self) -> &NamespaceRule {
        &self.namespace
    }

    /// The registry being searched
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }
}

impl Resolver for RegistryResolver {
    fn resolve(&self, target_id: &str) -> Resolution {
        let Some(registry_name) = self.namespace.translate(target_id) else {
            tracing::debug!(target_id = %target_id, "Malformed target identifier");
            return Resolution::NotFound;
        };

        match self.registry.get(&registry_name) {
            Some(target) => {
                tracing::debug!(target_id = %target_id, registry_name = %registry_name, "Target resolved");
                Resolution::Found(ResolvedTarget::new(registry_name, target))
            }
            None => {
                tracing::debug!(target_id = %target_id, registry_name = %registry_name, "Target not registered");
                Resolution::NotFound
            }
        }
    }
}
