//! Service descriptors
//!
//! A service is a named target with members that callers reach as
//! `"Target.member"`. Instead of discovering members at call time, each
//! service describes itself up front: which members exist, how many
//! positional params they take, and whether they may be called at all.
//!
//! # Target Trait
//!
//! [`Target`] is the type-erased interface the registry stores. Two
//! implementations are provided:
//!
//! - [`Service`]: a concrete, instantiable service. Every call builds a fresh
//!   instance through the service's factory, handing it the request token,
//!   then runs the member against that instance.
//! - [`Declaration`]: a named target that exists but can never be
//!   instantiated (abstract, interface or internal). Calls through it are
//!   refused by validation before they reach `invoke`.
//!
//! # Members
//!
//! Each member carries a [`MemberInfo`]: its [`MemberKind`], its
//! [`Visibility`] and its [`Arity`]. Only public instance members are
//! invokable. The factory itself shows up as the reserved [`CONSTRUCTOR`]
//! member so that calling it is reported as "not invokable" rather than
//! "not found".
//!
//! # Examples
//!
//! ```rust
//! use rpcgate_server::{Arity, MemberKind, Service, Target, Visibility};
//! use rpcgate_core::ServiceError;
//!
//! struct Account {
//!     token: Option<String>,
//! }
//!
//! let service = Service::builder("Account", |token| {
//!     Ok(Account { token: token.map(str::to_owned) })
//! })
//! .method("whoami", Arity::exact(0), |account: &Account, _params| {
//!     account.token.clone().ok_or_else(|| ServiceError::new(401, "anonymous"))
//! })
//! .declare("audit", MemberKind::Instance, Visibility::Private, Arity::exact(0))
//! .build();
//!
//! assert!(service.member("whoami").unwrap().is_invokable());
//! assert!(!service.member("audit").unwrap().is_invokable());
//! ```

use rpcgate_core::ServiceError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reserved member name standing for a service's constructor
pub const CONSTRUCTOR: &str = "new";

/// Result type for service members
pub type ServiceResult = Result<Value, ServiceError>;

/// Positional parameters handed to a member
///
/// Values are bound by position only. Conversion into concrete types is left
/// to the member, through [`Params::required`] and [`Params::optional`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<Value>);

impl Params {
    /// Wrap decoded params
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of supplied params
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no params were supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw value at a position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Deserialize the param at `index`, failing if it is absent
    pub fn required<T: DeserializeOwned>(&self, index: usize) -> Result<T, ServiceError> {
        let value = self
            .get(index)
            .ok_or_else(|| ServiceError::msg(format!("Missing parameter #{}", index)))?;
        convert(index, value)
    }

    /// Deserialize the param at `index`, or `None` if it was not supplied
    pub fn optional<T: DeserializeOwned>(&self, index: usize) -> Result<Option<T>, ServiceError> {
        self.get(index).map(|value| convert(index, value)).transpose()
    }

    /// Take back the raw values
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

fn convert<T: DeserializeOwned>(index: usize, value: &Value) -> Result<T, ServiceError> {
    T::deserialize(value).map_err(|e| ServiceError::msg(format!("Invalid parameter #{}: {}", index, e)))
}

/// Accepted parameter count range
///
/// Built from a required count plus an optional count, so `min <= max`
/// always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    min: usize,
    max: usize,
}

impl Arity {
    /// Exactly `count` params
    pub fn exact(count: usize) -> Self {
        Self::with_optional(count, 0)
    }

    /// `required` params followed by up to `optional` more
    pub fn with_optional(required: usize, optional: usize) -> Self {
        Self {
            min: required,
            max: required + optional,
        }
    }

    /// Number of required params
    pub fn min(&self) -> usize {
        self.min
    }

    /// Total number of params
    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of optional params
    pub fn optional(&self) -> usize {
        self.max - self.min
    }

    /// Whether `count` params fit
    pub fn accepts(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// What sort of member this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Called on a fresh instance
    Instance,
    /// Belongs to the type, not an instance
    Static,
    /// Declared without a body
    Abstract,
    /// Builds the instance
    Constructor,
}

/// Who may call a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Callable through the gateway
    Public,
    /// Reserved for the service and its extensions
    Protected,
    /// Reserved for the service itself
    Private,
}

/// Description of one member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member kind
    pub kind: MemberKind,
    /// Member visibility
    pub visibility: Visibility,
    /// Accepted params
    pub arity: Arity,
}

impl MemberInfo {
    /// Public instance member, the only invokable sort
    pub fn public(arity: Arity) -> Self {
        Self {
            kind: MemberKind::Instance,
            visibility: Visibility::Public,
            arity,
        }
    }

    /// Whether the gateway may call this member
    pub fn is_invokable(&self) -> bool {
        self.kind == MemberKind::Instance && self.visibility == Visibility::Public
    }
}

/// What sort of target this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Instantiable service
    Concrete,
    /// Partial service meant to be extended
    Abstract,
    /// Contract with no implementation
    Interface,
    /// Runtime-provided target, never dispatched to
    Internal,
}

impl TargetKind {
    /// Whether calls may be dispatched to this target
    pub fn is_dispatchable(&self) -> bool {
        *self == TargetKind::Concrete
    }
}

/// A registered target as the gateway sees it
///
/// Implementations must be `Send + Sync`; one registry is shared by every
/// concurrent dispatch.
pub trait Target: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Target kind
    fn kind(&self) -> TargetKind;

    /// Description of a member, or `None` if there is no such member
    fn member(&self, name: &str) -> Option<MemberInfo>;

    /// Names of all described members
    fn member_names(&self) -> Vec<String>;

    /// Build an instance with `token` and call `member` with `params`
    ///
    /// Callers validate the member first; implementations still refuse
    /// members that cannot be called.
    fn invoke(&self, token: Option<&str>, member: &str, params: Params) -> ServiceResult;
}

/// Builds a service instance from the request token
pub type Factory<S> = Arc<dyn Fn(Option<&str>) -> Result<S, ServiceError> + Send + Sync>;

/// Calls one member on an instance
pub type MemberFn<S> = Arc<dyn Fn(&S, Params) -> ServiceResult + Send + Sync>;

struct Member<S> {
    info: MemberInfo,
    call: Option<MemberFn<S>>,
}

/// A concrete service built around an instance type `S`
pub struct Service<S> {
    name: String,
    factory: Factory<S>,
    members: HashMap<String, Member<S>>,
}

impl<S: 'static> Service<S> {
    /// Start describing a service
    ///
    /// `factory` runs once per call and receives the request token (`None`
    /// when the caller sent `omitToken`). A factory failure is reported like
    /// any other invocation failure.
    pub fn builder<F>(name: impl Into<String>, factory: F) -> ServiceBuilder<S>
    where
        F: Fn(Option<&str>) -> Result<S, ServiceError> + Send + Sync + 'static,
    {
        let mut members = HashMap::new();
        members.insert(
            CONSTRUCTOR.to_string(),
            Member {
                info: MemberInfo {
                    kind: MemberKind::Constructor,
                    visibility: Visibility::Public,
                    arity: Arity::with_optional(0, 1),
                },
                call: None,
            },
        );

        ServiceBuilder {
            service: Service {
                name: name.into(),
                factory: Arc::new(factory),
                members,
            },
        }
    }
}

impl<S> fmt::Debug for Service<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S: Send + Sync + 'static> Target for Service<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Concrete
    }

    fn member(&self, name: &str) -> Option<MemberInfo> {
        self.members.get(name).map(|member| member.info)
    }

    fn member_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    fn invoke(&self, token: Option<&str>, member: &str, params: Params) -> ServiceResult {
        let call = self
            .members
            .get(member)
            .filter(|m| m.info.is_invokable())
            .and_then(|m| m.call.clone())
            .ok_or_else(|| ServiceError::msg(format!("{}.{} is not callable", self.name, member)))?;

        let instance = (self.factory)(token)?;
        call(&instance, params)
    }
}

/// Builder for [`Service`]
pub struct ServiceBuilder<S> {
    service: Service<S>,
}

impl<S: 'static> ServiceBuilder<S> {
    /// Add a public instance member returning any serializable value
    ///
    /// The reserved [`CONSTRUCTOR`] name cannot be replaced; such a
    /// registration is ignored.
    pub fn method<R, F>(mut self, name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        R: Serialize,
        F: Fn(&S, Params) -> Result<R, ServiceError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name == CONSTRUCTOR {
            tracing::warn!(service = %self.service.name, "Ignoring method registered under the constructor name");
            return self;
        }

        let call: MemberFn<S> = Arc::new(move |instance: &S, params: Params| {
            let result = func(instance, params)?;
            serde_json::to_value(result)
                .map_err(|e| ServiceError::msg(format!("Result serialization failed: {}", e)))
        });

        self.service.members.insert(
            name,
            Member {
                info: MemberInfo::public(arity),
                call: Some(call),
            },
        );
        self
    }

    /// Describe a member that exists but is not a public instance method
    ///
    /// Used for static, abstract or non-public members so that calls to them
    /// are refused as "not invokable" instead of "not found". A public
    /// instance member declared here has no body and is recorded as
    /// [`MemberKind::Abstract`]. The reserved [`CONSTRUCTOR`] name cannot be
    /// redeclared; such a declaration is ignored.
    pub fn declare(
        mut self,
        name: impl Into<String>,
        kind: MemberKind,
        visibility: Visibility,
        arity: Arity,
    ) -> Self {
        let name = name.into();
        if name == CONSTRUCTOR {
            tracing::warn!(service = %self.service.name, "Ignoring declaration under the constructor name");
            return self;
        }

        let kind = if kind == MemberKind::Instance && visibility == Visibility::Public {
            tracing::warn!(service = %self.service.name, member = %name, "Public member declared without a body, recording as abstract");
            MemberKind::Abstract
        } else {
            kind
        };

        self.service.members.insert(
            name,
            Member {
                info: MemberInfo {
                    kind,
                    visibility,
                    arity,
                },
                call: None,
            },
        );
        self
    }

    /// Finish the service
    pub fn build(self) -> Service<S> {
        self.service
    }
}

/// A target that exists but can never be instantiated
#[derive(Debug, Clone)]
pub struct Declaration {
    name: String,
    kind: TargetKind,
    members: HashMap<String, MemberInfo>,
}

impl Declaration {
    /// Declare a target of the given kind
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            members: HashMap::new(),
        }
    }

    /// Declare an abstract target
    pub fn abstract_target(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Abstract)
    }

    /// Declare an interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Interface)
    }

    /// Declare an internal target
    pub fn internal(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Internal)
    }

    /// Add a member description
    pub fn with_member(mut self, name: impl Into<String>, info: MemberInfo) -> Self {
        self.members.insert(name.into(), info);
        self
    }
}

impl Target for Declaration {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn member(&self, name: &str) -> Option<MemberInfo> {
        self.members.get(name).copied()
    }

    fn member_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    fn invoke(&self, _token: Option<&str>, _member: &str, _params: Params) -> ServiceResult {
        Err(ServiceError::msg(format!("{} cannot be instantiated", self.name)))
    }
}
