//! Service registry, dispatch pipeline and HTTP transport for rpcgate
//!
//! A gateway exposes a set of named services over one endpoint. A request
//! body such as
//!
//! ```json
//! {"method": "billing.Invoice.total", "params": [42], "token": "abc"}
//! ```
//!
//! is split at the last `.` into the target `billing.Invoice` and the member
//! `total`, resolved against the [`ServiceRegistry`] through a
//! [`NamespaceRule`], validated, and invoked. The reply is always an
//! envelope with exactly one of `error` / `result` set.
//!
//! # Core Features
//!
//! - **Service descriptors**: typed builder for callable services, plus
//!   [`Declaration`]s for targets and members that exist but must be refused
//! - **Fixed validation order**: existence, target kind, member, invocability
//!   and arity, first failure wins
//! - **Single exit**: [`Gateway::dispatch`] never fails; every outcome is an
//!   envelope
//! - **HTTP transport**: hyper-based server, one task per connection
//! - **Observability**: tracing spans and OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rpcgate_server::{Arity, GatewayServer, Service};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = GatewayServer::builder()
//!         .bind_str("127.0.0.1:8080")?
//!         .service(
//!             Service::builder("Calc", |_| Ok(()))
//!                 .method("add", Arity::exact(2), |_: &(), params| {
//!                     Ok(params.required::<i64>(0)? + params.required::<i64>(1)?)
//!                 })
//!                 .build(),
//!         )
//!         .build()
//!         .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Without a transport
//!
//! [`Gateway`] only needs bytes in and gives bytes out, so it can sit behind
//! any transport:
//!
//! ```rust
//! use rpcgate_server::{Gateway, NamespaceRule, ServiceRegistry};
//!
//! let gateway = Gateway::new(ServiceRegistry::new(), NamespaceRule::default());
//! let response = gateway.dispatch(br#"{"method":"Nope.run","params":[],"token":"t"}"#);
//!
//! assert_eq!(response.status(), 200);
//! assert_eq!(
//!     response.body(),
//!     br#"{"error":{"code":0,"message":"Invalid rpc.method [Nope.run] (not found)"},"result":null}"#
//! );
//! ```

pub mod builder;
pub mod config;
pub mod gateway;
pub mod http;
pub mod invoker;
pub mod metrics;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod validator;

pub use builder::ServerBuilder;
pub use config::GatewayConfig;
pub use gateway::{Gateway, GatewayResponse, CONTENT_TYPE};
pub use http::GatewayServer;
pub use invoker::invoke;
pub use metrics::GatewayMetrics;
pub use registry::{RegistryBuilder, ServiceRegistry};
pub use resolver::{NamespaceRule, RegistryResolver, Resolution, ResolvedTarget, Resolver};
pub use service::{
    Arity, Declaration, MemberInfo, MemberKind, Params, Service, ServiceBuilder, ServiceResult,
    Target, TargetKind, Visibility, CONSTRUCTOR,
};
pub use validator::{validate, ValidatedCall};
