//! rpcgate - single-endpoint JSON-RPC gateway
//!
//! Convenience crate re-exporting the rpcgate sub-crates, for users who want
//! one dependency.
//!
//! # Architecture
//!
//! - **rpcgate-core**: request model, envelope, codec, errors, observability
//! - **rpcgate-server**: service registry, resolver, validator, dispatch
//!   pipeline and HTTP transport
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rpcgate::server::{Arity, Service};
//! use rpcgate::GatewayServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = GatewayServer::builder()
//!         .bind_str("127.0.0.1:8080")?
//!         .namespace("", "::")
//!         .service(
//!             Service::builder("Greeter", |token| Ok(token.map(str::to_owned)))
//!                 .method("hello", Arity::with_optional(0, 1), |caller: &Option<String>, params| {
//!                     let name: Option<String> = params.optional(0)?;
//!                     let name = name.or_else(|| caller.clone()).unwrap_or_else(|| "world".into());
//!                     Ok(format!("Hello, {}!", name))
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
//! A call then looks like:
//!
//! ```text
//! POST / HTTP/1.1
//! Content-Type: application/json
//!
//! {"method": "Greeter.hello", "params": ["Ada"], "token": "abc"}
//!
//! HTTP/1.1 200 OK
//! Content-Type: application/json; charset=utf-8
//!
//! {"error": null, "result": "Hello, Ada!"}
//! ```

pub use rpcgate_core as core;
pub use rpcgate_server as server;

pub use rpcgate_core::{Envelope, Error, ErrorBody, RpcRequest};
pub use rpcgate_server::{Gateway, GatewayServer};
