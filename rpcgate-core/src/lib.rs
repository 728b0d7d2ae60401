//! Core request model, envelope and codec for rpcgate
//!
//! rpcgate is a single-endpoint JSON-RPC gateway: a request names a
//! `"class.method"` target and positional params, and every response is an
//! envelope with exactly one of `error` / `result` set. This crate holds the
//! pieces that do not depend on how services are registered or served:
//!
//! - **Types**: [`RpcRequest`], [`Envelope`] and the method-name split rule
//! - **Codec**: decoding request bodies and encoding envelopes
//! - **Error handling**: the full failure taxonomy and its wire form
//! - **Observability**: tracing subscriber and OpenTelemetry setup
//!
//! The `rpcgate-server` crate builds the registry, dispatch pipeline and HTTP
//! transport on top of this foundation.
//!
//! # Example
//!
//! ```rust
//! use rpcgate_core::{codec, Envelope, Error};
//!
//! let request = codec::decode_request(br#"{"method":"Billing.charge","params":[100,"USD"],"token":"abc"}"#).unwrap();
//! assert_eq!(request.target_id(), "Billing");
//! assert_eq!(request.member_name(), "charge");
//!
//! let failure = Envelope::failure(Error::MissingToken.to_error_body());
//! let bytes = codec::encode_envelope(&failure).unwrap();
//! assert_eq!(bytes, br#"{"error":{"code":0,"message":"No token"},"result":null}"#.to_vec());
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use error::{Error, ErrorBody, Result, ServiceError};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{split_target, Envelope, RpcRequest, METHOD_DELIMITER};
