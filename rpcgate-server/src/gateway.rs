//! The dispatch pipeline
//!
//! [`Gateway::dispatch`] takes a raw request body and always returns a
//! [`GatewayResponse`]; no failure escapes it. Each request walks one
//! straight line with a single exit to the failure envelope at every step:
//!
//! ```text
//! decode ──► resolve + validate ──► invoke ──► encode(success)
//!   │              │                   │
//!   └──────────────┴───────────────────┴─────► encode(failure)
//! ```
//!
//! A body that fails to decode never reaches the resolver. Nothing is
//! retried.
//!
//! # Concurrency
//!
//! `Gateway` holds only the resolver (read-only after construction) and the
//! optional metrics handle, so a single instance can be cloned into any
//! number of transport tasks. Each dispatch allocates its own request,
//! resolution and envelope.

use crate::invoker::invoke;
use crate::metrics::GatewayMetrics;
use crate::registry::ServiceRegistry;
use crate::resolver::{NamespaceRule, RegistryResolver, Resolver};
use crate::validator::validate;
use rpcgate_core::{codec, Envelope, Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Content type of every gateway response
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Transport status of every gateway response, success or failure
pub const STATUS_OK: u16 = 200;

/// Body used if an envelope cannot be serialized
const ENCODING_FALLBACK: &[u8] = br#"{"error":{"code":0,"message":"Internal error"},"result":null}"#;

/// Bytes and headers for the transport to send
///
/// The only constructor is [`GatewayResponse::from_envelope`], which sets the
/// content type at the moment the body is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl GatewayResponse {
    /// Serialize an envelope into a response
    pub fn from_envelope(envelope: &Envelope) -> Self {
        let body = codec::encode_envelope(envelope).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode envelope");
            ENCODING_FALLBACK.to_vec()
        });

        Self {
            status: STATUS_OK,
            content_type: CONTENT_TYPE,
            body,
        }
    }

    /// Failure response for an error raised outside [`Gateway::dispatch`]
    pub fn from_error(error: &Error) -> Self {
        Self::from_envelope(&Envelope::failure(error.to_error_body()))
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Value of the `Content-Type` header
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Serialized envelope
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Take the serialized envelope
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Single-endpoint JSON-RPC gateway
#[derive(Clone)]
pub struct Gateway {
    resolver: Arc<dyn Resolver>,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl Gateway {
    /// Create a gateway over a registry, translating names with `namespace`
    pub fn new(registry: ServiceRegistry, namespace: NamespaceRule) -> Self {
        Self::with_resolver(Arc::new(RegistryResolver::new(registry, namespace)))
    }

    /// Create a gateway over a custom resolver
    pub fn with_resolver(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            metrics: None,
        }
    }

    /// Record dispatch metrics
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Handle one raw request body
    ///
    /// Never fails: every outcome is encoded as an envelope.
    pub fn dispatch(&self, body: &[u8]) -> GatewayResponse {
        GatewayResponse::from_envelope(&self.dispatch_envelope(body))
    }

    /// Handle one raw request body, returning the envelope unencoded
    #[tracing::instrument(skip(self, body), name = "gateway.dispatch", fields(body_len = body.len()))]
    pub fn dispatch_envelope(&self, body: &[u8]) -> Envelope {
        let started = Instant::now();

        match self.process(body) {
            Ok(result) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_success(started.elapsed().as_secs_f64());
                }
                Envelope::success(result)
            }
            Err(error) => {
                if let Error::InvocationFailure(failure) = &error {
                    tracing::error!(code = failure.code, error = %failure, "Service call failed");
                } else {
                    tracing::warn!(kind = error.kind(), error = %error, "Request rejected");
                }
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure(error.kind(), started.elapsed().as_secs_f64());
                }
                Envelope::failure(error.to_error_body())
            }
        }
    }

    fn process(&self, body: &[u8]) -> Result<Value> {
        let request = codec::decode_request(body)?;

        let resolution = self.resolver.resolve(request.target_id());
        let call = validate(request.method(), resolution, request.params().len())?;

        tracing::debug!(method = %request.method(), "Invoking");

        let (_method, token, params) = request.into_parts();
        invoke(&call, token.as_deref(), params)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
