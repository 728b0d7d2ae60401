//! HTTP/1.1 transport
//!
//! A single endpoint: every request, whatever its method or path, has its
//! body handed to [`Gateway::dispatch`] and gets back a 200 response
//! carrying the envelope. Each connection runs in its own task. Dispatch
//! itself is synchronous and runs on the blocking pool so a slow service
//! never stalls the accept loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use rpcgate_server::{Arity, GatewayServer, Service};
//!
//! #[tokio::main]
//! async fn main() -> rpcgate_core::Result<()> {
//!     let server = GatewayServer::builder()
//!         .bind_str("127.0.0.1:8080")?
//!         .service(
//!             Service::builder("Echo", |_| Ok(()))
//!                 .method("say", Arity::exact(1), |_: &(), params| {
//!                     params.required::<serde_json::Value>(0)
//!                 })
//!                 .build(),
//!         )
//!         .build()
//!         .await?;
//!
//!     server.run().await
//! }
//! ```

use crate::builder::ServerBuilder;
use crate::gateway::{Gateway, GatewayResponse};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rpcgate_core::{Error, Result};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tracing::Instrument;

/// Gateway bound to a TCP listener
pub struct GatewayServer {
    pub(crate) listener: TcpListener,
    pub(crate) gateway: Gateway,
    pub(crate) max_body_bytes: usize,
}

impl GatewayServer {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| Error::Io(e.to_string()))
    }

    /// The gateway requests are dispatched to
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Largest accepted request body in bytes
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Accept connections until the listener fails
    ///
    /// # Errors
    ///
    /// `Error::Io` if accepting a connection fails. Errors on an individual
    /// connection are logged and do not stop the loop.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "Gateway server running");
        let conn_counter = AtomicU64::new(0);

        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| Error::Io(e.to_string()))?;
            let conn_id = conn_counter.fetch_add(1, Ordering::SeqCst);
            let gateway = self.gateway.clone();
            let max_body_bytes = self.max_body_bytes;

            let span = tracing::debug_span!("connection", conn_id, peer = %peer);
            tokio::spawn(
                async move {
                    tracing::debug!("Connection accepted");
                    let service = service_fn(move |req| {
                        handle_request(gateway.clone(), max_body_bytes, req)
                    });

                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::error!(error = %e, "Error serving connection");
                    }
                }
                .instrument(span),
            );
        }
    }
}

impl std::fmt::Debug for GatewayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayServer")
            .field("local_addr", &self.listener.local_addr().ok())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

async fn handle_request(
    gateway: Gateway,
    max_body_bytes: usize,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    tracing::trace!(method = %req.method(), path = %req.uri().path(), "Request received");

    let response = match Limited::new(req.into_body(), max_body_bytes).collect().await {
        Ok(collected) => {
            let body = collected.to_bytes();
            match tokio::task::spawn_blocking(move || gateway.dispatch(&body)).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Dispatch task failed");
                    GatewayResponse::from_error(&Error::Internal(e.to_string()))
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, limit = max_body_bytes, "Request body rejected");
            GatewayResponse::from_error(&Error::MalformedBody)
        }
    };

    Ok(into_http(response))
}

fn into_http(response: GatewayResponse) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(response.status()).unwrap_or(StatusCode::OK);
    let content_type = HeaderValue::from_static(response.content_type());

    let mut http = Response::new(Full::new(Bytes::from(response.into_body())));
    *http.status_mut() = status;
    http.headers_mut().insert(CONTENT_TYPE, content_type);
    http
}
