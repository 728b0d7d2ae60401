//! Server builder
//!
//! Fluent configuration for a [`GatewayServer`]: bind address, namespace
//! rule, body limit, registered services and observability. Settings can
//! come from a [`GatewayConfig`] and be overridden call by call.
//!
//! ```rust,no_run
//! use rpcgate_server::{Arity, GatewayConfig, ServerBuilder, Service};
//!
//! # async fn example() -> rpcgate_core::Result<()> {
//! let server = ServerBuilder::new()
//!     .config(GatewayConfig::from_env()?)
//!     .namespace("billing::", "::")
//!     .service(
//!         Service::builder("Invoice", |token| Ok(token.unwrap_or_default().to_string()))
//!             .method("owner", Arity::exact(0), |owner: &String, _| Ok(owner.clone()))
//!             .build(),
//!     )
//!     .with_default_observability()
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::http::GatewayServer;
use crate::metrics::GatewayMetrics;
use crate::registry::ServiceRegistry;
use crate::service::Target;
use rpcgate_core::{Error, ObservabilityConfig, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for a [`GatewayServer`]
pub struct ServerBuilder {
    config: GatewayConfig,
    registry: ServiceRegistry,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl ServerBuilder {
    /// Create a builder with default configuration and an empty registry
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            registry: ServiceRegistry::new(),
            observability_config: None,
            service_name: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// Set the bind address from a string (e.g., "127.0.0.1:8080")
    pub fn bind_str(mut self, addr: &str) -> Result<Self> {
        self.config.bind_addr = addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address {:?}: {}", addr, e)))?;
        Ok(self)
    }

    /// Set the namespace root and separator
    pub fn namespace(mut self, root: impl Into<String>, separator: impl Into<String>) -> Self {
        self.config = self.config.with_namespace(root, separator);
        self
    }

    /// Set the body size limit
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    /// Register a service or declaration
    pub fn service<T: Target + 'static>(mut self, target: T) -> Self {
        self.registry.register(target);
        self
    }

    /// Register an already shared target
    pub fn target(mut self, target: Arc<dyn Target>) -> Self {
        self.registry.register_arc(target);
        self
    }

    /// Set the registry (replaces any previously registered services)
    pub fn registry(mut self, registry: ServiceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the gateway without binding a listener
    ///
    /// Observability settings are ignored here; use [`Gateway::with_metrics`]
    /// to record metrics.
    pub fn build_gateway(&self) -> Gateway {
        Gateway::new(self.registry.clone(), self.config.namespace_rule())
    }

    /// Bind the listener and assemble the server
    pub async fn build(self) -> Result<GatewayServer> {
        let addr = self.config.bind_addr;
        let mut gateway = self.build_gateway();

        if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            rpcgate_core::init_observability(config.clone())
                .map_err(|e| Error::Internal(format!("Failed to initialize observability: {}", e)))?;

            gateway = gateway.with_metrics(Arc::new(GatewayMetrics::new(config.service_name)));
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Io(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(
            addr = ?listener.local_addr().ok(),
            services = self.registry.len(),
            namespace_root = %self.config.namespace_root,
            "Gateway listening"
        );

        Ok(GatewayServer {
            listener,
            gateway,
            max_body_bytes: self.config.max_body_bytes,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
