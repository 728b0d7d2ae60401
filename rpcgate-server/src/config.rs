//! Gateway configuration
//!
//! Settings fixed at startup: where the HTTP transport listens, how target
//! identifiers map onto registry names, and how large a request body may
//! be. Values can be set in code, deserialized from any serde format, or
//! read from the environment:
//!
//! | Variable                      | Field                 | Default          |
//! |-------------------------------|-----------------------|------------------|
//! | `RPCGATE_BIND`                | `bind_addr`           | `127.0.0.1:8080` |
//! | `RPCGATE_NAMESPACE_ROOT`      | `namespace_root`      | `""`             |
//! | `RPCGATE_NAMESPACE_SEPARATOR` | `namespace_separator` | `"::"`           |
//! | `RPCGATE_MAX_BODY_BYTES`      | `max_body_bytes`      | `1048576`        |

use crate::resolver::{NamespaceRule, DEFAULT_NAMESPACE_SEPARATOR};
use rpcgate_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Environment variable for the bind address
pub const ENV_BIND: &str = "RPCGATE_BIND";
/// Environment variable for the namespace root
pub const ENV_NAMESPACE_ROOT: &str = "RPCGATE_NAMESPACE_ROOT";
/// Environment variable for the namespace separator
pub const ENV_NAMESPACE_SEPARATOR: &str = "RPCGATE_NAMESPACE_SEPARATOR";
/// Environment variable for the body size limit
pub const ENV_MAX_BODY_BYTES: &str = "RPCGATE_MAX_BODY_BYTES";

/// Default body size limit (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Startup configuration for a gateway server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address the HTTP transport binds to
    pub bind_addr: SocketAddr,
    /// Prefix prepended to every registry name
    pub namespace_root: String,
    /// Separator replacing `.` between namespace segments
    pub namespace_separator: String,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            namespace_root: String::new(),
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by any `RPCGATE_*` variables that are set
    ///
    /// # Errors
    ///
    /// `Error::Config` if a variable is set but does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = bind
                .parse()
                .map_err(|e| Error::Config(format!("{}={:?}: {}", ENV_BIND, bind, e)))?;
        }
        if let Some(root) = lookup(ENV_NAMESPACE_ROOT) {
            config.namespace_root = root;
        }
        if let Some(separator) = lookup(ENV_NAMESPACE_SEPARATOR) {
            config.namespace_separator = separator;
        }
        if let Some(limit) = lookup(ENV_MAX_BODY_BYTES) {
            config.max_body_bytes = limit
                .parse()
                .map_err(|e| Error::Config(format!("{}={:?}: {}", ENV_MAX_BODY_BYTES, limit, e)))?;
        }

        Ok(config)
    }

    /// Set the bind address
    pub fn with_bind_addr(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the namespace root and separator
    pub fn with_namespace(mut self, root: impl Into<String>, separator: impl Into<String>) -> Self {
        self.namespace_root = root.into();
        self.namespace_separator = separator.into();
        self
    }

    /// Set the body size limit
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Namespace rule described by this configuration
    pub fn namespace_rule(&self) -> NamespaceRule {
        NamespaceRule::new(self.namespace_root.clone(), self.namespace_separator.clone())
    }
}
