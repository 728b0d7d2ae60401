//! Error types for rpcgate
//!
//! This module defines the complete failure taxonomy of the gateway and the
//! wire shape those failures take inside a response envelope:
//!
//! - **Error**: every way a dispatch can fail, from an undecodable body to a
//!   service raising a business failure (uses thiserror)
//! - **ErrorBody**: the `{"code", "message"}` object placed in the envelope's
//!   `error` field
//! - **ServiceError**: the failure type returned by service code
//!
//! # Error Codes
//!
//! Failures produced by the gateway itself carry code `0`. Only
//! `Error::InvocationFailure` carries a different code: the one the service
//! chose when it raised the failure, forwarded verbatim.
//!
//! # Examples
//!
//! ```rust
//! use rpcgate_core::{Error, ServiceError};
//!
//! let error = Error::UnknownTarget("Nope.run".into());
//! assert_eq!(error.to_string(), "Invalid rpc.method [Nope.run] (not found)");
//! assert_eq!(error.code(), 0);
//!
//! let failure = Error::from(ServiceError::new(402, "Insufficient funds"));
//! assert_eq!(failure.code(), 402);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for rpcgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a dispatch can end in
///
/// The decoding variants (`MalformedBody`, `MissingMethod`, `MissingParams`,
/// `MissingToken`) are raised before any resolution happens. The resolution
/// variants (`UnknownTarget`, `ForbiddenTarget`, `ForbiddenMember`,
/// `ArityMismatch`) carry the full dotted method name the caller sent.
/// `InvocationFailure` wraps whatever the service returned.
///
/// The `Display` output is the message the caller sees in the envelope.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Body is not valid JSON or does not decode to an object
    #[error("Invalid request")]
    MalformedBody,

    /// `method` is absent, not a string, or empty
    #[error("Invalid method")]
    MissingMethod,

    /// `params` is absent or not an array
    #[error("Invalid params")]
    MissingParams,

    /// A token is required but absent or empty
    #[error("No token")]
    MissingToken,

    /// Target or member does not resolve
    ///
    /// Missing targets and missing members share this variant.
    #[error("Invalid rpc.method [{0}] (not found)")]
    UnknownTarget(String),

    /// Target exists but is abstract, an interface, or internal
    #[error("Invalid rpc.class [{0}]")]
    ForbiddenTarget(String),

    /// Member exists but is abstract, a constructor, static, or not public
    #[error("Invalid rpc.method [{0}] (not invokable)")]
    ForbiddenMember(String),

    /// Number of supplied params is outside the member's arity
    #[error(
        "Invalid rpc.method [{method}] Wrong number of parameters: {given} given \
         (required: {min} optional: {optional}) expectedMin: {min} expectedMax: {max}",
        optional = .max - .min
    )]
    ArityMismatch {
        /// Full dotted method name
        method: String,
        /// Number of params supplied
        given: usize,
        /// Required parameter count
        min: usize,
        /// Total parameter count
        max: usize,
    },

    /// The invoked service returned a failure
    #[error("{0}")]
    InvocationFailure(ServiceError),

    /// The response envelope could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Socket or file error in the transport
    #[error("IO error: {0}")]
    Io(String),

    /// Unexpected failure outside the service call
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Numeric code reported in the envelope
    ///
    /// Zero for everything the gateway raises itself; the service's own code
    /// for invocation failures.
    pub fn code(&self) -> i64 {
        match self {
            Error::InvocationFailure(failure) => failure.code,
            _ => 0,
        }
    }

    /// Short stable label for logs and metric attributes
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedBody => "malformed_body",
            Error::MissingMethod => "missing_method",
            Error::MissingParams => "missing_params",
            Error::MissingToken => "missing_token",
            Error::UnknownTarget(_) => "unknown_target",
            Error::ForbiddenTarget(_) => "forbidden_target",
            Error::ForbiddenMember(_) => "forbidden_member",
            Error::ArityMismatch { .. } => "arity_mismatch",
            Error::InvocationFailure(_) => "invocation_failure",
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Internal(_) => "internal",
        }
    }

    /// Whether the failure happened while decoding the request body
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedBody | Error::MissingMethod | Error::MissingParams | Error::MissingToken
        )
    }

    /// Convert into the envelope's `error` object
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody::new(self.code(), self.to_string())
    }
}

impl From<ServiceError> for Error {
    fn from(failure: ServiceError) -> Self {
        Error::InvocationFailure(failure)
    }
}

/// The `error` object of a failure envelope
///
/// Serializes as exactly `{"code": <int>, "message": <string>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric error code, `0` unless a service chose one
    pub code: i64,
    /// Human-readable description
    pub message: String,
}

impl ErrorBody {
    /// Create an error body from a code and message
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorBody {
    /// Formats as "[code] message" for logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Failure raised by service code during an invocation
///
/// Services pick their own codes. Use [`ServiceError::msg`] when the failure
/// has no meaningful code; it reports `0`.
///
/// ```rust
/// use rpcgate_core::ServiceError;
///
/// let error = ServiceError::new(1001, "Account locked");
/// assert_eq!(error.to_string(), "Account locked");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Service-defined code
    pub code: i64,
    /// Service-defined message
    pub message: String,
}

impl ServiceError {
    /// Create a failure with an explicit code
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a failure with code `0`
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ServiceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(Error::MalformedBody.to_string(), "Invalid request");
        assert_eq!(Error::MissingMethod.to_string(), "Invalid method");
        assert_eq!(Error::MissingParams.to_string(), "Invalid params");
        assert_eq!(Error::MissingToken.to_string(), "No token");
    }

    #[test]
    fn test_resolution_error_messages() {
        let error = Error::UnknownTarget("Billing.charge".to_string());
        assert_eq!(error.to_string(), "Invalid rpc.method [Billing.charge] (not found)");

        let error = Error::ForbiddenTarget("Base.run".to_string());
        assert_eq!(error.to_string(), "Invalid rpc.class [Base.run]");

        let error = Error::ForbiddenMember("Billing.new".to_string());
        assert_eq!(error.to_string(), "Invalid rpc.method [Billing.new] (not invokable)");
    }

    #[test]
    fn test_arity_mismatch_message_contains_all_counts() {
        let error = Error::ArityMismatch {
            method: "Billing.charge".to_string(),
            given: 4,
            min: 2,
            max: 3,
        };

        assert_eq!(
            error.to_string(),
            "Invalid rpc.method [Billing.charge] Wrong number of parameters: 4 given \
             (required: 2 optional: 1) expectedMin: 2 expectedMax: 3"
        );
    }

    #[test]
    fn test_gateway_errors_use_code_zero() {
        let errors = vec![
            Error::MalformedBody,
            Error::MissingMethod,
            Error::MissingParams,
            Error::MissingToken,
            Error::UnknownTarget("a.b".into()),
            Error::ForbiddenTarget("a.b".into()),
            Error::ForbiddenMember("a.b".into()),
            Error::ArityMismatch {
                method: "a.b".into(),
                given: 0,
                min: 1,
                max: 1,
            },
        ];

        for error in errors {
            assert_eq!(error.code(), 0, "{} should use code 0", error.kind());
        }
    }

    #[test]
    fn test_invocation_failure_forwards_code_and_message() {
        let error = Error::from(ServiceError::new(-42, "Boom"));
        let body = error.to_error_body();

        assert_eq!(body.code, -42);
        assert_eq!(body.message, "Boom");
        assert_eq!(error.kind(), "invocation_failure");
    }

    #[test]
    fn test_service_error_msg_defaults_to_zero() {
        let error = ServiceError::msg("plain failure");
        assert_eq!(error.code, 0);
        assert_eq!(error.message, "plain failure");
    }

    #[test]
    fn test_is_decode_error() {
        assert!(Error::MissingToken.is_decode_error());
        assert!(!Error::UnknownTarget("x".into()).is_decode_error());
        assert!(!Error::from(ServiceError::msg("x")).is_decode_error());
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody::new(0, "Invalid params");
        let serialized = serde_json::to_string(&body).unwrap();
        assert_eq!(serialized, r#"{"code":0,"message":"Invalid params"}"#);
    }

    #[test]
    fn test_error_body_display() {
        let body = ErrorBody::new(17, "Something failed");
        assert_eq!(body.to_string(), "[17] Something failed");
    }
}
