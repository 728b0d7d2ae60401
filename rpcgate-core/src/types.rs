//! Request and envelope types
//!
//! The gateway speaks a small JSON-RPC dialect rather than JSON-RPC 2.0:
//!
//! - A **request** names a `"class.method"` target, carries positional
//!   `params`, and usually a `token`.
//! - A **response** is always an [`Envelope`] with exactly two keys,
//!   `error` and `result`, one of which is `null`.
//!
//! # Method Names
//!
//! A method name is dot-delimited. The segment after the last dot is the
//! *member name*; everything before it is the *target identifier*. Nested
//! namespaces stay joined with dots here; translating them into registry
//! names is the resolver's job.

use crate::error::ErrorBody;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Separator between namespace segments and the member name
pub const METHOD_DELIMITER: char = '.';

/// Split a dotted method name into `(target identifier, member name)`
///
/// Splits on the last delimiter only. Without a delimiter the target
/// identifier is empty and the whole string is the member name.
///
/// ```rust
/// use rpcgate_core::split_target;
///
/// assert_eq!(split_target("a.b.c"), ("a.b", "c"));
/// assert_eq!(split_target("c"), ("", "c"));
/// ```
pub fn split_target(method: &str) -> (&str, &str) {
    match method.rfind(METHOD_DELIMITER) {
        Some(idx) => (&method[..idx], &method[idx + METHOD_DELIMITER.len_utf8()..]),
        None => ("", method),
    }
}

/// A decoded call
///
/// Built by [`crate::codec::decode_request`] and read-only afterwards; the
/// method name has no setter, and the target/member split is always derived
/// from it on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    method: String,
    token: Option<String>,
    params: Vec<Value>,
}

impl RpcRequest {
    /// Create a request
    ///
    /// `token` is `None` when the caller opted out of sending one.
    pub fn new(method: impl Into<String>, token: Option<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            token,
            params,
        }
    }

    /// Full dotted method name as sent
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Credential passed through to the service, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Positional parameters
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Target identifier (everything before the last delimiter)
    pub fn target_id(&self) -> &str {
        split_target(&self.method).0
    }

    /// Member name (everything after the last delimiter)
    pub fn member_name(&self) -> &str {
        split_target(&self.method).1
    }

    /// Take the request apart as `(method, token, params)`
    pub fn into_parts(self) -> (String, Option<String>, Vec<Value>) {
        (self.method, self.token, self.params)
    }
}

/// Response envelope
///
/// Success and failure are separate variants, so a value with both an error
/// and a result cannot be built. Serialization always writes both keys:
///
/// ```rust
/// use rpcgate_core::{Envelope, ErrorBody};
/// use serde_json::json;
///
/// let ok = Envelope::success(json!("hi"));
/// assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"error": null, "result": "hi"}));
///
/// let failed = Envelope::failure(ErrorBody::new(0, "No token"));
/// assert_eq!(
///     serde_json::to_value(&failed).unwrap(),
///     json!({"error": {"code": 0, "message": "No token"}, "result": null})
/// );
/// ```
///
/// A service that returns `null` still yields a success, which serializes as
/// `{"error": null, "result": null}`. Only a non-null `error` marks a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The service returned a value
    Success(Value),
    /// Decoding, validation or the service itself failed
    Failure(ErrorBody),
}

impl Envelope {
    /// Wrap a service result
    pub fn success(result: Value) -> Self {
        Envelope::Success(result)
    }

    /// Wrap an error body
    pub fn failure(error: ErrorBody) -> Self {
        Envelope::Failure(error)
    }

    /// Whether this is a success envelope
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// The result value, if successful
    pub fn result(&self) -> Option<&Value> {
        match self {
            Envelope::Success(value) => Some(value),
            Envelope::Failure(_) => None,
        }
    }

    /// The error body, if failed
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(error) => Some(error),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        match self {
            Envelope::Success(result) => {
                state.serialize_field("error", &Option::<ErrorBody>::None)?;
                state.serialize_field("result", result)?;
            }
            Envelope::Failure(error) => {
                state.serialize_field("error", error)?;
                state.serialize_field("result", &Value::Null)?;
            }
        }
        state.end()
    }
}
