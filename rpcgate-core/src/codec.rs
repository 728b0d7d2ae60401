//! Codec for gateway requests and envelopes
//!
//! Decoding turns a raw request body into an [`RpcRequest`], checking the
//! fields in a fixed order and stopping at the first problem:
//!
//! 1. The body must be a JSON object → `Error::MalformedBody`
//! 2. `method` must be a non-empty string → `Error::MissingMethod`
//! 3. `params` must be an array → `Error::MissingParams`
//! 4. Unless `omitToken` is truthy, `token` must be non-empty → `Error::MissingToken`
//!
//! Encoding turns an [`Envelope`] back into bytes.
//!
//! # Loose Values
//!
//! `omitToken` and `token` are read loosely: `omitToken` may be any JSON
//! value and is judged by truthiness, and a numeric token is accepted in its
//! textual form. Values that are "empty" (`null`, `false`, `0`, `""`, `"0"`,
//! empty arrays and objects) count as absent.
//!
//! # Examples
//!
//! ```rust
//! use rpcgate_core::codec;
//!
//! let body = br#"{"method":"Echo.say","params":["hi"],"omitToken":true}"#;
//! let request = codec::decode_request(body).unwrap();
//! assert_eq!(request.member_name(), "say");
//! assert!(request.token().is_none());
//! ```

use crate::error::{Error, Result};
use crate::types::{Envelope, RpcRequest};
use serde_json::Value;

/// Field naming the dotted method
pub const METHOD_FIELD: &str = "method";
/// Field holding positional params
pub const PARAMS_FIELD: &str = "params";
/// Field holding the credential token
pub const TOKEN_FIELD: &str = "token";
/// Field opting out of the token requirement
pub const OMIT_TOKEN_FIELD: &str = "omitToken";

/// Decode a raw request body
///
/// # Errors
///
/// One of `MalformedBody`, `MissingMethod`, `MissingParams`, `MissingToken`,
/// in that order of precedence.
pub fn decode_request(data: &[u8]) -> Result<RpcRequest> {
    let value: Value = serde_json::from_slice(data).map_err(|_e| Error::MalformedBody)?;

    let Value::Object(mut fields) = value else {
        return Err(Error::MalformedBody);
    };

    let method = match fields.remove(METHOD_FIELD) {
        Some(Value::String(method)) if !method.is_empty() => method,
        _ => return Err(Error::MissingMethod),
    };

    let params = match fields.remove(PARAMS_FIELD) {
        Some(Value::Array(params)) => params,
        _ => return Err(Error::MissingParams),
    };

    let omit_token = fields.get(OMIT_TOKEN_FIELD).map(is_truthy).unwrap_or(false);

    let token = if omit_token {
        None
    } else {
        let token = fields
            .get(TOKEN_FIELD)
            .and_then(token_text)
            .ok_or(Error::MissingToken)?;
        Some(token)
    };

    Ok(RpcRequest::new(method, token, params))
}

/// Encode an envelope to bytes
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|e| Error::Serialization(e.to_string()))
}

/// Loose boolean reading of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Textual form of a token value, or `None` if it counts as empty
fn token_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorBody;
    use serde_json::json;

    fn decode(value: Value) -> Result<RpcRequest> {
        decode_request(value.to_string().as_bytes())
    }

    #[test]
    fn test_decode_full_request() {
        let request = decode(json!({
            "method": "Billing.charge",
            "params": [100, "USD"],
            "token": "abc123",
            "omitToken": false
        }))
        .unwrap();

        assert_eq!(request.method(), "Billing.charge");
        assert_eq!(request.token(), Some("abc123"));
        assert_eq!(request.params(), &[json!(100), json!("USD")]);
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        let bodies: [&[u8]; 7] = [b"not json", b"42", b"\"text\"", b"[1,2]", b"null", b"", b"\xff\xfe"];
        for body in bodies {
            let result = decode_request(body);
            assert!(matches!(result, Err(Error::MalformedBody)), "body {:?}", body);
        }
    }

    #[test]
    fn test_decode_missing_method() {
        let result = decode(json!({"params": [], "token": "t"}));
        assert!(matches!(result, Err(Error::MissingMethod)));
    }

    #[test]
    fn test_decode_non_string_or_empty_method() {
        for method in [json!(12), json!(null), json!(["a"]), json!("")] {
            let result = decode(json!({"method": method, "params": [], "token": "t"}));
            assert!(matches!(result, Err(Error::MissingMethod)));
        }
    }

    #[test]
    fn test_decode_missing_params() {
        let result = decode(json!({"method": "Echo.say", "token": "t"}));
        assert!(matches!(result, Err(Error::MissingParams)));
    }

    #[test]
    fn test_decode_params_object_is_rejected() {
        let result = decode(json!({"method": "Echo.say", "params": {"x": 1}, "token": "t"}));
        assert!(matches!(result, Err(Error::MissingParams)));
    }

    #[test]
    fn test_decode_method_checked_before_params() {
        let result = decode(json!({"params": "nope"}));
        assert!(matches!(result, Err(Error::MissingMethod)));
    }

    #[test]
    fn test_decode_missing_token() {
        let result = decode(json!({"method": "Echo.say", "params": []}));
        assert!(matches!(result, Err(Error::MissingToken)));
    }

    #[test]
    fn test_decode_empty_tokens_are_missing() {
        for token in [json!(""), json!("0"), json!(0), json!(null), json!(false), json!([]), json!({"a": 1})] {
            let result = decode(json!({"method": "Echo.say", "params": [], "token": token}));
            assert!(matches!(result, Err(Error::MissingToken)), "token {}", token);
        }
    }

    #[test]
    fn test_decode_numeric_token_is_stringified() {
        let request = decode(json!({"method": "Echo.say", "params": [], "token": 1234})).unwrap();
        assert_eq!(request.token(), Some("1234"));
    }

    #[test]
    fn test_decode_omit_token() {
        let request = decode(json!({"method": "Echo.say", "params": ["hi"], "omitToken": true})).unwrap();
        assert!(request.token().is_none());
    }

    #[test]
    fn test_decode_omit_token_ignores_supplied_token() {
        let request = decode(json!({
            "method": "Echo.say",
            "params": [],
            "omitToken": true,
            "token": "ignored"
        }))
        .unwrap();
        assert!(request.token().is_none());
    }

    #[test]
    fn test_decode_omit_token_truthiness() {
        for flag in [json!(1), json!("yes"), json!([0])] {
            let result = decode(json!({"method": "Echo.say", "params": [], "omitToken": flag}));
            assert!(result.is_ok());
        }
        for flag in [json!(0), json!("0"), json!(""), json!(null), json!(false)] {
            let result = decode(json!({"method": "Echo.say", "params": [], "omitToken": flag}));
            assert!(matches!(result, Err(Error::MissingToken)));
        }
    }

    #[test]
    fn test_encode_envelope() {
        let bytes = encode_envelope(&Envelope::success(json!("hi"))).unwrap();
        assert_eq!(bytes, br#"{"error":null,"result":"hi"}"#.to_vec());

        let bytes = encode_envelope(&Envelope::failure(ErrorBody::new(0, "Invalid params"))).unwrap();
        assert_eq!(
            bytes,
            br#"{"error":{"code":0,"message":"Invalid params"},"result":null}"#.to_vec()
        );
    }
}
