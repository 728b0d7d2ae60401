//! Invocation of validated calls
//!
//! The service instance is built per call and receives the request token
//! at construction. Params are bound by position. Whatever the service
//! returns is passed on untouched: a value becomes the result, a
//! [`ServiceError`](rpcgate_core::ServiceError) becomes
//! `Error::InvocationFailure` carrying the service's own code and message.

use crate::service::Params;
use crate::validator::ValidatedCall;
use rpcgate_core::{Error, Result};
use serde_json::Value;

/// Call a validated member
pub fn invoke(call: &ValidatedCall, token: Option<&str>, params: Vec<Value>) -> Result<Value> {
    call.target()
        .invoke(token, call.member(), Params::new(params))
        .map_err(Error::InvocationFailure)
}
