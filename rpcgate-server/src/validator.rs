//! Call validation
//!
//! Decides whether a resolved target may be called with the supplied number
//! of params. The checks run in a fixed order and the first failure wins:
//!
//! 1. Target not found → `Error::UnknownTarget`
//! 2. Target abstract, interface or internal → `Error::ForbiddenTarget`
//! 3. Member not found → `Error::UnknownTarget`
//! 4. Member abstract, constructor, static or non-public → `Error::ForbiddenMember`
//! 5. Param count outside the member's arity → `Error::ArityMismatch`
//!
//! Validation is pure: it reads the resolution and returns a verdict.

use crate::resolver::Resolution;
use crate::service::{MemberInfo, Target};
use rpcgate_core::{split_target, Error, Result};
use std::sync::Arc;

/// A call that passed validation and is ready to invoke
#[derive(Clone)]
pub struct ValidatedCall {
    target: Arc<dyn Target>,
    member: String,
    info: MemberInfo,
}

impl ValidatedCall {
    /// Target to invoke
    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }

    /// Member name to call
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Description of the member
    pub fn info(&self) -> &MemberInfo {
        &self.info
    }
}

impl std::fmt::Debug for ValidatedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedCall")
            .field("target", &self.target.name())
            .field("member", &self.member)
            .field("info", &self.info)
            .finish()
    }
}

/// Validate a call to `method` against its resolution
///
/// `method` is the full dotted name from the request; it appears verbatim
/// in every error message.
pub fn validate(method: &str, resolution: Resolution, arg_count: usize) -> Result<ValidatedCall> {
    let resolved = match resolution {
        Resolution::NotFound => return Err(Error::UnknownTarget(method.to_string())),
        Resolution::Found(resolved) => resolved,
    };

    if !resolved.kind().is_dispatchable() {
        return Err(Error::ForbiddenTarget(method.to_string()));
    }

    let (_, member) = split_target(method);

    let info = resolved
        .member(member)
        .ok_or_else(|| Error::UnknownTarget(method.to_string()))?;

    if !info.is_invokable() {
        return Err(Error::ForbiddenMember(method.to_string()));
    }

    if !info.arity.accepts(arg_count) {
        return Err(Error::ArityMismatch {
            method: method.to_string(),
            given: arg_count,
            min: info.arity.min(),
            max: info.arity.max(),
        });
    }

    Ok(ValidatedCall {
        target: Arc::clone(resolved.target()),
        member: member.to_string(),
        info,
    })
}
