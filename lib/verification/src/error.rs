//! Terminal failures of the verification callback protocol.
//!
//! Every variant maps to a complete user-facing result page at the HTTP
//! layer; none propagate as faults. Two further failure classes never reach
//! this enum by design: a failed role grant and a failed direct message are
//! observed, logged, and reported through flags on
//! [`VerifiedLink`](crate::VerifiedLink) instead of failing the flow.

use std::fmt;

/// Why a verification callback was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Missing or empty `code`/`state` parameters. User error, recoverable
    /// by restarting from the chat platform.
    InvalidRequest,
    /// Token unknown, already consumed, or aged out. Recoverable by
    /// restarting the flow.
    SessionExpired,
    /// The Roblox account is already linked. Business-rule conflict, not
    /// recoverable without manual intervention.
    AlreadyLinked,
    /// An identity-provider call failed. Transient; recoverable by retry.
    Upstream { details: String },
    /// The record store failed outside the uniqueness conflict.
    Store { details: String },
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid callback parameters"),
            Self::SessionExpired => write!(f, "verification session expired or invalid"),
            Self::AlreadyLinked => {
                write!(f, "roblox account already linked to another discord user")
            }
            Self::Upstream { details } => write!(f, "identity provider error: {details}"),
            Self::Store { details } => write!(f, "link store error: {details}"),
        }
    }
}

impl std::error::Error for VerificationError {}
