//! Error types for Discord API operations.

use rolelink_verification::PlatformError;
use std::fmt;

/// Errors from Discord REST calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscordError {
    /// Discord answered with a non-success status.
    Api {
        status: u16,
        code: i64,
        message: String,
    },
    /// The request never completed.
    Transport { details: String },
    /// Discord answered with a body we could not interpret.
    InvalidResponse { details: String },
}

impl fmt::Display for DiscordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api {
                status,
                code,
                message,
            } => {
                write!(f, "Discord API error (code {code}, status {status}): {message}")
            }
            Self::Transport { details } => write!(f, "Discord request failed: {details}"),
            Self::InvalidResponse { details } => {
                write!(f, "unexpected Discord response: {details}")
            }
        }
    }
}

impl std::error::Error for DiscordError {}

impl From<DiscordError> for PlatformError {
    fn from(e: DiscordError) -> Self {
        match e {
            DiscordError::Transport { details } => PlatformError::Transport { details },
            other => PlatformError::Api {
                details: other.to_string(),
            },
        }
    }
}
