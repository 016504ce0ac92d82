//! Chat-platform boundary: role grants and direct-message notification.
//!
//! The platform is an external collaborator; this module only fixes the
//! interface the orchestrator commands it through. The Discord REST
//! implementation lives in `rolelink-discord`.

use async_trait::async_trait;
use rolelink_core::{DiscordUserId, GuildId, RobloxUserId, RoleId};
use std::fmt;

/// Content of the post-verification direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNotice {
    /// The Roblox display name that was linked.
    pub roblox_username: String,
    /// The linked Roblox subject identifier.
    pub roblox_user_id: RobloxUserId,
    /// Avatar to show alongside the notice, when available.
    pub avatar_url: Option<String>,
}

/// Errors from chat-platform mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform API rejected the request.
    Api { details: String },
    /// The request never reached the platform.
    Transport { details: String },
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { details } => write!(f, "platform API error: {details}"),
            Self::Transport { details } => write!(f, "platform transport error: {details}"),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Chat platform specified at its interface boundary.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Adds `role` to `user` within `guild`.
    async fn add_role(
        &self,
        guild: &GuildId,
        user: &DiscordUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError>;

    /// Delivers the verification summary to `user` as a direct message.
    async fn send_dm(&self, user: &DiscordUserId, notice: &LinkNotice)
    -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_error_display() {
        let api = PlatformError::Api {
            details: "unknown role".to_string(),
        };
        assert!(api.to_string().contains("unknown role"));

        let transport = PlatformError::Transport {
            details: "timed out".to_string(),
        };
        assert!(transport.to_string().contains("timed out"));
    }
}
