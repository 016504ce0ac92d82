//! Discord REST client (API v10).
//!
//! Covers the three mutations the verification flow needs: posting the
//! prompt message to a channel, adding the verified role to a member, and
//! delivering the confirmation direct message. Authentication uses the bot
//! token in the `Bot` authorization scheme.

use async_trait::async_trait;
use rolelink_core::{ChannelId, DiscordUserId, GuildId, RoleId};
use rolelink_verification::{ChatPlatform, LinkNotice, PlatformError};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::DiscordError;

/// Discord API v10 base URL.
const API_BASE_URL: &str = "https://discord.com/api/v10";

/// Embed accent for informational messages.
const EMBED_COLOR_INFO: u32 = 0x0099ff;

/// Embed accent for the success notice.
const EMBED_COLOR_SUCCESS: u32 = 0x00ff00;

/// REST client for the Discord Bot API.
pub struct DiscordApi {
    http: reqwest::Client,
    bot_token: String,
}

impl DiscordApi {
    /// Creates a client authenticating with `bot_token`.
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("rolelink/0.1")
            .build()
            .unwrap_or_default();
        Self {
            http,
            bot_token: bot_token.into(),
        }
    }

    fn api_url(path: &str) -> String {
        format!("{API_BASE_URL}{path}")
    }

    fn bot_auth(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Posts a message payload to a channel.
    pub async fn post_message(
        &self,
        channel: &ChannelId,
        message: &Value,
    ) -> Result<(), DiscordError> {
        let url = Self::api_url(&format!("/channels/{channel}/messages"));
        debug!(channel = %channel, "posting Discord message");

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.bot_auth())
            .json(message)
            .send()
            .await
            .map_err(transport)?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Adds `role` to `user` within `guild`.
    pub async fn add_member_role(
        &self,
        guild: &GuildId,
        user: &DiscordUserId,
        role: &RoleId,
    ) -> Result<(), DiscordError> {
        let url = Self::api_url(&format!("/guilds/{guild}/members/{user}/roles/{role}"));
        debug!(guild = %guild, user = %user, role = %role, "adding member role");

        let response = self
            .http
            .put(&url)
            .header("Authorization", self.bot_auth())
            .header("Content-Length", "0")
            .send()
            .await
            .map_err(transport)?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Opens (or reuses) the DM channel with `user`.
    pub async fn create_dm_channel(
        &self,
        user: &DiscordUserId,
    ) -> Result<ChannelId, DiscordError> {
        let url = Self::api_url("/users/@me/channels");
        let body = json!({ "recipient_id": user.as_str() });

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.bot_auth())
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let channel = Self::expect_success(response).await?;

        channel
            .get("id")
            .and_then(Value::as_str)
            .map(ChannelId::new)
            .ok_or_else(|| DiscordError::InvalidResponse {
                details: "DM channel response missing id".to_string(),
            })
    }

    /// The channel prompt inviting members to verify.
    ///
    /// Posted once at startup; carries the button whose clicks arrive on the
    /// interactions endpoint.
    #[must_use]
    pub fn verification_prompt(button_custom_id: &str) -> Value {
        json!({
            "embeds": [{
                "color": EMBED_COLOR_INFO,
                "title": "🔐 Roblox Verification",
                "description": "Welcome to the server! To access all channels, you need to \
                                verify your Roblox account.\n\n**How does it work?**\n\
                                1. Click the \"Verify with Roblox\" button\n\
                                2. You will be redirected to Roblox.com\n\
                                3. Authorize the application\n\
                                4. Come back automatically verified\n\n\
                                ✅ **100% safe** - official Roblox verification",
                "footer": { "text": "Your information is stored securely" }
            }],
            "components": [{
                "type": 1,
                "components": [{
                    "type": 2,
                    "style": 1,
                    "label": "Verify with Roblox",
                    "emoji": { "name": "🔒" },
                    "custom_id": button_custom_id
                }]
            }]
        })
    }

    fn link_notice_message(notice: &LinkNotice) -> Value {
        let mut embed = json!({
            "color": EMBED_COLOR_SUCCESS,
            "title": "✅ Verification Successful",
            "description": format!(
                "Your account has been verified!\n\n**Roblox:** {}\n**ID:** {}\n\n\
                 You now have access to all channels!",
                notice.roblox_username,
                notice.roblox_user_id
            ),
        });
        if let Some(avatar_url) = &notice.avatar_url {
            embed["thumbnail"] = json!({ "url": avatar_url });
        }
        json!({ "embeds": [embed] })
    }

    /// Reads a response body, rejecting non-success statuses.
    async fn expect_success(response: reqwest::Response) -> Result<Value, DiscordError> {
        let status = response.status();

        // Role adds and some other mutations answer 204 with no body.
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DiscordError::InvalidResponse {
                details: e.to_string(),
            })?;

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let code = body.get("code").and_then(Value::as_i64).unwrap_or(-1);
            return Err(DiscordError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(body)
    }
}

fn transport(e: reqwest::Error) -> DiscordError {
    DiscordError::Transport {
        details: e.to_string(),
    }
}

#[async_trait]
impl ChatPlatform for DiscordApi {
    async fn add_role(
        &self,
        guild: &GuildId,
        user: &DiscordUserId,
        role: &RoleId,
    ) -> Result<(), PlatformError> {
        self.add_member_role(guild, user, role)
            .await
            .map_err(PlatformError::from)
    }

    async fn send_dm(
        &self,
        user: &DiscordUserId,
        notice: &LinkNotice,
    ) -> Result<(), PlatformError> {
        let channel = self.create_dm_channel(user).await?;
        let message = Self::link_notice_message(notice);
        self.post_message(&channel, &message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolelink_core::RobloxUserId;

    #[test]
    fn api_url_joins_base_and_path() {
        assert_eq!(
            DiscordApi::api_url("/channels/123/messages"),
            "https://discord.com/api/v10/channels/123/messages"
        );
        assert_eq!(
            DiscordApi::api_url("/guilds/1/members/2/roles/3"),
            "https://discord.com/api/v10/guilds/1/members/2/roles/3"
        );
    }

    #[test]
    fn bot_auth_uses_bot_scheme() {
        let api = DiscordApi::new("token-abc");
        assert_eq!(api.bot_auth(), "Bot token-abc");
    }

    #[test]
    fn verification_prompt_carries_the_button() {
        let prompt = DiscordApi::verification_prompt("verify_roblox");
        let button = &prompt["components"][0]["components"][0];
        assert_eq!(button["custom_id"], "verify_roblox");
        assert_eq!(button["style"], 1);
        assert_eq!(prompt["embeds"][0]["title"], "🔐 Roblox Verification");
    }

    #[test]
    fn link_notice_includes_identity_and_avatar() {
        let notice = LinkNotice {
            roblox_username: "builderman".to_string(),
            roblox_user_id: RobloxUserId::new("156"),
            avatar_url: Some("https://cdn.example/avatar.png".to_string()),
        };
        let message = DiscordApi::link_notice_message(&notice);
        let embed = &message["embeds"][0];
        let description = embed["description"].as_str().unwrap();

        assert!(description.contains("builderman"));
        assert!(description.contains("156"));
        assert_eq!(embed["thumbnail"]["url"], "https://cdn.example/avatar.png");
    }

    #[test]
    fn link_notice_without_avatar_has_no_thumbnail() {
        let notice = LinkNotice {
            roblox_username: "builderman".to_string(),
            roblox_user_id: RobloxUserId::new("156"),
            avatar_url: None,
        };
        let message = DiscordApi::link_notice_message(&notice);
        assert!(message["embeds"][0].get("thumbnail").is_none());
    }
}
