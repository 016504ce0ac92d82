//! Interaction webhook payloads and responses.
//!
//! Discord delivers button clicks as signed HTTP posts; this module models
//! the slice of the interaction object the verification flow reads and the
//! JSON responses the webhook answers with. Replies use the ephemeral flag
//! so only the clicking member sees them.

use rolelink_core::{DiscordUserId, GuildId};
use serde::Deserialize;
use serde_json::{Value, json};

/// Custom id of the verify button, shared by the channel prompt and the
/// component dispatch.
pub const VERIFY_BUTTON_ID: &str = "verify_roblox";

/// Interaction type: Discord's liveness ping.
pub const INTERACTION_PING: u8 = 1;

/// Interaction type: a message component (button) was used.
pub const INTERACTION_MESSAGE_COMPONENT: u8 = 3;

/// Response type acknowledging a ping.
const RESPONSE_PONG: u8 = 1;

/// Response type carrying a message.
const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

/// Message flag rendering the reply only to the invoking member.
const FLAG_EPHEMERAL: u64 = 64;

/// Embed accent for informational replies.
const EMBED_COLOR_INFO: u32 = 0x0099ff;

/// The slice of an inbound interaction the verification flow needs.
#[derive(Debug, Deserialize)]
pub struct Interaction {
    /// Interaction type discriminator.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Component payload, present for component interactions.
    #[serde(default)]
    pub data: Option<ComponentData>,
    /// Guild the interaction happened in, absent in DMs.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// Invoking guild member, present for guild interactions.
    #[serde(default)]
    pub member: Option<Member>,
    /// Invoking user, present for DM interactions.
    #[serde(default)]
    pub user: Option<User>,
}

/// Component payload of a message-component interaction.
#[derive(Debug, Deserialize)]
pub struct ComponentData {
    /// Custom id of the component that was used.
    #[serde(default)]
    pub custom_id: Option<String>,
}

/// Guild member wrapper around the invoking user.
#[derive(Debug, Deserialize)]
pub struct Member {
    pub user: User,
}

/// The invoking user.
#[derive(Debug, Deserialize)]
pub struct User {
    pub id: DiscordUserId,
}

impl Interaction {
    /// True for Discord's endpoint-validation ping.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        self.kind == INTERACTION_PING
    }

    /// Custom id of the pressed component, for component interactions.
    #[must_use]
    pub fn component_custom_id(&self) -> Option<&str> {
        if self.kind != INTERACTION_MESSAGE_COMPONENT {
            return None;
        }
        self.data.as_ref()?.custom_id.as_deref()
    }

    /// The invoking user, from the member wrapper in guilds or directly
    /// in DMs.
    #[must_use]
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .map(|m| &m.user)
            .or(self.user.as_ref())
    }
}

/// Acknowledges an endpoint-validation ping.
#[must_use]
pub fn pong() -> Value {
    json!({ "type": RESPONSE_PONG })
}

/// An ephemeral plain-text reply.
#[must_use]
pub fn ephemeral_text(content: &str) -> Value {
    json!({
        "type": RESPONSE_CHANNEL_MESSAGE,
        "data": {
            "content": content,
            "flags": FLAG_EPHEMERAL
        }
    })
}

/// The ephemeral reply presenting the authorization link.
///
/// The URL carries the opaque state and nothing else secret; the link
/// button is the external-link affordance of the flow.
#[must_use]
pub fn ephemeral_verify_link(authorization_url: &str) -> Value {
    json!({
        "type": RESPONSE_CHANNEL_MESSAGE,
        "data": {
            "embeds": [{
                "color": EMBED_COLOR_INFO,
                "title": "🔗 Verification in progress",
                "description": "Click the button below to verify with Roblox.\n\n\
                                **Important:** the link expires in 5 minutes."
            }],
            "components": [{
                "type": 1,
                "components": [{
                    "type": 2,
                    "style": 5,
                    "label": "Go to Roblox",
                    "emoji": { "name": "🚀" },
                    "url": authorization_url
                }]
            }],
            "flags": FLAG_EPHEMERAL
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_payload_is_recognized() {
        let interaction: Interaction = serde_json::from_value(json!({ "type": 1 })).unwrap();
        assert!(interaction.is_ping());
        assert!(interaction.component_custom_id().is_none());
    }

    #[test]
    fn component_payload_exposes_custom_id_and_invoker() {
        let interaction: Interaction = serde_json::from_value(json!({
            "type": 3,
            "guild_id": "200",
            "data": { "custom_id": "verify_roblox" },
            "member": { "user": { "id": "100" } }
        }))
        .unwrap();

        assert_eq!(interaction.component_custom_id(), Some("verify_roblox"));
        assert_eq!(interaction.invoker().unwrap().id.as_str(), "100");
        assert_eq!(interaction.guild_id.as_ref().unwrap().as_str(), "200");
    }

    #[test]
    fn dm_interaction_falls_back_to_top_level_user() {
        let interaction: Interaction = serde_json::from_value(json!({
            "type": 3,
            "data": { "custom_id": "verify_roblox" },
            "user": { "id": "100" }
        }))
        .unwrap();

        assert_eq!(interaction.invoker().unwrap().id.as_str(), "100");
        assert!(interaction.guild_id.is_none());
    }

    #[test]
    fn custom_id_ignored_for_non_component_interactions() {
        let interaction: Interaction = serde_json::from_value(json!({
            "type": 2,
            "data": { "custom_id": "verify_roblox" }
        }))
        .unwrap();
        assert!(interaction.component_custom_id().is_none());
    }

    #[test]
    fn pong_shape() {
        assert_eq!(pong(), json!({ "type": 1 }));
    }

    #[test]
    fn ephemeral_text_sets_flag() {
        let reply = ephemeral_text("✅ You are already verified!");
        assert_eq!(reply["type"], 4);
        assert_eq!(reply["data"]["flags"], 64);
        assert_eq!(reply["data"]["content"], "✅ You are already verified!");
    }

    #[test]
    fn verify_link_reply_uses_link_button() {
        let reply = ephemeral_verify_link("https://provider.test/authorize?state=abc");
        let button = &reply["data"]["components"][0]["components"][0];

        assert_eq!(button["style"], 5);
        assert_eq!(button["url"], "https://provider.test/authorize?state=abc");
        assert_eq!(reply["data"]["flags"], 64);
    }
}
