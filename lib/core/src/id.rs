//! Strongly-typed identifier wrappers for externally-issued IDs.
//!
//! Discord snowflakes and Roblox subject identifiers are minted by their
//! respective platforms, so these wrappers carry the opaque string form
//! rather than generating anything locally. The types exist to keep the two
//! id spaces from being mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate an opaque string-backed ID wrapper.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from its platform-issued string form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(
    /// A Discord user snowflake.
    DiscordUserId
);

define_id!(
    /// A Discord guild (server) snowflake.
    GuildId
);

define_id!(
    /// A Discord channel snowflake.
    ChannelId
);

define_id!(
    /// A Discord role snowflake.
    RoleId
);

define_id!(
    /// The Roblox identity provider's stable subject identifier for a user.
    RobloxUserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_is_raw_string() {
        let id = DiscordUserId::new("123456789012345678");
        assert_eq!(id.to_string(), "123456789012345678");
    }

    #[test]
    fn id_from_str_and_string() {
        let from_str: GuildId = "42".into();
        let from_string: GuildId = "42".to_string().into();
        assert_eq!(from_str, from_string);
    }

    #[test]
    fn distinct_types_with_same_value_compile_separately() {
        let user = DiscordUserId::new("1");
        let role = RoleId::new("1");
        assert_eq!(user.as_str(), role.as_str());
    }

    #[test]
    fn id_hash_dedupes() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(RobloxUserId::new("a"));
        set.insert(RobloxUserId::new("b"));
        set.insert(RobloxUserId::new("a"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip_is_transparent() {
        let id = RobloxUserId::new("987654321");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"987654321\"");
        let parsed: RobloxUserId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
