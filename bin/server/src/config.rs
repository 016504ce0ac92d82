//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables, with `__` separating nested sections
//! (e.g. `DISCORD__BOT_TOKEN`, `ROBLOX__CLIENT_ID`, `SESSION__TTL_SECONDS`).

use serde::Deserialize;

/// Roblox OAuth2 authorization endpoint.
const ROBLOX_AUTH_URL: &str = "https://apis.roblox.com/oauth/v1/authorize";

/// Roblox OAuth2 token endpoint.
const ROBLOX_TOKEN_URL: &str = "https://apis.roblox.com/oauth/v1/token";

/// Roblox OAuth2 userinfo endpoint.
const ROBLOX_USERINFO_URL: &str = "https://apis.roblox.com/oauth/v1/userinfo";

/// Top-level server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Discord credentials and target identifiers.
    pub discord: DiscordConfig,

    /// Roblox OAuth2 application configuration.
    pub roblox: RobloxConfig,

    /// Pending-session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Discord-side configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token used for REST calls.
    pub bot_token: String,

    /// Application public key (hex) verifying interaction signatures.
    pub public_key: String,

    /// Role granted to verified members.
    pub verified_role_id: String,

    /// Channel the verification prompt is posted to.
    pub verification_channel_id: String,
}

/// Roblox OAuth2 configuration.
///
/// Endpoint URLs default to the public Roblox API and only need overriding
/// when pointing the server at a stand-in provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RobloxConfig {
    /// OAuth2 client ID registered with Roblox.
    pub client_id: String,

    /// OAuth2 client secret, held server-side only.
    pub client_secret: String,

    /// Redirect URI registered for the callback route.
    pub redirect_uri: String,

    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
}

/// Pending-session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Seconds a pending session stays consumable.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: i64,

    /// Interval between sweep runs, in seconds.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_listen_port() -> u16 {
    3000
}

fn default_auth_url() -> String {
    ROBLOX_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    ROBLOX_TOKEN_URL.to_string()
}

fn default_userinfo_url() -> String {
    ROBLOX_USERINFO_URL.to_string()
}

fn default_ttl_seconds() -> i64 {
    300
}

fn default_sweep_interval_seconds() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl_seconds, 300);
        assert_eq!(config.sweep_interval_seconds, 300);
    }

    #[test]
    fn roblox_endpoints_default_to_public_api() {
        let config: RobloxConfig = serde_json::from_str(
            r#"{
                "client_id": "cid",
                "client_secret": "secret",
                "redirect_uri": "https://verify.example.com/callback"
            }"#,
        )
        .expect("deserialize");

        assert_eq!(config.auth_url, "https://apis.roblox.com/oauth/v1/authorize");
        assert_eq!(config.token_url, "https://apis.roblox.com/oauth/v1/token");
        assert_eq!(
            config.userinfo_url,
            "https://apis.roblox.com/oauth/v1/userinfo"
        );
    }
}
