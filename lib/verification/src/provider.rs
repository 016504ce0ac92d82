//! Identity-provider boundary: authorization URL, code exchange, profile.
//!
//! The provider is an external collaborator; this module only fixes its
//! interface. The concrete OAuth2 client lives in the server binary.

use async_trait::async_trait;
use rolelink_core::RobloxUserId;
use std::fmt;

/// The remote identity returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProfile {
    /// The provider's stable subject identifier.
    pub subject: RobloxUserId,
    /// Display name at verification time.
    pub username: String,
    /// Avatar image reference, when the provider supplies one.
    pub avatar_url: Option<String>,
}

/// Errors from identity-provider calls.
///
/// Details are for the server log only; user-facing output must never carry
/// the authorization code, client secret, or provider response bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The authorization-code exchange failed.
    Exchange { details: String },
    /// The profile fetch failed.
    Profile { details: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exchange { details } => write!(f, "code exchange failed: {details}"),
            Self::Profile { details } => write!(f, "profile fetch failed: {details}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// OAuth2 identity provider specified at its interface boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the authorization URL for a flow bound to `state`.
    ///
    /// The state value is the session token and the sole binding between
    /// the OAuth round-trip and the pending session.
    fn authorization_url(&self, state: &str) -> String;

    /// Trades an authorization code for an access token, server-to-server.
    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError>;

    /// Fetches the remote identity behind an access token.
    async fn fetch_profile(&self, access_token: &str) -> Result<RemoteProfile, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_names_the_step() {
        let exchange = ProviderError::Exchange {
            details: "status 400".to_string(),
        };
        assert!(exchange.to_string().contains("code exchange"));

        let profile = ProviderError::Profile {
            details: "status 401".to_string(),
        };
        assert!(profile.to_string().contains("profile fetch"));
    }
}
