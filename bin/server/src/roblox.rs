//! Roblox OAuth2 identity-provider client.
//!
//! Implements the two outbound calls of the flow: the server-to-server
//! authorization-code exchange (client credentials never leave this
//! process) and the authenticated userinfo fetch. The authorization URL
//! carries the pending-session token as the `state` parameter.

use async_trait::async_trait;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use rolelink_core::RobloxUserId;
use rolelink_verification::{IdentityProvider, ProviderError, RemoteProfile};
use serde::Deserialize;
use std::fmt;

use crate::config::RobloxConfig;

/// OAuth2 scopes requested from Roblox.
const ROBLOX_SCOPES: &[&str] = &["openid", "profile"];

/// Roblox OAuth2 client.
pub struct RobloxOAuth {
    config: RobloxConfig,
    http: reqwest::Client,
}

/// Configuration errors detected at construction, before serving traffic.
#[derive(Debug)]
pub enum RobloxConfigError {
    /// One of the configured URLs does not parse.
    InvalidUrl {
        field: &'static str,
        details: String,
    },
    /// The HTTP client could not be built.
    HttpClient { details: String },
}

impl fmt::Display for RobloxConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { field, details } => {
                write!(f, "invalid Roblox {field}: {details}")
            }
            Self::HttpClient { details } => {
                write!(f, "failed to create HTTP client: {details}")
            }
        }
    }
}

impl std::error::Error for RobloxConfigError {}

impl RobloxOAuth {
    /// Creates a client, validating every configured URL up front so a
    /// malformed configuration fails at startup rather than mid-flow.
    pub fn new(config: RobloxConfig) -> Result<Self, RobloxConfigError> {
        let invalid = |field: &'static str| {
            move |e: oauth2::url::ParseError| RobloxConfigError::InvalidUrl {
                field,
                details: e.to_string(),
            }
        };
        AuthUrl::new(config.auth_url.clone()).map_err(invalid("auth URL"))?;
        TokenUrl::new(config.token_url.clone()).map_err(invalid("token URL"))?;
        RedirectUrl::new(config.redirect_uri.clone()).map_err(invalid("redirect URI"))?;

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| RobloxConfigError::HttpClient {
                details: e.to_string(),
            })?;

        Ok(Self { config, http })
    }
}

/// Claims returned by the Roblox userinfo endpoint.
#[derive(Debug, Deserialize)]
struct UserInfoClaims {
    sub: String,
    preferred_username: Option<String>,
    picture: Option<String>,
}

#[async_trait]
impl IdentityProvider for RobloxOAuth {
    fn authorization_url(&self, state: &str) -> String {
        let client = BasicClient::new(ClientId::new(self.config.client_id.clone()))
            .set_auth_uri(AuthUrl::new(self.config.auth_url.clone()).expect("validated auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.config.redirect_uri.clone())
                    .expect("validated redirect URI"),
            );

        let state = state.to_string();
        let mut auth_request = client.authorize_url(move || CsrfToken::new(state));
        for scope in ROBLOX_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, _) = auth_request.url();
        auth_url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        let client = BasicClient::new(ClientId::new(self.config.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.config.client_secret.clone()))
            .set_token_uri(
                TokenUrl::new(self.config.token_url.clone()).expect("validated token URL"),
            )
            .set_redirect_uri(
                RedirectUrl::new(self.config.redirect_uri.clone())
                    .expect("validated redirect URI"),
            );

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| ProviderError::Exchange {
                details: e.to_string(),
            })?;

        Ok(token_response.access_token().secret().clone())
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<RemoteProfile, ProviderError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Profile {
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Profile {
                details: format!("userinfo endpoint answered {status}"),
            });
        }

        let claims: UserInfoClaims =
            response.json().await.map_err(|e| ProviderError::Profile {
                details: e.to_string(),
            })?;

        let username = claims
            .preferred_username
            .unwrap_or_else(|| claims.sub.clone());

        Ok(RemoteProfile {
            subject: RobloxUserId::new(claims.sub),
            username,
            avatar_url: claims.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RobloxConfig {
        RobloxConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://verify.example.com/callback".to_string(),
            auth_url: "https://apis.roblox.com/oauth/v1/authorize".to_string(),
            token_url: "https://apis.roblox.com/oauth/v1/token".to_string(),
            userinfo_url: "https://apis.roblox.com/oauth/v1/userinfo".to_string(),
        }
    }

    #[test]
    fn authorization_url_binds_state_and_scopes() {
        let oauth = RobloxOAuth::new(test_config()).expect("valid config");
        let url = oauth.authorization_url("tok-abc123");

        assert!(url.starts_with("https://apis.roblox.com/oauth/v1/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=tok-abc123"));
        assert!(url.contains("scope=openid+profile"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fverify.example.com%2Fcallback"));
        // The secret stays server-side.
        assert!(!url.contains("secret"));
    }

    #[test]
    fn malformed_auth_url_fails_construction() {
        let mut config = test_config();
        config.auth_url = "not a url".to_string();
        assert!(matches!(
            RobloxOAuth::new(config),
            Err(RobloxConfigError::InvalidUrl { field: "auth URL", .. })
        ));
    }

    #[test]
    fn userinfo_claims_deserialize_with_and_without_optionals() {
        let full: UserInfoClaims = serde_json::from_str(
            r#"{"sub":"156","preferred_username":"builderman","picture":"https://cdn.example/a.png"}"#,
        )
        .unwrap();
        assert_eq!(full.sub, "156");
        assert_eq!(full.preferred_username.as_deref(), Some("builderman"));

        let bare: UserInfoClaims = serde_json::from_str(r#"{"sub":"156"}"#).unwrap();
        assert!(bare.preferred_username.is_none());
        assert!(bare.picture.is_none());
    }
}
