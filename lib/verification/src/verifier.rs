//! The verification orchestrator.
//!
//! Drives the end-to-end protocol: start-of-flow session creation, the
//! OAuth2 callback exchange, uniqueness enforcement, record persistence,
//! role grant, and notification.

use crate::error::VerificationError;
use crate::link::{LinkRecord, LinkStore, StoreError};
use crate::platform::{ChatPlatform, LinkNotice, PlatformError};
use crate::provider::IdentityProvider;
use crate::session::SessionRegistry;
use rolelink_core::{DiscordUserId, GuildId, RobloxUserId, RoleId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a user pressing the verify button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The user already holds a link record; nothing was created.
    AlreadyVerified,
    /// A pending session was created; send the user to this URL.
    Redirect { authorization_url: String },
}

/// A successfully established link, with the best-effort follow-up outcomes.
///
/// `role_granted` and `notified` record what happened after the insert; both
/// are observed and logged but never fail the flow. The persisted record is
/// authoritative even when the role grant did not land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedLink {
    /// The Discord user now linked.
    pub user_id: DiscordUserId,
    /// The linked Roblox subject.
    pub roblox_user_id: RobloxUserId,
    /// Roblox display name at link time.
    pub roblox_username: String,
    /// Avatar reference, when the provider supplied one.
    pub avatar_url: Option<String>,
    /// Whether the verified role was added to the member.
    pub role_granted: bool,
    /// Whether the direct-message summary was delivered.
    pub notified: bool,
}

/// Orchestrates verification flows against the injected collaborators.
///
/// Owns the [`SessionRegistry`] (the process's only mutable shared state)
/// and holds the store, provider, and platform behind their interface
/// boundaries.
pub struct Verifier {
    registry: SessionRegistry,
    store: Arc<dyn LinkStore>,
    provider: Arc<dyn IdentityProvider>,
    platform: Arc<dyn ChatPlatform>,
    verified_role: RoleId,
}

impl Verifier {
    /// Creates an orchestrator over the given collaborators.
    pub fn new(
        registry: SessionRegistry,
        store: Arc<dyn LinkStore>,
        provider: Arc<dyn IdentityProvider>,
        platform: Arc<dyn ChatPlatform>,
        verified_role: RoleId,
    ) -> Self {
        Self {
            registry,
            store,
            provider,
            platform,
            verified_role,
        }
    }

    /// Starts a verification flow for a button click.
    ///
    /// Idempotent for already-linked users: no session is created and no
    /// state changes. Safe to repeat concurrently for the same user; each
    /// call issues a distinct token.
    pub async fn begin(
        &self,
        user_id: DiscordUserId,
        guild_id: GuildId,
    ) -> Result<StartOutcome, VerificationError> {
        let existing = self
            .store
            .find_by_discord_id(&user_id)
            .await
            .map_err(store_error)?;
        if existing.is_some() {
            return Ok(StartOutcome::AlreadyVerified);
        }

        let token = self.registry.create(user_id, guild_id);
        let authorization_url = self.provider.authorization_url(token.as_str());
        Ok(StartOutcome::Redirect { authorization_url })
    }

    /// Completes a verification flow for an inbound OAuth2 callback.
    ///
    /// Steps run in fixed order and short-circuit on failure. The session is
    /// consumed before anything else so the token burns even when a later
    /// step fails; a retry with the same `state` is then indistinguishable
    /// from replay and rejected.
    pub async fn complete(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<VerifiedLink, VerificationError> {
        let (code, state) = match (code, state) {
            (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => (code, state),
            _ => return Err(VerificationError::InvalidRequest),
        };

        let session = self
            .registry
            .consume(state)
            .ok_or(VerificationError::SessionExpired)?;

        let access_token = self.provider.exchange_code(code).await.map_err(|e| {
            warn!(error = %e, "authorization-code exchange failed");
            VerificationError::Upstream {
                details: e.to_string(),
            }
        })?;

        let profile = self
            .provider
            .fetch_profile(&access_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "profile fetch failed");
                VerificationError::Upstream {
                    details: e.to_string(),
                }
            })?;

        let existing = self
            .store
            .find_by_roblox_id(&profile.subject)
            .await
            .map_err(store_error)?;
        if existing.is_some() {
            return Err(VerificationError::AlreadyLinked);
        }

        let record = LinkRecord::new(
            session.user_id.clone(),
            profile.subject.clone(),
            profile.username.clone(),
        );
        match self.store.insert(&record).await {
            Ok(()) => {}
            // Two callbacks raced to the same subject between the read above
            // and this insert; the store's unique constraint picked the
            // winner and this flow lost.
            Err(StoreError::Conflict) => return Err(VerificationError::AlreadyLinked),
            Err(e) => return Err(store_error(e)),
        }

        info!(
            user = %session.user_id,
            subject = %profile.subject,
            "account link persisted"
        );

        let role_granted = self
            .grant_role(&session.guild_id, &session.user_id)
            .await
            .is_ok();

        let notice = LinkNotice {
            roblox_username: profile.username.clone(),
            roblox_user_id: profile.subject.clone(),
            avatar_url: profile.avatar_url.clone(),
        };
        let notified = self.notify(&session.user_id, &notice).await.is_ok();

        Ok(VerifiedLink {
            user_id: session.user_id,
            roblox_user_id: profile.subject,
            roblox_username: profile.username,
            avatar_url: profile.avatar_url,
            role_granted,
            notified,
        })
    }

    /// Sweeps expired sessions from the registry.
    ///
    /// Called on a fixed period by the server's cleanup task.
    pub fn sweep_expired(&self) -> usize {
        self.registry.sweep()
    }

    /// The registry, exposed for observability.
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Best-effort role grant; the link stays authoritative on failure.
    async fn grant_role(
        &self,
        guild: &GuildId,
        user: &DiscordUserId,
    ) -> Result<(), PlatformError> {
        self.platform
            .add_role(guild, user, &self.verified_role)
            .await
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    user = %user,
                    guild = %guild,
                    "role grant failed after link; record kept"
                );
            })
    }

    /// Best-effort notification; the outcome is observed and dropped.
    async fn notify(
        &self,
        user: &DiscordUserId,
        notice: &LinkNotice,
    ) -> Result<(), PlatformError> {
        self.platform
            .send_dm(user, notice)
            .await
            .inspect_err(|e| debug!(error = %e, user = %user, "verification DM not delivered"))
    }
}

fn store_error(e: StoreError) -> VerificationError {
    VerificationError::Store {
        details: e.to_string(),
    }
}
