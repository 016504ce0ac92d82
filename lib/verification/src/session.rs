//! Pending-verification sessions and the in-memory registry that owns them.
//!
//! A session is created when a user clicks the verify button and is consumed
//! exactly once by the OAuth2 callback. The token doubles as the OAuth2
//! `state` parameter, so it is generated unguessable and treated as a bearer
//! credential: single-use, time-bounded, never logged.

use chrono::{DateTime, Duration, Utc};
use rolelink_core::{DiscordUserId, GuildId};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use ulid::Ulid;

/// Opaque single-use token binding an OAuth2 round-trip to a pending session.
///
/// The string form joins a fresh ULID (80 bits of randomness plus millisecond
/// ordering) with the requesting user's snowflake, so two sessions can never
/// collide even when one user restarts the flow within the same millisecond.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate(user_id: &DiscordUserId) -> Self {
        Self(format!("{}-{}", Ulid::new(), user_id.as_str()))
    }

    /// Returns the token string for use as the OAuth2 `state` parameter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Redacted: tokens are bearer credentials and must not reach logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(..)")
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A verification flow that has been started but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSession {
    /// The requesting Discord user.
    pub user_id: DiscordUserId,
    /// The guild the flow was started from; scopes the later role grant.
    pub guild_id: GuildId,
    /// Creation time, the basis for expiry.
    pub created_at: DateTime<Utc>,
}

/// In-memory store of pending verification sessions.
///
/// The registry is the only mutable shared state in the process. It is a
/// single owned instance handed to the orchestrator, not ambient global
/// state. All operations take `&self` and hold the internal mutex only for
/// the map operation itself; nothing awaits under the lock.
pub struct SessionRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<SessionToken, PendingSession>>,
}

impl SessionRegistry {
    /// Creates a registry whose sessions expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a new pending session and returns its token.
    ///
    /// No per-user uniqueness is imposed: a user restarting the flow gets a
    /// second live session under a fresh token, and the abandoned one ages
    /// out through [`sweep`](Self::sweep).
    pub fn create(&self, user_id: DiscordUserId, guild_id: GuildId) -> SessionToken {
        let token = SessionToken::generate(&user_id);
        let session = PendingSession {
            user_id,
            guild_id,
            created_at: Utc::now(),
        };
        self.sessions
            .lock()
            .expect("session registry lock poisoned")
            .insert(token.clone(), session);
        token
    }

    /// Atomically removes and returns the session for `token`.
    ///
    /// Returns `None` for unknown, already-consumed, or aged-out tokens. The
    /// age check happens here rather than relying on sweep cadence, so an
    /// expired-but-unswept token is already unusable. Remove-and-return is a
    /// single map operation under the lock, which is what guarantees a token
    /// exchanges at most once under concurrent callback delivery.
    pub fn consume(&self, token: &str) -> Option<PendingSession> {
        let session = self
            .sessions
            .lock()
            .expect("session registry lock poisoned")
            .remove(token)?;
        if Utc::now() - session.created_at > self.ttl {
            return None;
        }
        Some(session)
    }

    /// Removes every session older than the registry TTL.
    ///
    /// Returns the number of sessions removed. Sweeping is advisory hygiene
    /// bounding memory growth from abandoned sessions; `consume` alone is
    /// responsible for correctness.
    pub fn sweep(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut sessions = self
            .sessions
            .lock()
            .expect("session registry lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at >= cutoff);
        before - sessions.len()
    }

    /// Number of live (not yet consumed or swept) sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry lock poisoned")
            .len()
    }

    /// Returns true when no sessions are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shifts a session's creation time into the past.
    #[cfg(test)]
    pub(crate) fn backdate(&self, token: &str, by: Duration) {
        let mut sessions = self
            .sessions
            .lock()
            .expect("session registry lock poisoned");
        if let Some(session) = sessions.get_mut(token) {
            session.created_at -= by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Duration::minutes(5))
    }

    fn user() -> DiscordUserId {
        DiscordUserId::new("100000000000000001")
    }

    fn guild() -> GuildId {
        GuildId::new("200000000000000001")
    }

    #[test]
    fn consume_returns_session_exactly_once() {
        let registry = registry();
        let token = registry.create(user(), guild());

        let session = registry.consume(token.as_str()).expect("first consume");
        assert_eq!(session.user_id, user());
        assert_eq!(session.guild_id, guild());

        assert!(registry.consume(token.as_str()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn consume_unknown_token_is_not_found() {
        let registry = registry();
        assert!(registry.consume("no-such-token").is_none());
    }

    #[test]
    fn tokens_are_unique_per_creation() {
        let registry = registry();
        let first = registry.create(user(), guild());
        let second = registry.create(user(), guild());

        assert_ne!(first.as_str(), second.as_str());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn token_embeds_requesting_user() {
        let registry = registry();
        let token = registry.create(user(), guild());
        assert!(token.as_str().ends_with(user().as_str()));
    }

    #[test]
    fn token_debug_is_redacted() {
        let registry = registry();
        let token = registry.create(user(), guild());
        assert_eq!(format!("{token:?}"), "SessionToken(..)");
    }

    #[test]
    fn sweep_removes_only_aged_out_sessions() {
        let registry = registry();
        let stale = registry.create(user(), guild());
        let fresh = registry.create(DiscordUserId::new("100000000000000002"), guild());

        registry.backdate(stale.as_str(), Duration::minutes(6));

        assert_eq!(registry.sweep(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.consume(fresh.as_str()).is_some());
    }

    #[test]
    fn sweep_on_fresh_registry_removes_nothing() {
        let registry = registry();
        registry.create(user(), guild());
        assert_eq!(registry.sweep(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn consume_treats_aged_out_session_as_not_found() {
        let registry = registry();
        let token = registry.create(user(), guild());
        registry.backdate(token.as_str(), Duration::minutes(6));

        assert!(registry.consume(token.as_str()).is_none());
        // The aged-out entry is gone, not resurrectable.
        assert!(registry.is_empty());
    }

    #[test]
    fn restarting_user_keeps_both_sessions_live() {
        let registry = registry();
        let abandoned = registry.create(user(), guild());
        let current = registry.create(user(), guild());

        // Stale tokens are abandoned, not invalidated by the restart.
        assert!(registry.consume(current.as_str()).is_some());
        assert!(registry.consume(abandoned.as_str()).is_some());
    }
}
