//! Persisted link records and the store contract.
//!
//! A link record is the unique bidirectional association between a Discord
//! user and a Roblox account. Records are created exactly once per
//! successful verification and never mutated or deleted by this subsystem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolelink_core::{DiscordUserId, RobloxUserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A persisted Discord ↔ Roblox account link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    discord_user_id: DiscordUserId,
    roblox_user_id: RobloxUserId,
    roblox_username: String,
    points: i64,
    linked_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Creates a fresh record for a just-verified link.
    ///
    /// The points accumulator starts at zero and `linked_at` is now.
    #[must_use]
    pub fn new(
        discord_user_id: DiscordUserId,
        roblox_user_id: RobloxUserId,
        roblox_username: String,
    ) -> Self {
        Self {
            discord_user_id,
            roblox_user_id,
            roblox_username,
            points: 0,
            linked_at: Utc::now(),
        }
    }

    /// Reconstitutes a record from storage.
    #[must_use]
    pub fn with_all_fields(
        discord_user_id: DiscordUserId,
        roblox_user_id: RobloxUserId,
        roblox_username: String,
        points: i64,
        linked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            discord_user_id,
            roblox_user_id,
            roblox_username,
            points,
            linked_at,
        }
    }

    /// The linked Discord user.
    #[must_use]
    pub fn discord_user_id(&self) -> &DiscordUserId {
        &self.discord_user_id
    }

    /// The linked Roblox account's subject identifier.
    #[must_use]
    pub fn roblox_user_id(&self) -> &RobloxUserId {
        &self.roblox_user_id
    }

    /// The Roblox display name captured at link time.
    #[must_use]
    pub fn roblox_username(&self) -> &str {
        &self.roblox_username
    }

    /// Accumulated points for this member.
    #[must_use]
    pub fn points(&self) -> i64 {
        self.points
    }

    /// When the link was established.
    #[must_use]
    pub fn linked_at(&self) -> DateTime<Utc> {
        self.linked_at
    }
}

/// Errors from link-record storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An insert collided with an existing record's unique column.
    Conflict,
    /// The storage backend failed.
    Backend { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict => write!(f, "link record conflicts with an existing link"),
            Self::Backend { details } => write!(f, "link store backend error: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Contract for the persisted link-record store.
///
/// The store enforces uniqueness of both id columns with its own constraint
/// mechanism; [`insert`](LinkStore::insert) reports a violation as
/// [`StoreError::Conflict`] rather than overwriting. That storage-level
/// guarantee, not the orchestrator's earlier read, is what arbitrates two
/// callbacks racing to link the same Roblox account.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Looks up a record by the Discord side of the link.
    async fn find_by_discord_id(
        &self,
        id: &DiscordUserId,
    ) -> Result<Option<LinkRecord>, StoreError>;

    /// Looks up a record by the Roblox side of the link.
    async fn find_by_roblox_id(&self, id: &RobloxUserId)
    -> Result<Option<LinkRecord>, StoreError>;

    /// Inserts a new record, failing with [`StoreError::Conflict`] when
    /// either id column is already linked.
    async fn insert(&self, record: &LinkRecord) -> Result<(), StoreError>;
}
