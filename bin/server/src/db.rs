//! PostgreSQL-backed link-record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolelink_core::{DiscordUserId, RobloxUserId};
use rolelink_verification::{LinkRecord, LinkStore, StoreError};
use sqlx::{FromRow, PgPool};

/// Row type for link queries.
#[derive(FromRow)]
struct LinkRow {
    discord_user_id: String,
    roblox_user_id: String,
    roblox_username: String,
    points: i64,
    linked_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_record(self) -> LinkRecord {
        LinkRecord::with_all_fields(
            DiscordUserId::new(self.discord_user_id),
            RobloxUserId::new(self.roblox_user_id),
            self.roblox_username,
            self.points,
            self.linked_at,
        )
    }
}

/// Link-record store over a PostgreSQL pool.
///
/// The `links` table carries unique constraints on both id columns, so
/// `insert` is a conditional insert at the storage layer; a violation
/// surfaces as [`StoreError::Conflict`].
pub struct PgLinkStore {
    pool: PgPool,
}

impl PgLinkStore {
    /// Creates a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn find_by_discord_id(
        &self,
        id: &DiscordUserId,
    ) -> Result<Option<LinkRecord>, StoreError> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"
            SELECT discord_user_id, roblox_user_id, roblox_username, points, linked_at
            FROM links
            WHERE discord_user_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(LinkRow::into_record))
    }

    async fn find_by_roblox_id(
        &self,
        id: &RobloxUserId,
    ) -> Result<Option<LinkRecord>, StoreError> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"
            SELECT discord_user_id, roblox_user_id, roblox_username, points, linked_at
            FROM links
            WHERE roblox_user_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(LinkRow::into_record))
    }

    async fn insert(&self, record: &LinkRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO links (discord_user_id, roblox_user_id, roblox_username, points, linked_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.discord_user_id().as_str())
        .bind(record.roblox_user_id().as_str())
        .bind(record.roblox_username())
        .bind(record.points())
        .bind(record.linked_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            _ => backend(e),
        })?;

        Ok(())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend {
        details: e.to_string(),
    }
}
