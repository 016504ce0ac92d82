//! Core domain types for the rolelink verification service.
//!
//! This crate provides the strongly-typed identifiers shared across the
//! workspace and the error-handling foundation.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ChannelId, DiscordUserId, GuildId, RobloxUserId, RoleId};
