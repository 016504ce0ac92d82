//! Discord integration for rolelink.
//!
//! This crate covers both directions of the Discord boundary:
//!
//! - [`DiscordApi`]: outbound REST calls (channel messages, member role
//!   mutation, direct messages) and the [`ChatPlatform`] implementation
//!   the orchestrator commands
//! - [`interaction`]: inbound interaction payloads and the JSON responses
//!   the webhook route answers with
//! - [`signature`]: Ed25519 verification of interaction requests
//!
//! [`ChatPlatform`]: rolelink_verification::ChatPlatform

pub mod api;
pub mod error;
pub mod interaction;
pub mod signature;

pub use api::DiscordApi;
pub use error::DiscordError;
pub use interaction::{Interaction, VERIFY_BUTTON_ID};
pub use signature::{InteractionVerifier, SignatureError};
