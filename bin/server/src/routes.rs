//! HTTP routes: health, the OAuth2 callback, and the interactions webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rolelink_discord::interaction::{self, Interaction, VERIFY_BUTTON_ID};
use rolelink_discord::signature::InteractionVerifier;
use rolelink_verification::{StartOutcome, VerificationError, Verifier};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::pages;

/// Shared application state.
pub struct AppState {
    /// The verification orchestrator.
    pub verifier: Arc<Verifier>,
    /// Verifier for interaction request signatures.
    pub interaction_verifier: InteractionVerifier,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/callback", get(callback))
        .route("/interactions", post(interactions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> &'static str {
    "🤖 rolelink verification server is running!"
}

/// Query parameters for the OAuth2 callback.
///
/// Both fields are optional at the extraction layer so a missing parameter
/// reaches the orchestrator's presence check and renders the invalid-params
/// page instead of a framework 400.
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

/// Handles the OAuth2 redirect from Roblox.
///
/// Every outcome is a complete HTML page with status 200; failures also
/// leave a server-side log line.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Html<String> {
    match state
        .verifier
        .complete(query.code.as_deref(), query.state.as_deref())
        .await
    {
        Ok(link) => {
            info!(
                user = %link.user_id,
                roblox = %link.roblox_user_id,
                role_granted = link.role_granted,
                "verification completed"
            );
            pages::success()
        }
        Err(VerificationError::InvalidRequest) => pages::invalid_params(),
        Err(VerificationError::SessionExpired) => pages::session_expired(),
        Err(VerificationError::AlreadyLinked) => pages::already_linked(),
        Err(e) => {
            error!(error = %e, "verification callback failed");
            pages::verification_failed()
        }
    }
}

/// Handles Discord interaction deliveries.
///
/// Verifies the Ed25519 signature over the raw body before parsing; Discord
/// requires unauthenticated requests to be answered with 401.
async fn interactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("x-signature-ed25519")
        .and_then(|v| v.to_str().ok());
    let timestamp = headers
        .get("x-signature-timestamp")
        .and_then(|v| v.to_str().ok());

    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        return (StatusCode::UNAUTHORIZED, "missing request signature").into_response();
    };

    if state
        .interaction_verifier
        .verify(signature, timestamp, &body)
        .is_err()
    {
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    if interaction.is_ping() {
        return Json(interaction::pong()).into_response();
    }

    match interaction.component_custom_id() {
        Some(VERIFY_BUTTON_ID) => verify_clicked(&state, &interaction).await.into_response(),
        _ => Json(interaction::ephemeral_text(
            "This interaction is not supported.",
        ))
        .into_response(),
    }
}

/// Dispatches a verify-button click to the orchestrator.
async fn verify_clicked(state: &AppState, interaction: &Interaction) -> Json<serde_json::Value> {
    let (Some(invoker), Some(guild_id)) = (interaction.invoker(), interaction.guild_id.clone())
    else {
        return Json(interaction::ephemeral_text(
            "This button only works inside a server.",
        ));
    };

    match state.verifier.begin(invoker.id.clone(), guild_id).await {
        Ok(StartOutcome::AlreadyVerified) => {
            Json(interaction::ephemeral_text("✅ You are already verified!"))
        }
        Ok(StartOutcome::Redirect { authorization_url }) => {
            Json(interaction::ephemeral_verify_link(&authorization_url))
        }
        Err(e) => {
            error!(error = %e, "failed to start verification");
            Json(interaction::ephemeral_text(
                "Something went wrong. Please try again later.",
            ))
        }
    }
}
