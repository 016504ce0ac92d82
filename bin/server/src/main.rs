mod config;
mod db;
mod pages;
mod roblox;
mod routes;

use chrono::Duration;
use rolelink_core::{ChannelId, RoleId};
use rolelink_discord::api::DiscordApi;
use rolelink_discord::interaction::VERIFY_BUTTON_ID;
use rolelink_discord::signature::InteractionVerifier;
use rolelink_verification::{ChatPlatform, SessionRegistry, Verifier};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::db::PgLinkStore;
use crate::roblox::RobloxOAuth;
use crate::routes::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    let store = Arc::new(PgLinkStore::new(db_pool));
    let provider =
        Arc::new(RobloxOAuth::new(config.roblox.clone()).expect("invalid Roblox configuration"));
    let discord = Arc::new(DiscordApi::new(config.discord.bot_token.clone()));
    let platform: Arc<dyn ChatPlatform> = discord.clone();

    let registry = SessionRegistry::new(Duration::seconds(config.session.ttl_seconds));
    let verifier = Arc::new(Verifier::new(
        registry,
        store,
        provider,
        platform,
        RoleId::new(config.discord.verified_role_id.clone()),
    ));

    // Spawn periodic session sweep task
    let sweep_verifier = verifier.clone();
    let sweep_interval_secs = config.session.sweep_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(sweep_interval_secs));
        loop {
            interval.tick().await;
            let removed = sweep_verifier.sweep_expired();
            if removed > 0 {
                tracing::debug!(removed_sessions = removed, "Periodic session sweep");
            }
        }
    });

    // Post the verification prompt to the configured channel. Non-fatal: a
    // prompt from a previous run may already be in place.
    let channel = ChannelId::new(config.discord.verification_channel_id.clone());
    let prompt = DiscordApi::verification_prompt(VERIFY_BUTTON_ID);
    match discord.post_message(&channel, &prompt).await {
        Ok(()) => tracing::info!(channel = %channel, "Verification prompt posted"),
        Err(e) => {
            tracing::warn!(error = %e, channel = %channel, "Failed to post verification prompt");
        }
    }

    let interaction_verifier =
        InteractionVerifier::new(&config.discord.public_key).expect("invalid Discord public key");

    let app_state = Arc::new(AppState {
        verifier,
        interaction_verifier,
    });
    let app = routes::router(app_state);

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
