//! Anne HTTP server binary.
//!
//! Loads the personality document, wires the TTS client, and serves the
//! session and TTS endpoints.
//!
//! # Environment Variables
//!
//! See [`anne::config`]. `RUST_LOG` overrides the default `info,anne=debug`
//! filter.
//!
//! # Usage
//!
//! ```bash
//! ELEVENLABS_API_KEY=... ANNE_PERSONALITY_CONFIG=personality.json cargo run --bin server
//! ```

use std::sync::Arc;

use anne::persona::load_or_fallback;
use anne::server::{app_router, AppState};
use anne::{AppConfig, ElevenLabsClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,anne=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();

    let personality = load_or_fallback(&config.personality_source).await;
    tracing::info!(
        "Personality '{}' loaded from {}",
        personality.display_name(),
        config.personality_source
    );

    if config.tts.api_key.is_none() {
        tracing::warn!("ELEVENLABS_API_KEY not set; /api/tts will return 500");
    }
    let synthesizer = ElevenLabsClient::new(config.tts.clone())?;

    let state = AppState::new(Arc::new(personality), Arc::new(synthesizer))
        .with_limits(config.sessions);
    let sweeper = state.spawn_idle_sweeper();
    tracing::info!(
        "Sessions capped at {}, idle expiry {}s",
        config.sessions.max_sessions,
        config.sessions.idle_timeout.as_secs()
    );
    let app = app_router(state);

    let bind_addr = config.socket_addr();
    tracing::info!("anne server v{} starting on {}", anne::VERSION, bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health        — liveness probe");
    tracing::info!("  POST /api/tts       — text-to-speech proxy");
    tracing::info!("  POST /api/sessions  — start a personality session");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("anne server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
