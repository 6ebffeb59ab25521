//! HTTP server for the companion widget.
//!
//! # Endpoints
//!
//! - `GET  /health`                — Liveness probe
//! - `POST /api/tts`               — Text-to-speech proxy
//! - `/api/sessions[/:id[/...]]`   — Per-session personality state

pub mod routes;

pub use routes::{
    app_router, AppState, SessionEntry, SessionLimitReached, SessionLimits, DEFAULT_MAX_SESSIONS,
    DEFAULT_SESSION_IDLE_TIMEOUT,
};
