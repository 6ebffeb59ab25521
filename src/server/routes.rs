//! Axum route handlers for the Anne HTTP server.
//!
//! # Routes
//!
//! - `GET    /health`                   — Returns `{"status": "ok", "version": ..., "service": "anne"}`
//! - `POST   /api/tts`                  — `{text, personality?}` → streamed `audio/mpeg`
//! - `POST   /api/sessions`             — Create a personality session
//! - `GET    /api/sessions/:id`         — Session state + current system prompt
//! - `DELETE /api/sessions/:id`         — Drop a session
//! - `POST   /api/sessions/:id/role`    — `{role}` → apply role
//! - `POST   /api/sessions/:id/emotion` — `{emotion}` → apply emotion
//! - `POST   /api/sessions/:id/input`   — `{message}` → classify and re-render prompt

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::persona::{PersonalityConfig, PersonalityManager, PersonalitySnapshot, ProcessedInput};
use crate::tts::{SpeechSynthesizer, TtsError, TtsRequest};

type ApiError = (StatusCode, Json<Value>);

type SharedManager = Arc<Mutex<PersonalityManager>>;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;

pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Bounds on the live session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Creation fails with 503 once this many sessions are live.
    pub max_sessions: usize,
    /// Sessions untouched for this long are dropped by [`AppState::evict_idle`].
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
#[error("Session limit of {0} reached")]
pub struct SessionLimitReached(pub usize);

/// A live session and the last time a request touched it.
pub struct SessionEntry {
    pub manager: SharedManager,
    pub last_seen: Instant,
}

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Personality document shared by every session.
    pub personality: Arc<PersonalityConfig>,
    /// Live sessions keyed by session id.
    pub sessions: Arc<DashMap<String, SessionEntry>>,
    /// Speech backend for `/api/tts`.
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub limits: SessionLimits,
}

impl AppState {
    pub fn new(
        personality: Arc<PersonalityConfig>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            personality,
            sessions: Arc::new(DashMap::new()),
            synthesizer,
            limits: SessionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Create a session with a fresh manager over the shared document.
    ///
    /// A full table is swept for idle sessions before giving up.
    pub fn create_session(&self) -> Result<(String, SharedManager), SessionLimitReached> {
        if self.sessions.len() >= self.limits.max_sessions {
            self.evict_idle();
            if self.sessions.len() >= self.limits.max_sessions {
                return Err(SessionLimitReached(self.limits.max_sessions));
            }
        }

        let session_id = Uuid::new_v4().to_string();
        let mut manager = PersonalityManager::with_config(self.personality.clone());

        let sid = session_id.clone();
        manager.subscribe("session-trace", move |event| {
            tracing::info!(
                session_id = %sid,
                role = %event.role,
                emotion = %event.emotion,
                "personality changed"
            );
        });

        let manager = Arc::new(Mutex::new(manager));
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                manager: manager.clone(),
                last_seen: Instant::now(),
            },
        );
        Ok((session_id, manager))
    }

    /// Look up a session and mark it as used.
    pub fn session(&self, session_id: &str) -> Option<SharedManager> {
        self.sessions.get_mut(session_id).map(|mut entry| {
            entry.last_seen = Instant::now();
            entry.manager.clone()
        })
    }

    /// Drop sessions idle for longer than the configured timeout.
    /// Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        let timeout = self.limits.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_seen.elapsed() < timeout);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "expired idle sessions");
        }
        evicted
    }

    /// Periodically run [`evict_idle`](Self::evict_idle) in the background.
    pub fn spawn_idle_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let period = (state.limits.idle_timeout / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.evict_idle();
            }
        })
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/tts", post(tts_handler))
        .route("/api/sessions", post(create_session_handler))
        .route(
            "/api/sessions/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/api/sessions/:id/role", post(set_role_handler))
        .route("/api/sessions/:id/emotion", post(set_emotion_handler))
        .route("/api/sessions/:id/input", post(process_input_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub state: PersonalitySnapshot,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct EmotionUpdate {
    pub emotion: String,
}

#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub message: String,
}

fn session_view(session_id: &str, manager: &PersonalityManager) -> SessionView {
    SessionView {
        session_id: session_id.to_string(),
        state: manager.snapshot(),
        system_prompt: manager.generate_system_prompt(),
    }
}

fn session_not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": format!("Session '{}' not found", id)})),
    )
}

fn lookup(state: &AppState, id: &str) -> Result<SharedManager, ApiError> {
    state.session(id).ok_or_else(|| session_not_found(id))
}

/// Malformed or missing JSON bodies get the same `{error, details}` shape as
/// every other failure instead of axum's plain-text rejection.
fn invalid_body(rejection: JsonRejection) -> ApiError {
    let details = rejection.body_text();
    tracing::debug!(status = %rejection.status(), "Rejected request body: {}", details);
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": "Invalid request body", "details": details})),
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "anne",
    }))
}

/// POST /api/tts — forward text to the speech provider and stream audio back.
///
/// Errors use the body `{"error": ..., "details": ...}`.
async fn tts_handler(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let content_type = state.synthesizer.content_type().to_string();
    let audio = state
        .synthesizer
        .synthesize(&request)
        .await
        .map_err(tts_error_response)?;

    Ok((
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(audio),
    ))
}

fn tts_error_response(error: TtsError) -> ApiError {
    let status = match &error {
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        TtsError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        TtsError::Upstream { .. } | TtsError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(%status, "TTS request failed: {}", error);

    let mut body = serde_json::json!({"error": error.to_string()});
    if let Some(details) = error.details() {
        body["details"] = Value::String(details);
    }
    (status, Json(body))
}

/// POST /api/sessions — start a session; 503 when the table is full.
async fn create_session_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let (session_id, manager) = state.create_session().map_err(|e| {
        tracing::warn!("Refusing new session: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": e.to_string()})),
        )
    })?;
    let view = session_view(&session_id, &manager.lock());
    tracing::debug!(session_id = %session_id, "session created");
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/sessions/:id
async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let manager = lookup(&state, &id)?;
    let view = session_view(&id, &manager.lock());
    Ok(Json(view))
}

/// DELETE /api/sessions/:id
async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| session_not_found(&id))
}

/// POST /api/sessions/:id/role — unknown roles are ignored.
async fn set_role_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RoleUpdate>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let manager = lookup(&state, &id)?;
    let Json(body) = payload.map_err(invalid_body)?;
    let mut manager = manager.lock();
    manager.set_role(&body.role);
    Ok(Json(session_view(&id, &manager)))
}

/// POST /api/sessions/:id/emotion — unknown emotions are ignored.
async fn set_emotion_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EmotionUpdate>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let manager = lookup(&state, &id)?;
    let Json(body) = payload.map_err(invalid_body)?;
    let mut manager = manager.lock();
    manager.set_emotion(&body.emotion);
    Ok(Json(session_view(&id, &manager)))
}

/// POST /api/sessions/:id/input — run the classifiers over a user message.
async fn process_input_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<ProcessedInput>, ApiError> {
    let manager = lookup(&state, &id)?;
    let Json(body) = payload.map_err(invalid_body)?;
    let result = manager.lock().process_input(&body.message);
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::Request;
    use bytes::Bytes;
    use futures::StreamExt;
    use tower::ServiceExt;

    use crate::tts::AudioStream;

    /// Synthesizer that "speaks" by echoing the resolved voice id.
    struct EchoSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for EchoSynthesizer {
        async fn synthesize(&self, request: &TtsRequest) -> Result<AudioStream, TtsError> {
            request.validated_text()?;
            let chunks: Vec<Result<Bytes, TtsError>> = vec![
                Ok(Bytes::from_static(b"ID3")),
                Ok(Bytes::from(request.voice().voice_id.to_string())),
            ];
            Ok(futures::stream::iter(chunks).boxed())
        }
    }

    /// Synthesizer whose provider always rejects the request.
    struct FailingSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for FailingSynthesizer {
        async fn synthesize(&self, _request: &TtsRequest) -> Result<AudioStream, TtsError> {
            Err(TtsError::Upstream {
                status: 429,
                body: "quota exceeded".into(),
            })
        }
    }

    fn state_with(synth: Arc<dyn SpeechSynthesizer>) -> AppState {
        AppState::new(Arc::new(PersonalityConfig::fallback()), synth)
    }

    fn state() -> AppState {
        state_with(Arc::new(EchoSynthesizer))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_router(state());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "anne");
    }

    #[tokio::test]
    async fn test_tts_streams_audio() {
        let app = app_router(state());
        let response = app
            .oneshot(post_json(
                "/api/tts",
                serde_json::json!({"text": "Hello", "personality": "coder"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(&body_bytes(response).await[..], b"ID3MF3mGyEYCl7XYWbV9V6O");
    }

    #[tokio::test]
    async fn test_tts_rejects_empty_text() {
        let app = app_router(state());
        let response = app
            .oneshot(post_json("/api/tts", serde_json::json!({"text": "  "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Text is required");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_tts_upstream_failure_is_bad_gateway() {
        let app = app_router(state_with(Arc::new(FailingSynthesizer)));
        let response = app
            .oneshot(post_json("/api/tts", serde_json::json!({"text": "Hello"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "TTS provider returned 429");
        assert_eq!(json["details"], "quota exceeded");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = state();
        let app = app_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_json("/api/sessions", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["session_id"].as_str().unwrap().to_string();
        assert_eq!(created["state"]["role"], "companion");
        assert_eq!(created["state"]["emotion"], "calm");
        assert_eq!(created["state"]["initialized"], true);
        assert_eq!(state.sessions.len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/sessions/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.sessions.is_empty());

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/sessions/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_role_and_emotion_updates() {
        let state = state();
        let (id, manager) = state.create_session().unwrap();
        let app = app_router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/sessions/{}/role", id),
                serde_json::json!({"role": "strategist"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["state"]["role"], "strategist");
        assert_eq!(json["state"]["emotion"], "focused");

        // unknown values are ignored, not rejected
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/sessions/{}/emotion", id),
                serde_json::json!({"emotion": "furious"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["state"]["emotion"], "focused");

        let response = app
            .oneshot(post_json(
                &format!("/api/sessions/{}/emotion", id),
                serde_json::json!({"emotion": "curious"}),
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["state"]["emotion"], "curious");
        assert_eq!(manager.lock().current_emotion().as_str(), "curious");
    }

    #[tokio::test]
    async fn test_process_input_endpoint() {
        let state = state();
        let (id, _) = state.create_session().unwrap();
        let app = app_router(state);

        let response = app
            .oneshot(post_json(
                &format!("/api/sessions/{}/input", id),
                serde_json::json!({"message": "hello, can you help me debug this function"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["current_role"], "coder");
        assert_eq!(json["detected_emotion"], "calm");
        assert_eq!(json["suggestion"], "Hello! I'm Anne. How can I help you today?");
        assert!(json["system_prompt"]
            .as_str()
            .unwrap()
            .contains("Current role: coder"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = app_router(state());
        let response = app
            .oneshot(post_json(
                "/api/sessions/missing/input",
                serde_json::json!({"message": "hi"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_tts_missing_text_is_structured_error() {
        let app = app_router(state());
        let response = app
            .oneshot(post_json(
                "/api/tts",
                serde_json::json!({"personality": "coder"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid request body");
        assert!(json["details"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_structured_errors() {
        let state = state();
        let (id, _) = state.create_session().unwrap();
        let app = app_router(state);

        // not JSON at all
        let request = Request::builder()
            .method("POST")
            .uri("/api/tts")
            .header("Content-Type", "application/json")
            .body(Body::from("{ nope"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid request body");

        // no content type
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/sessions/{}/role", id))
            .body(Body::from(r#"{"role": "coder"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid request body");

        // wrong field name
        let response = app
            .oneshot(post_json(
                &format!("/api/sessions/{}/input", id),
                serde_json::json!({"text": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"].is_string());
    }

    #[tokio::test]
    async fn test_session_cap_returns_503() {
        let state = state().with_limits(SessionLimits {
            max_sessions: 2,
            idle_timeout: Duration::from_secs(3600),
        });
        let app = app_router(state.clone());

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(post_json("/api/sessions", serde_json::json!({})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(post_json("/api/sessions", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("limit of 2"));
        assert_eq!(state.sessions.len(), 2);
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let state = state().with_limits(SessionLimits {
            max_sessions: 1,
            idle_timeout: Duration::ZERO,
        });

        let (first, _) = state.create_session().unwrap();
        // the table is full, but the idle session makes room
        let (second, _) = state.create_session().unwrap();
        assert!(state.session(&first).is_none());
        assert_eq!(state.sessions.len(), 1);

        assert_eq!(state.evict_idle(), 1);
        assert!(state.session(&second).is_none());
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_active_sessions_survive_sweep() {
        let state = state();
        let (id, _) = state.create_session().unwrap();
        assert_eq!(state.evict_idle(), 0);
        assert!(state.session(&id).is_some());
    }
}
