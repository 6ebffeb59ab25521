//! Streaming text-to-speech provider client.
//!
//! Forwards text to the ElevenLabs streaming endpoint and hands the audio
//! back as a byte stream. Nothing is buffered: bytes flow to the caller as
//! the provider produces them.
//!
//! # Environment Variables
//!
//! - `ELEVENLABS_API_KEY` / `TTS_API_KEY` — provider API key (required)
//! - `TTS_BASE_URL` — provider base URL (defaults to `https://api.elevenlabs.io`)
//! - `TTS_MODEL_ID` — synthesis model (defaults to `eleven_multilingual_v2`)
//! - `TTS_TIMEOUT_SECS` — whole-request timeout (defaults to 60)

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::TtsError;
use super::voices::{resolve_voice, VoiceProfile};

/// Default provider base URL.
pub const ELEVENLABS_DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Longest text accepted in a single request.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Audio bytes as they arrive from the provider.
pub type AudioStream = BoxStream<'static, Result<Bytes, TtsError>>;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// `{text, personality}` as posted by the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default)]
    pub personality: Option<String>,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>, personality: Option<&str>) -> Self {
        Self {
            text: text.into(),
            personality: personality.map(str::to_string),
        }
    }

    /// Trimmed text, or the reason it cannot be spoken.
    pub fn validated_text(&self) -> Result<&str, TtsError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }
        let len = text.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(TtsError::TextTooLong {
                len,
                max: MAX_TEXT_CHARS,
            });
        }
        Ok(text)
    }

    pub fn voice(&self) -> &'static VoiceProfile {
        resolve_voice(self.personality.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Synthesizer seam
// ---------------------------------------------------------------------------

/// Anything that can turn text into streamed audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &TtsRequest) -> Result<AudioStream, TtsError>;

    /// MIME type of the produced audio.
    fn content_type(&self) -> &str {
        "audio/mpeg"
    }
}

// ---------------------------------------------------------------------------
// ElevenLabs client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TtsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_id: String,
    pub output_format: String,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: ELEVENLABS_DEFAULT_BASE_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            timeout_secs: 60,
        }
    }
}

impl TtsConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("ELEVENLABS_API_KEY")
                .or_else(|_| std::env::var("TTS_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("TTS_BASE_URL").unwrap_or(defaults.base_url),
            model_id: std::env::var("TTS_MODEL_ID").unwrap_or(defaults.model_id),
            output_format: std::env::var("TTS_OUTPUT_FORMAT").unwrap_or(defaults.output_format),
            timeout_secs: std::env::var("TTS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

pub struct ElevenLabsClient {
    config: TtsConfig,
    http: reqwest::Client,
}

impl ElevenLabsClient {
    pub fn new(config: TtsConfig) -> Result<Self, TtsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    /// Streaming endpoint for a voice.
    pub fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}/stream?output_format={}",
            self.config.base_url.trim_end_matches('/'),
            voice_id,
            self.config.output_format,
        )
    }

    pub fn build_request_body(&self, text: &str, voice: &VoiceProfile) -> Value {
        serde_json::json!({
            "text": text,
            "model_id": self.config.model_id,
            "voice_settings": voice.settings,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, request: &TtsRequest) -> Result<AudioStream, TtsError> {
        let text = request.validated_text()?;
        let api_key = self.config.api_key.as_deref().ok_or(TtsError::MissingApiKey)?;
        let voice = request.voice();

        log::debug!(
            "ElevenLabsClient.synthesize: personality={} voice={} chars={}",
            voice.personality,
            voice.voice_id,
            text.chars().count(),
        );

        let response = self
            .http
            .post(self.endpoint(voice.voice_id))
            .header("xi-api-key", api_key)
            .header("Accept", self.content_type())
            .json(&self.build_request_body(text, voice))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("TTS provider returned {}: {}", status, body);
            return Err(TtsError::Upstream {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TtsError::from))
            .boxed())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
