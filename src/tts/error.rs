//! Text-to-speech proxy errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TtsError {
    /// Nothing to speak.
    #[error("Text is required")]
    EmptyText,

    /// Text exceeds the provider's per-request limit.
    #[error("Text is too long: {len} characters (max {max})")]
    TextTooLong { len: usize, max: usize },

    /// No provider API key configured.
    #[error("TTS API key not configured. Set ELEVENLABS_API_KEY.")]
    MissingApiKey,

    /// Transport-level failure talking to the provider.
    #[error("TTS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("TTS provider returned {status}")]
    Upstream { status: u16, body: String },
}

impl TtsError {
    /// Whether the caller, rather than the provider or deployment, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TtsError::EmptyText | TtsError::TextTooLong { .. })
    }

    /// Extra detail for the `{error, details}` response body.
    pub fn details(&self) -> Option<String> {
        match self {
            TtsError::Upstream { body, .. } if !body.is_empty() => Some(body.clone()),
            TtsError::Http(e) => std::error::Error::source(e).map(|s| s.to_string()),
            _ => None,
        }
    }
}
