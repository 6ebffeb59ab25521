//! Personality configuration errors.

use thiserror::Error;

/// Errors that can occur while fetching or parsing a personality document.
///
/// These never reach callers of
/// [`PersonalityManager::initialize`](super::manager::PersonalityManager::initialize);
/// they are logged and replaced by the fallback configuration.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Transport-level failure fetching a remote document.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote document answered with a non-success status.
    #[error("HTTP status {status} fetching {url}")]
    Status { status: u16, url: String },
}
