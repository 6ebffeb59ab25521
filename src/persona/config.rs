//! Declarative personality document and its loader.
//!
//! The document is read once at startup and shared read-only between
//! sessions. Every field is optional: prompt rendering degrades to named
//! defaults for anything that is missing, so a half-written file is still
//! usable.
//!
//! # Example (JSON)
//!
//! ```json
//! {
//!   "name": "Anne",
//!   "core_essence": { "description": "A warm, curious companion." },
//!   "roles": {
//!     "coder": { "description": "A patient pair programmer", "tone_modifier": "precise_and_encouraging" }
//!   },
//!   "emotional_states": {
//!     "focused": { "description": "Locked in on the problem", "response_style": "clear_and_structured" }
//!   },
//!   "core_directives": ["Be honest", "Be kind"],
//!   "response_patterns": { "greeting": "Hi! Anne here." }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::PersonaError;

/// Name used when no document could be loaded.
pub const FALLBACK_NAME: &str = "Anne";

/// Essence used when no document could be loaded.
pub const FALLBACK_ESSENCE: &str =
    "A thoughtful and caring AI companion who listens closely and responds with warmth.";

// ============================================================================
// Document types
// ============================================================================

/// Per-role descriptive text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tone_modifier: Option<String>,
}

/// Per-emotion descriptive text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub response_style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreEssence {
    #[serde(default)]
    pub description: Option<String>,
}

/// The personality document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalityConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub core_essence: Option<CoreEssence>,
    #[serde(default)]
    pub roles: HashMap<String, RoleProfile>,
    #[serde(default)]
    pub emotional_states: HashMap<String, EmotionProfile>,
    #[serde(default)]
    pub core_directives: Vec<String>,
    #[serde(default)]
    pub response_patterns: HashMap<String, String>,
}

impl PersonalityConfig {
    /// Minimal document applied when loading fails: a name and an essence.
    pub fn fallback() -> Self {
        Self {
            name: Some(FALLBACK_NAME.to_string()),
            core_essence: Some(CoreEssence {
                description: Some(FALLBACK_ESSENCE.to_string()),
            }),
            ..Default::default()
        }
    }

    /// Display name, or [`FALLBACK_NAME`].
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(FALLBACK_NAME)
    }

    /// Essence description, or [`FALLBACK_ESSENCE`].
    pub fn essence(&self) -> &str {
        self.core_essence
            .as_ref()
            .and_then(|e| e.description.as_deref())
            .unwrap_or(FALLBACK_ESSENCE)
    }

    pub fn role(&self, id: &str) -> Option<&RoleProfile> {
        self.roles.get(id)
    }

    pub fn emotional_state(&self, id: &str) -> Option<&EmotionProfile> {
        self.emotional_states.get(id)
    }

    /// Canned response for a pattern id (`greeting`, `thinking`, ...).
    pub fn response_pattern(&self, id: &str) -> Option<&str> {
        self.response_patterns.get(id).map(String::as_str)
    }

    /// Parse a document, picking YAML or JSON from the path extension.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, PersonaError> {
        match format {
            DocumentFormat::Json => Ok(serde_json::from_str(text)?),
            DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Serialization format of a personality document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` is YAML, anything else JSON.
    pub fn from_location(location: &str) -> Self {
        let lower = location.to_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or_default();
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Json
        }
    }
}

/// Where the personality document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Url(String),
}

impl ConfigSource {
    /// `http://` and `https://` locations are URLs, everything else a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ConfigSource::Url(trimmed.to_string())
        } else {
            ConfigSource::File(PathBuf::from(trimmed))
        }
    }

    fn format(&self) -> DocumentFormat {
        match self {
            ConfigSource::File(path) => DocumentFormat::from_location(&path.to_string_lossy()),
            ConfigSource::Url(url) => DocumentFormat::from_location(url),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Url(url) => f.write_str(url),
        }
    }
}

/// Fetch and parse a personality document.
pub async fn load_personality_config(
    source: &ConfigSource,
) -> Result<PersonalityConfig, PersonaError> {
    let text = match source {
        ConfigSource::File(path) => read_file(path).await?,
        ConfigSource::Url(url) => fetch_url(url).await?,
    };
    PersonalityConfig::parse(&text, source.format())
}

/// Load a document, substituting [`PersonalityConfig::fallback`] on any
/// failure.
pub async fn load_or_fallback(source: &ConfigSource) -> PersonalityConfig {
    match load_personality_config(source).await {
        Ok(config) => {
            log::debug!(
                "Loaded personality '{}' from {} ({} roles, {} emotional states)",
                config.display_name(),
                source,
                config.roles.len(),
                config.emotional_states.len(),
            );
            config
        }
        Err(e) => {
            log::warn!(
                "Failed to load personality config from {}: {}. Using fallback.",
                source,
                e
            );
            PersonalityConfig::fallback()
        }
    }
}

async fn read_file(path: &Path) -> Result<String, PersonaError> {
    Ok(tokio::fs::read_to_string(path).await?)
}

async fn fetch_url(url: &str) -> Result<String, PersonaError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PersonaError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

// ============================================================================
// Tests
// ============================================================================
