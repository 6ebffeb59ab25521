//! Server configuration.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `BIND_ADDR` — listen address (default: `0.0.0.0`)
//! - `ANNE_PERSONALITY_CONFIG` — personality document path or `http(s)://` URL
//!   (default: `personality.json`)
//! - `ANNE_MAX_SESSIONS` — live session cap (default: 1000)
//! - `ANNE_SESSION_IDLE_SECS` — idle session expiry in seconds (default: 1800)
//! - `ELEVENLABS_API_KEY`, `TTS_BASE_URL`, `TTS_MODEL_ID`, `TTS_OUTPUT_FORMAT`,
//!   `TTS_TIMEOUT_SECS` — see [`TtsConfig`]
//! - `RUST_LOG` — tracing filter (default: `info,anne=debug`)

use std::str::FromStr;
use std::time::Duration;

use crate::persona::ConfigSource;
use crate::server::SessionLimits;
use crate::tts::TtsConfig;

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

pub const DEFAULT_PERSONALITY_PATH: &str = "personality.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub personality_source: ConfigSource,
    pub sessions: SessionLimits,
    pub tts: TtsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            personality_source: ConfigSource::parse(DEFAULT_PERSONALITY_PATH),
            sessions: SessionLimits::default(),
            tts: TtsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok()).with_tts(TtsConfig::from_env())
    }

    /// Build from an arbitrary key lookup. Malformed values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let idle_secs = parse_or(
            &lookup,
            "ANNE_SESSION_IDLE_SECS",
            defaults.sessions.idle_timeout.as_secs(),
        );
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(&lookup, "PORT", defaults.port),
            personality_source: lookup("ANNE_PERSONALITY_CONFIG")
                .map(|s| ConfigSource::parse(&s))
                .unwrap_or(defaults.personality_source),
            sessions: SessionLimits {
                max_sessions: parse_or(
                    &lookup,
                    "ANNE_MAX_SESSIONS",
                    defaults.sessions.max_sessions,
                ),
                idle_timeout: Duration::from_secs(idle_secs),
            },
            tts: defaults.tts,
        }
    }

    pub fn with_tts(mut self, tts: TtsConfig) -> Self {
        self.tts = tts;
        self
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid {} '{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}
