//! # Anne
//!
//! Backend for the Anne/Bella virtual-companion widget.
//!
//! - [`persona`] — personality state manager: role/emotion tracking, keyword
//!   heuristics over user input, and system prompt rendering.
//! - [`events`] — listener registry notified on every personality change.
//! - [`tts`] — text-to-speech proxy with a fixed voice table and a streaming
//!   provider client.
//! - [`server`] — axum application exposing sessions and the TTS proxy.

pub mod config;
pub mod events;
pub mod persona;
pub mod server;
pub mod tts;

pub use config::AppConfig;
pub use persona::{Emotion, PersonalityConfig, PersonalityManager, ProcessedInput, Role};
pub use tts::{ElevenLabsClient, SpeechSynthesizer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
