//! Personality system — role/emotion state, input heuristics, prompt rendering.
//!
//! # Architecture
//!
//! ```text
//! PersonalityConfig (JSON/YAML document, loaded once, shared via Arc)
//!   ↓
//! PersonalityManager { role, emotion, initialized, listeners }
//!   ↓  process_input(text)
//! classifier: emotional cue → emotion, role keywords → role (+ derived emotion)
//!   ↓
//! prompt: render_system_prompt(config, role, emotion)
//! ```
//!
//! Loading never fails from the caller's point of view: a missing or broken
//! document is replaced by [`PersonalityConfig::fallback`].

pub mod classifier;
pub mod config;
pub mod error;
pub mod manager;
pub mod prompt;
pub mod types;

// Re-exports
pub use classifier::{detect_emotional_cue, detect_role, detect_suggestion, SuggestionKind};
pub use config::{
    load_or_fallback, load_personality_config, ConfigSource, CoreEssence, DocumentFormat,
    EmotionProfile, PersonalityConfig, RoleProfile,
};
pub use error::PersonaError;
pub use manager::{PersonalityManager, PersonalitySnapshot, ProcessedInput};
pub use prompt::render_system_prompt;
pub use types::{DetectedEmotion, Emotion, EmotionalCue, Role, UnknownVariant};
