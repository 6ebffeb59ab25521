//! System prompt rendering — personality state → instruction text.
//!
//! Rendering is infallible. Any field missing from the personality document
//! is replaced by a named default so the downstream model always receives a
//! complete prompt.
//!
//! # Example Output
//!
//! ```text
//! You are Anne. A warm, curious companion.
//!
//! Current role: coder - A patient pair programmer
//! Current emotional state: focused - Locked in on the problem
//!
//! Tone: precise_and_encouraging
//! Response style: clear_and_structured
//!
//! Core directives:
//! • Be honest
//! • Be kind
//!
//! Respond naturally as Anne, staying true to your current role and emotional state.
//! ```

use super::config::PersonalityConfig;
use super::types::{Emotion, Role};

/// Prompt returned before any configuration has been applied.
pub const UNINITIALIZED_PROMPT: &str = "You are Anne, a thoughtful and caring AI companion.";

pub const DEFAULT_TONE_MODIFIER: &str = "gentle_and_thoughtful";

pub const DEFAULT_RESPONSE_STYLE: &str = "measured_and_thoughtful";

pub const DEFAULT_DIRECTIVE: &str = "Be helpful and thoughtful";

const BULLET: &str = "• ";

/// Bullet list of the configured directives, or the single default bullet.
pub fn format_directives(directives: &[String]) -> String {
    if directives.is_empty() {
        return format!("{BULLET}{DEFAULT_DIRECTIVE}");
    }
    directives
        .iter()
        .map(|d| format!("{BULLET}{d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the system prompt for `role` and `emotion` under `config`.
pub fn render_system_prompt(config: &PersonalityConfig, role: Role, emotion: Emotion) -> String {
    let name = config.display_name();
    let role_profile = config.role(role.as_str());
    let emotion_profile = config.emotional_state(emotion.as_str());

    let role_description = role_profile
        .and_then(|r| r.description.as_deref())
        .unwrap_or(role.as_str());
    let tone = role_profile
        .and_then(|r| r.tone_modifier.as_deref())
        .unwrap_or(DEFAULT_TONE_MODIFIER);
    let emotion_description = emotion_profile
        .and_then(|e| e.description.as_deref())
        .unwrap_or(emotion.as_str());
    let style = emotion_profile
        .and_then(|e| e.response_style.as_deref())
        .unwrap_or(DEFAULT_RESPONSE_STYLE);

    format!(
        "You are {name}. {essence}\n\
         \n\
         Current role: {role} - {role_description}\n\
         Current emotional state: {emotion} - {emotion_description}\n\
         \n\
         Tone: {tone}\n\
         Response style: {style}\n\
         \n\
         Core directives:\n\
         {directives}\n\
         \n\
         Respond naturally as {name}, staying true to your current role and emotional state.",
        essence = config.essence(),
        directives = format_directives(&config.core_directives),
    )
}
