//! Closed vocabularies of the personality state machine.
//!
//! Roles and emotions are fixed sets. Anything outside them fails to parse,
//! which is how the setters on
//! [`PersonalityManager`](super::manager::PersonalityManager) reject invalid
//! input without touching state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Role
// ============================================================================

/// Conversational persona that biases prompt tone and default emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Companion,
    Strategist,
    Coder,
    CreativePartner,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 4] = [
        Role::Companion,
        Role::Strategist,
        Role::Coder,
        Role::CreativePartner,
    ];

    /// Identifier used in configuration documents and over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Companion => "companion",
            Role::Strategist => "strategist",
            Role::Coder => "coder",
            Role::CreativePartner => "creative_partner",
        }
    }

    /// Emotion a role switch carries with it.
    pub fn default_emotion(&self) -> Emotion {
        match self {
            Role::Companion => Emotion::Caring,
            Role::Strategist => Emotion::Focused,
            Role::Coder => Emotion::Focused,
            Role::CreativePartner => Emotion::Inspired,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("role", s))
    }
}

// ============================================================================
// Emotion
// ============================================================================

/// Affective state layered onto the active role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Calm,
    Inspired,
    Focused,
    Caring,
    Curious,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Calm,
        Emotion::Inspired,
        Emotion::Focused,
        Emotion::Caring,
        Emotion::Curious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Calm => "calm",
            Emotion::Inspired => "inspired",
            Emotion::Focused => "focused",
            Emotion::Caring => "caring",
            Emotion::Curious => "curious",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("emotion", s))
    }
}

// ============================================================================
// Emotional cues
// ============================================================================

/// What the keyword classifier can read out of user text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalCue {
    Frustrated,
    Excited,
    Tired,
    Curious,
}

impl EmotionalCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionalCue::Frustrated => "frustrated",
            EmotionalCue::Excited => "excited",
            EmotionalCue::Tired => "tired",
            EmotionalCue::Curious => "curious",
        }
    }

    /// Emotion Anne answers a detected cue with.
    pub fn response_emotion(&self) -> Emotion {
        match self {
            EmotionalCue::Frustrated => Emotion::Caring,
            EmotionalCue::Excited => Emotion::Inspired,
            EmotionalCue::Tired => Emotion::Caring,
            EmotionalCue::Curious => Emotion::Curious,
        }
    }
}

impl fmt::Display for EmotionalCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of cue classification.
///
/// When no keyword matches, the classifier echoes the emotion the session
/// already holds, so the label space is the union of both vocabularies.
/// Serializes as a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DetectedEmotion {
    Cue(EmotionalCue),
    Held(Emotion),
}

impl DetectedEmotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedEmotion::Cue(cue) => cue.as_str(),
            DetectedEmotion::Held(emotion) => emotion.as_str(),
        }
    }

    pub fn cue(&self) -> Option<EmotionalCue> {
        match self {
            DetectedEmotion::Cue(cue) => Some(*cue),
            DetectedEmotion::Held(_) => None,
        }
    }
}

impl fmt::Display for DetectedEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Parse error
// ============================================================================

/// A string outside one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
