//! Personality label → provider voice.
//!
//! Labels share their vocabulary with [`Role`](crate::persona::Role) ids but
//! are chosen by the client independently of any session's role state.
//! Unknown labels resolve to the companion voice.

use serde::{Deserialize, Serialize};

/// Provider-side voice tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    /// Personality label this voice answers to.
    pub personality: &'static str,
    /// Provider voice identifier.
    pub voice_id: &'static str,
    pub settings: VoiceSettings,
}

pub const DEFAULT_PERSONALITY: &str = "companion";

pub const VOICE_PROFILES: &[VoiceProfile] = &[
    VoiceProfile {
        personality: "companion",
        voice_id: "EXAVITQu4vr4xnSDxMaL",
        settings: VoiceSettings {
            stability: 0.55,
            similarity_boost: 0.75,
            style: 0.35,
            use_speaker_boost: true,
        },
    },
    VoiceProfile {
        personality: "strategist",
        voice_id: "21m00Tcm4TLvDq8ikWAM",
        settings: VoiceSettings {
            stability: 0.75,
            similarity_boost: 0.8,
            style: 0.1,
            use_speaker_boost: true,
        },
    },
    VoiceProfile {
        personality: "coder",
        voice_id: "MF3mGyEYCl7XYWbV9V6O",
        settings: VoiceSettings {
            stability: 0.7,
            similarity_boost: 0.7,
            style: 0.05,
            use_speaker_boost: false,
        },
    },
    VoiceProfile {
        personality: "creative_partner",
        voice_id: "AZnzlk1XvdvUeBnXmlld",
        settings: VoiceSettings {
            stability: 0.4,
            similarity_boost: 0.75,
            style: 0.6,
            use_speaker_boost: true,
        },
    },
];

/// Exact-label lookup.
pub fn find_voice(personality: &str) -> Option<&'static VoiceProfile> {
    let label = personality.trim().to_lowercase();
    VOICE_PROFILES.iter().find(|v| v.personality == label)
}

/// Voice used when a request names no known personality.
pub fn default_voice() -> &'static VoiceProfile {
    find_voice(DEFAULT_PERSONALITY).unwrap_or(&VOICE_PROFILES[0])
}

/// Voice for `personality`, defaulting to [`default_voice`].
pub fn resolve_voice(personality: Option<&str>) -> &'static VoiceProfile {
    personality.and_then(find_voice).unwrap_or_else(default_voice)
}
