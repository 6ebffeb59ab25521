//! Personality state change events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::types::{Emotion, Role};

/// Emitted after every successful role or emotion change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityChangedEvent {
    /// Unique event identifier (UUID v4).
    pub event_id: String,
    /// UTC timestamp of event creation.
    pub timestamp: DateTime<Utc>,
    /// Event type discriminator.
    #[serde(rename = "type")]
    pub event_type: String,
    pub role: Role,
    pub emotion: Emotion,
    /// Display name of the active personality.
    pub personality: String,
}

impl PersonalityChangedEvent {
    pub const EVENT_TYPE: &'static str = "personality_changed";

    pub fn new(role: Role, emotion: Emotion, personality: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: Self::EVENT_TYPE.to_string(),
            role,
            emotion,
            personality: personality.into(),
        }
    }
}
