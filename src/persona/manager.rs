//! Personality state manager — one per conversation session.
//!
//! Holds the active [`Role`] and [`Emotion`], the shared personality
//! document, and the listeners that want to hear about changes. All
//! mutation goes through [`set_role`](PersonalityManager::set_role),
//! [`set_emotion`](PersonalityManager::set_emotion) or
//! [`process_input`](PersonalityManager::process_input).
//!
//! ```text
//! user text
//!   → emotional cue (first keyword hit)  → set_emotion(cue → emotion)
//!   → role keywords  (first keyword hit) → set_role(role) → emotion derived
//!   → system prompt + suggestion
//! ```
//!
//! Managers are constructed explicitly and handed to whoever needs them;
//! there is no process-wide instance.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::classifier::{detect_emotional_cue, detect_role, detect_suggestion};
use super::config::{load_or_fallback, ConfigSource, PersonalityConfig};
use super::prompt::{render_system_prompt, UNINITIALIZED_PROMPT};
use super::types::{DetectedEmotion, Emotion, Role};
use crate::events::{ListenerId, ListenerRegistry, PersonalityChangedEvent};

/// Serializable view of a manager's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalitySnapshot {
    pub name: String,
    pub role: Role,
    pub emotion: Emotion,
    pub initialized: bool,
}

/// Result of [`PersonalityManager::process_input`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedInput {
    pub system_prompt: String,
    pub detected_emotion: DetectedEmotion,
    pub current_role: Role,
    pub suggestion: Option<String>,
}

pub struct PersonalityManager {
    config: Arc<PersonalityConfig>,
    current_role: Role,
    current_emotion: Emotion,
    initialized: bool,
    listeners: ListenerRegistry,
}

impl fmt::Debug for PersonalityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonalityManager")
            .field("name", &self.config.display_name())
            .field("current_role", &self.current_role)
            .field("current_emotion", &self.current_emotion)
            .field("initialized", &self.initialized)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for PersonalityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonalityManager {
    /// Create a manager that has not loaded a personality yet.
    pub fn new() -> Self {
        Self {
            config: Arc::new(PersonalityConfig::fallback()),
            current_role: Role::default(),
            current_emotion: Emotion::default(),
            initialized: false,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Create an initialized manager over an already-loaded document.
    pub fn with_config(config: Arc<PersonalityConfig>) -> Self {
        Self {
            config,
            initialized: true,
            ..Self::new()
        }
    }

    /// Load the personality document from `source`.
    ///
    /// Failures are logged and replaced by [`PersonalityConfig::fallback`];
    /// the manager is initialized either way.
    pub async fn initialize(&mut self, source: &ConfigSource) {
        let config = load_or_fallback(source).await;
        self.config = Arc::new(config);
        self.initialized = true;
        log::info!(
            "Personality '{}' initialized (role={}, emotion={})",
            self.config.display_name(),
            self.current_role,
            self.current_emotion,
        );
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn current_role(&self) -> Role {
        self.current_role
    }

    pub fn current_emotion(&self) -> Emotion {
        self.current_emotion
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &PersonalityConfig {
        &self.config
    }

    /// Configured canned response for `id`, if any.
    pub fn response_pattern(&self, id: &str) -> Option<&str> {
        self.config.response_pattern(id)
    }

    pub fn snapshot(&self) -> PersonalitySnapshot {
        PersonalitySnapshot {
            name: self.config.display_name().to_string(),
            role: self.current_role,
            emotion: self.current_emotion,
            initialized: self.initialized,
        }
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        listener: impl Fn(&PersonalityChangedEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(name, listener)
    }

    pub fn unsubscribe(&mut self, id: &ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&self) {
        let event = PersonalityChangedEvent::new(
            self.current_role,
            self.current_emotion,
            self.config.display_name(),
        );
        self.listeners.emit(&event);
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Switch role by id. Unknown ids are ignored.
    pub fn set_role(&mut self, role: &str) {
        match role.parse::<Role>() {
            Ok(role) => self.apply_role(role),
            Err(e) => log::debug!("Ignoring role change: {}", e),
        }
    }

    /// Switch emotion by id. Unknown ids are ignored.
    pub fn set_emotion(&mut self, emotion: &str) {
        match emotion.parse::<Emotion>() {
            Ok(emotion) => self.apply_emotion(emotion),
            Err(e) => log::debug!("Ignoring emotion change: {}", e),
        }
    }

    /// Switch role; the role's default emotion comes with it.
    pub fn apply_role(&mut self, role: Role) {
        self.current_role = role;
        self.current_emotion = role.default_emotion();
        log::debug!(
            "Role set to {} (emotion {})",
            self.current_role,
            self.current_emotion
        );
        self.notify();
    }

    pub fn apply_emotion(&mut self, emotion: Emotion) {
        self.current_emotion = emotion;
        log::debug!("Emotion set to {}", self.current_emotion);
        self.notify();
    }

    // -----------------------------------------------------------------------
    // Prompt & classification
    // -----------------------------------------------------------------------

    pub fn generate_system_prompt(&self) -> String {
        if !self.initialized {
            return UNINITIALIZED_PROMPT.to_string();
        }
        render_system_prompt(&self.config, self.current_role, self.current_emotion)
    }

    /// Classify `input` without touching state.
    pub fn analyze_input_for_emotional_cues(&self, input: &str) -> DetectedEmotion {
        match detect_emotional_cue(input) {
            Some(cue) => DetectedEmotion::Cue(cue),
            None => DetectedEmotion::Held(self.current_emotion),
        }
    }

    /// Run both classifiers over `user_input`, apply what they find, and
    /// render the resulting prompt.
    pub fn process_input(&mut self, user_input: &str) -> ProcessedInput {
        let detected_emotion = self.analyze_input_for_emotional_cues(user_input);
        if let Some(cue) = detected_emotion.cue() {
            self.apply_emotion(cue.response_emotion());
        }

        if let Some(role) = detect_role(user_input) {
            self.apply_role(role);
        }

        let suggestion = detect_suggestion(user_input).map(|kind| {
            self.config
                .response_pattern(kind.pattern_id())
                .unwrap_or(kind.default_text())
                .to_string()
        });

        ProcessedInput {
            system_prompt: self.generate_system_prompt(),
            detected_emotion,
            current_role: self.current_role,
            suggestion,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
