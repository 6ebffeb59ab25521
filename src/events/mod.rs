//! Change notification for personality state.
//!
//! Replaces browser custom-event dispatch with a plain listener list that UI
//! adapters, tracing and telemetry can subscribe to.

/// Synchronous, panic-contained listener list.
pub mod listener_registry;

/// Event payloads.
pub mod personality_events;

pub use listener_registry::{Listener, ListenerId, ListenerRegistry};
pub use personality_events::PersonalityChangedEvent;
