//! Text-to-speech proxy.
//!
//! Maps a personality label to a provider voice and streams synthesized
//! audio back to the caller. The label vocabulary matches role ids, but the
//! proxy has no link to any session's personality state.

pub mod client;
pub mod error;
pub mod voices;

pub use client::{
    AudioStream, ElevenLabsClient, SpeechSynthesizer, TtsConfig, TtsRequest, MAX_TEXT_CHARS,
};
pub use error::TtsError;
pub use voices::{
    default_voice, find_voice, resolve_voice, VoiceProfile, VoiceSettings, VOICE_PROFILES,
};
