//! Keyword heuristics over free-text user input.
//!
//! Each table is an ordered list of `(outcome, keywords)` pairs. Matching is a
//! case-insensitive substring test and the first pair with any hit wins.
//! Greetings are the exception: they are short enough to sit inside other
//! words ("hi" in "this", "hey" in "they"), so they only match whole words. The
//! order inside each table is an arbitrary priority kept for compatibility
//! with existing conversations; nothing depends on it beyond tie-breaking.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{EmotionalCue, Role};

/// Emotional cue keywords, in priority order.
pub const EMOTIONAL_CUE_KEYWORDS: &[(EmotionalCue, &[&str])] = &[
    (
        EmotionalCue::Frustrated,
        &["frustrated", "annoyed", "stuck", "broken", "not working", "angry"],
    ),
    (
        EmotionalCue::Excited,
        &["excited", "amazing", "awesome", "can't wait", "fantastic", "thrilled"],
    ),
    (
        EmotionalCue::Tired,
        &["tired", "exhausted", "sleepy", "worn out", "drained"],
    ),
    (
        EmotionalCue::Curious,
        &[
            "curious",
            "i wonder",
            "wondering",
            "why",
            "how does",
            "what if",
            "tell me about",
        ],
    ),
];

/// Role keywords, in priority order.
pub const ROLE_KEYWORDS: &[(Role, &[&str])] = &[
    (
        Role::Coder,
        &["code", "programming", "technical", "debug", "function"],
    ),
    (
        Role::Strategist,
        &["plan", "strategy", "roadmap", "goals", "vision"],
    ),
    (
        Role::CreativePartner,
        &["create", "design", "art", "imagine", "story"],
    ),
];

/// Canned-response kinds offered alongside a processed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Greeting,
    Thinking,
}

impl SuggestionKind {
    /// Key under `response_patterns` in the personality document.
    pub fn pattern_id(&self) -> &'static str {
        match self {
            SuggestionKind::Greeting => "greeting",
            SuggestionKind::Thinking => "thinking",
        }
    }

    /// Text used when the document has no entry for this pattern.
    pub fn default_text(&self) -> &'static str {
        match self {
            SuggestionKind::Greeting => "Hello! I'm Anne. How can I help you today?",
            SuggestionKind::Thinking => "Let me think about that for a moment...",
        }
    }
}

pub const GREETING_KEYWORDS: &[&str] = &[
    "hello",
    "hey",
    "hi",
    "greetings",
    "good morning",
    "good evening",
];

pub const THINKING_KEYWORDS: &[&str] = &["think", "consider", "ponder", "reflect"];

static GREETING_WORDS: Lazy<Regex> = Lazy::new(|| {
    let alternation = GREETING_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation))
        .expect("greeting keywords form a valid regex")
});

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

fn first_match<T: Copy>(input: &str, table: &[(T, &[&str])]) -> Option<T> {
    let lower = input.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(outcome, _)| *outcome)
}

/// First emotional cue whose keywords appear in `input`.
pub fn detect_emotional_cue(input: &str) -> Option<EmotionalCue> {
    first_match(input, EMOTIONAL_CUE_KEYWORDS)
}

/// First role whose keywords appear in `input`.
pub fn detect_role(input: &str) -> Option<Role> {
    first_match(input, ROLE_KEYWORDS)
}

/// Greeting check first, thinking second.
pub fn detect_suggestion(input: &str) -> Option<SuggestionKind> {
    let lower = input.to_lowercase();
    if GREETING_WORDS.is_match(&lower) {
        Some(SuggestionKind::Greeting)
    } else if contains_any(&lower, THINKING_KEYWORDS) {
        Some(SuggestionKind::Thinking)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_detection_examples() {
        assert_eq!(
            detect_emotional_cue("I am so tired today"),
            Some(EmotionalCue::Tired)
        );
        assert_eq!(
            detect_emotional_cue("this is totally broken and I'm stuck"),
            Some(EmotionalCue::Frustrated)
        );
        assert_eq!(detect_emotional_cue("good morning"), None);
    }

    #[test]
    fn test_cue_detection_is_case_insensitive() {
        assert_eq!(
            detect_emotional_cue("This is AMAZING"),
            Some(EmotionalCue::Excited)
        );
        assert_eq!(
            detect_emotional_cue("I Wonder about stars"),
            Some(EmotionalCue::Curious)
        );
    }

    #[test]
    fn test_wonderful_is_not_curiosity() {
        assert_eq!(detect_emotional_cue("what a wonderful day"), None);
        assert_eq!(
            detect_emotional_cue("I was wondering about stars"),
            Some(EmotionalCue::Curious)
        );
    }

    #[test]
    fn test_cue_priority_follows_table_order() {
        // frustrated outranks tired
        assert_eq!(
            detect_emotional_cue("I'm exhausted and annoyed"),
            Some(EmotionalCue::Frustrated)
        );
        // excited outranks curious
        assert_eq!(
            detect_emotional_cue("why is this so awesome"),
            Some(EmotionalCue::Excited)
        );
    }

    #[test]
    fn test_role_detection() {
        assert_eq!(
            detect_role("can you help me debug this function"),
            Some(Role::Coder)
        );
        assert_eq!(detect_role("Let's build a ROADMAP"), Some(Role::Strategist));
        assert_eq!(detect_role("tell me a story"), Some(Role::CreativePartner));
        assert_eq!(detect_role("how are you"), None);
    }

    #[test]
    fn test_role_priority_follows_table_order() {
        // "code" (coder) and "plan" (strategist): coder wins
        assert_eq!(detect_role("plan the code review"), Some(Role::Coder));
        // "vision" (strategist) and "design" (creative): strategist wins
        assert_eq!(
            detect_role("design a product vision"),
            Some(Role::Strategist)
        );
    }

    #[test]
    fn test_suggestion_detection() {
        assert_eq!(detect_suggestion("hello there"), Some(SuggestionKind::Greeting));
        assert_eq!(detect_suggestion("Hi Anne"), Some(SuggestionKind::Greeting));
        assert_eq!(
            detect_suggestion("what do you think"),
            Some(SuggestionKind::Thinking)
        );
        assert_eq!(detect_suggestion("this works"), None);
    }

    #[test]
    fn test_greetings_match_whole_words_only() {
        assert_eq!(
            detect_suggestion("what do they think"),
            Some(SuggestionKind::Thinking)
        );
        assert_eq!(
            detect_suggestion("what do they think about it"),
            Some(SuggestionKind::Thinking)
        );
        assert_eq!(detect_suggestion("which whey protein"), None);
        assert_eq!(detect_suggestion("Hey!"), Some(SuggestionKind::Greeting));
        assert_eq!(
            detect_suggestion("well, good morning Anne"),
            Some(SuggestionKind::Greeting)
        );
    }

    #[test]
    fn test_greeting_outranks_thinking() {
        assert_eq!(
            detect_suggestion("hey, I think we should talk"),
            Some(SuggestionKind::Greeting)
        );
    }
}
