//! Context flags derived from text shape and prior-turn linkage.

use regex::Regex;

use colloquy_core::models::{ClassificationContext, ContextFlags, EntityMap};

use crate::patterns::defaults::FOLLOW_UP_MARKERS;

/// Whole-word matcher over the discourse markers.
#[derive(Debug, Clone)]
pub struct FollowUpDetector {
    markers: Option<Regex>,
}

impl FollowUpDetector {
    pub fn new(markers: &[&str]) -> Self {
        let alternation = markers
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        let markers = if alternation.is_empty() {
            None
        } else {
            Regex::new(&format!(r"\b(?:{alternation})\b")).ok()
        };
        Self { markers }
    }

    pub fn has_marker(&self, normalized: &str) -> bool {
        self.markers.as_ref().is_some_and(|re| re.is_match(normalized))
    }

    /// A follow-up needs a previous intent, and either a discourse marker or
    /// entities carried by an utterance that matched no intent of its own.
    pub fn is_follow_up(
        &self,
        normalized: &str,
        matched_intent: bool,
        entities: &EntityMap,
        context: &ClassificationContext,
    ) -> bool {
        if context.previous_intent.is_none() {
            return false;
        }
        self.has_marker(normalized) || (!matched_intent && !entities.is_empty())
    }
}

impl Default for FollowUpDetector {
    fn default() -> Self {
        Self::new(FOLLOW_UP_MARKERS)
    }
}

/// Shape-only flags; linkage fields are filled in by the classifier.
pub fn shape_flags(text: &str) -> ContextFlags {
    let trimmed = text.trim();
    ContextFlags {
        text_length: trimmed.chars().count(),
        word_count: trimmed.split_whitespace().count(),
        has_question_mark: trimmed.contains('?'),
        has_exclamation: trimmed.contains('!'),
        ..ContextFlags::default()
    }
}
