//! IntentClassifier: pattern scoring, entity extraction, context flags.

use std::path::Path;

use colloquy_core::config::ClassifierConfig;
use colloquy_core::errors::{ColloquyError, ColloquyResult};
use colloquy_core::models::{
    push_entity, ClassificationContext, EntityMap, Intent, IntentType,
};

use crate::context::{shape_flags, FollowUpDetector};
use crate::normalize::normalize;
use crate::patterns::{MatchTarget, PatternLoader, PatternSet};

/// Rule-based classifier over an immutable [`PatternSet`].
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    patterns: PatternSet,
    follow_ups: FollowUpDetector,
    config: ClassifierConfig,
}

impl IntentClassifier {
    /// Built-in patterns with default scoring.
    pub fn new() -> Self {
        Self::with_patterns(PatternSet::builtin(), ClassifierConfig::default())
    }

    /// Build from config, loading `patterns_path` on top of the built-ins when set.
    pub fn from_config(config: ClassifierConfig) -> ColloquyResult<Self> {
        let patterns = match &config.patterns_path {
            Some(path) => PatternLoader::load_from_file(Path::new(path))?,
            None => PatternSet::builtin(),
        };
        Ok(Self::with_patterns(patterns, config))
    }

    pub fn with_patterns(patterns: PatternSet, config: ClassifierConfig) -> Self {
        Self {
            patterns,
            follow_ups: FollowUpDetector::default(),
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify an utterance. Never fails: unusable input yields `Unknown`.
    pub fn classify(&self, text: &str, context: Option<&ClassificationContext>) -> Intent {
        match self.try_classify(text, context) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::debug!(error = %e, "classifier input rejected");
                Intent::unknown()
            }
        }
    }

    /// Classify, surfacing a `ValidationError` for empty or whitespace input.
    pub fn try_classify(
        &self,
        text: &str,
        context: Option<&ClassificationContext>,
    ) -> ColloquyResult<Intent> {
        let raw = text.trim();
        if raw.is_empty() {
            return Err(ColloquyError::validation("utterance is empty"));
        }
        let normalized = normalize(raw);

        let (intent_type, confidence) = self.score(raw, &normalized);
        let entities = self.extract_entities(raw);

        let mut flags = shape_flags(raw);
        if let Some(ctx) = context {
            flags.previous_intent = ctx.previous_intent;
            flags.session_length = ctx.session_length;
            flags.is_follow_up = self.follow_ups.is_follow_up(
                &normalized,
                intent_type != IntentType::Unknown,
                &entities,
                ctx,
            );
        }

        tracing::debug!(intent = %intent_type, confidence, entities = entities.len(), "classified utterance");
        Ok(Intent {
            intent_type,
            confidence,
            entities,
            flags,
        })
    }

    /// Best-scoring intent; ties go to the earlier variant in declaration order.
    fn score(&self, raw: &str, normalized: &str) -> (IntentType, f64) {
        let mut best_per_intent = [0.0_f64; IntentType::COUNT];
        for matcher in self.patterns.intent_matchers() {
            let haystack = match matcher.target {
                MatchTarget::Normalized => normalized,
                MatchTarget::Raw => raw,
            };
            if !matcher.regex.is_match(haystack) {
                continue;
            }
            let mut score = self.config.base_confidence;
            if matcher.boundary_anchored {
                score += self.config.boundary_bonus;
            }
            let slot = &mut best_per_intent[matcher.intent as usize];
            *slot = slot.max(score.clamp(0.0, 1.0));
        }

        let mut best = (IntentType::Unknown, 0.0);
        for intent in IntentType::ALL {
            let score = best_per_intent[intent as usize];
            if score > best.1 {
                best = (intent, score);
            }
        }
        best
    }

    /// Run every entity extractor over the original text.
    /// Values are lowercased and deduplicated in first-seen order.
    pub fn extract_entities(&self, text: &str) -> EntityMap {
        let mut entities = EntityMap::new();
        for matcher in self.patterns.entity_matchers() {
            for caps in matcher.regex.captures_iter(text) {
                let span = caps
                    .name("value")
                    .or_else(|| caps.get(1))
                    .or_else(|| caps.get(0));
                if let Some(m) = span {
                    let value = m.as_str().trim().to_lowercase();
                    if !value.is_empty() {
                        push_entity(&mut entities, matcher.entity, &value);
                    }
                }
            }
        }
        entities
    }

    /// Callers fall back to a conversational strategy below this.
    pub fn is_confident(&self, intent: &Intent) -> bool {
        intent.is_confident(self.config.confidence_threshold)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
