//! Compiled, immutable pattern tables.

pub mod defaults;
mod toml_loader;

use regex::Regex;
use serde::{Deserialize, Serialize};

use colloquy_core::models::{EntityType, IntentType};

pub use toml_loader::{EntityPatternDef, IntentPatternDef, PatternFile, PatternLoader};

/// Which form of the utterance an intent pattern is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTarget {
    /// Lowercased, punctuation stripped.
    #[default]
    Normalized,
    /// Trimmed original text.
    Raw,
}

/// A compiled intent pattern.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    pub intent: IntentType,
    pub regex: Regex,
    pub target: MatchTarget,
    /// True when the source starts or ends with `\b`.
    pub boundary_anchored: bool,
}

/// A compiled entity extractor.
#[derive(Debug, Clone)]
pub struct EntityMatcher {
    pub entity: EntityType,
    pub regex: Regex,
}

/// All intent and entity patterns a classifier evaluates.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    intents: Vec<IntentMatcher>,
    entities: Vec<EntityMatcher>,
}

impl PatternSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in tables.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        for (intent, source, target) in defaults::INTENT_PATTERNS {
            set.add_intent_pattern(*intent, source, *target);
        }
        for (entity, source) in defaults::ENTITY_PATTERNS {
            set.add_entity_pattern(*entity, source);
        }
        set
    }

    /// Compile and append an intent pattern. Invalid regexes are skipped with a warning.
    pub fn add_intent_pattern(&mut self, intent: IntentType, source: &str, target: MatchTarget) -> bool {
        match Regex::new(source) {
            Ok(regex) => {
                self.intents.push(IntentMatcher {
                    intent,
                    regex,
                    target,
                    boundary_anchored: is_boundary_anchored(source),
                });
                true
            }
            Err(e) => {
                tracing::warn!(intent = %intent, pattern = source, error = %e, "skipping invalid intent pattern");
                false
            }
        }
    }

    /// Compile and append an entity extractor. Invalid regexes are skipped with a warning.
    pub fn add_entity_pattern(&mut self, entity: EntityType, source: &str) -> bool {
        match Regex::new(source) {
            Ok(regex) => {
                self.entities.push(EntityMatcher { entity, regex });
                true
            }
            Err(e) => {
                tracing::warn!(entity = %entity, pattern = source, error = %e, "skipping invalid entity pattern");
                false
            }
        }
    }

    /// Apply a loaded pattern file on top of this set.
    pub fn extend_from(&mut self, file: &PatternFile) -> usize {
        if file.replace_defaults {
            self.intents.clear();
            self.entities.clear();
        }
        let mut added = 0;
        for def in file.intents.iter().filter(|d| d.enabled) {
            let Some(intent) = IntentType::parse(&def.intent) else {
                tracing::warn!(intent = %def.intent, "skipping pattern for unknown intent");
                continue;
            };
            if self.add_intent_pattern(intent, &def.pattern, def.target) {
                added += 1;
            }
        }
        for def in file.entities.iter().filter(|d| d.enabled) {
            let Some(entity) = EntityType::parse(&def.entity) else {
                tracing::warn!(entity = %def.entity, "skipping pattern for unknown entity type");
                continue;
            };
            if self.add_entity_pattern(entity, &def.pattern) {
                added += 1;
            }
        }
        added
    }

    pub fn intent_matchers(&self) -> &[IntentMatcher] {
        &self.intents
    }

    pub fn entity_matchers(&self) -> &[EntityMatcher] {
        &self.entities
    }
}

/// `\b` at either end of the source, ignoring a leading inline flag group.
fn is_boundary_anchored(source: &str) -> bool {
    let body = match source.strip_prefix("(?") {
        Some(rest) if !rest.starts_with('P') && !rest.starts_with(':') => {
            rest.find(')').map_or(source, |end| &rest[end + 1..])
        }
        _ => source,
    };
    body.starts_with(r"\b") || body.ends_with(r"\b")
}
