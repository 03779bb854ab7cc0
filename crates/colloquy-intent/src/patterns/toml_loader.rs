//! Declarative TOML pattern definitions, user-extensible without recompiling.
//!
//! ```toml
//! replace_defaults = false
//!
//! [[intents]]
//! intent = "greeting"
//! pattern = '\b(yo|howdy)\b'
//!
//! [[entities]]
//! entity = "brand"
//! pattern = '(?i)\b(?P<value>asus|acer)\b'
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use colloquy_core::errors::{ColloquyResult, ConfigError};

use super::{MatchTarget, PatternSet};

/// A TOML-defined intent pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentPatternDef {
    pub intent: String,
    pub pattern: String,
    #[serde(default)]
    pub target: MatchTarget,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A TOML-defined entity extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPatternDef {
    pub entity: String,
    pub pattern: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A collection of TOML pattern definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternFile {
    /// Drop the built-in tables before applying this file.
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(default)]
    pub intents: Vec<IntentPatternDef>,
    #[serde(default)]
    pub entities: Vec<EntityPatternDef>,
}

/// Loader for TOML pattern definitions.
pub struct PatternLoader;

impl PatternLoader {
    /// Parse a pattern file from a TOML string.
    pub fn parse_str(toml_str: &str) -> ColloquyResult<PatternFile> {
        toml::from_str(toml_str).map_err(|e| {
            ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Built-in tables with `toml_str` applied on top.
    pub fn load_from_str(toml_str: &str) -> ColloquyResult<PatternSet> {
        let file = Self::parse_str(toml_str)?;
        let mut set = PatternSet::builtin();
        let added = set.extend_from(&file);
        tracing::debug!(added, replace = file.replace_defaults, "applied pattern file");
        Ok(set)
    }

    /// Built-in tables with the file at `path` applied on top.
    pub fn load_from_file(path: &Path) -> ColloquyResult<PatternSet> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let file: PatternFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut set = PatternSet::builtin();
        set.extend_from(&file);
        Ok(set)
    }
}
