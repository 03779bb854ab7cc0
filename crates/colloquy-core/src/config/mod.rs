//! Configuration with layered resolution.

pub mod defaults;

mod classifier_config;
mod dialogue_config;
mod memory_config;
mod observability_config;
mod preference_config;
mod runtime_config;
mod storage_config;
mod sweep_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use classifier_config::ClassifierConfig;
pub use dialogue_config::DialogueConfig;
pub use memory_config::MemoryConfig;
pub use observability_config::ObservabilityConfig;
pub use preference_config::PreferenceConfig;
pub use runtime_config::RuntimeConfig;
pub use storage_config::StorageConfig;
pub use sweep_config::SweepConfig;

use crate::errors::ConfigError;
use crate::models::MemoryType;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`COLLOQUY_*`)
/// 2. TOML file passed to [`ColloquyConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColloquyConfig {
    pub classifier: ClassifierConfig,
    pub dialogue: DialogueConfig,
    pub memory: MemoryConfig,
    pub preference: PreferenceConfig,
    pub storage: StorageConfig,
    pub sweep: SweepConfig,
    pub runtime: RuntimeConfig,
    pub observability: ObservabilityConfig,
}

impl ColloquyConfig {
    /// Load configuration: defaults, then `path` (if any), then env, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Missing sections keep defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_interval = [
            (
                "classifier.confidence_threshold",
                self.classifier.confidence_threshold,
            ),
            ("classifier.base_confidence", self.classifier.base_confidence),
            ("classifier.boundary_bonus", self.classifier.boundary_bonus),
            (
                "memory.relevance_threshold",
                self.memory.relevance_threshold,
            ),
            ("preference.min_confidence", self.preference.min_confidence),
            (
                "preference.similarity_threshold",
                self.preference.similarity_threshold,
            ),
        ];
        for (field, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }

        let rate = self.preference.decay_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(invalid("preference.decay_rate", "must be in (0.0, 1.0]"));
        }
        if self.preference.weight_cap <= 0.0 {
            return Err(invalid("preference.weight_cap", "must be greater than 0"));
        }
        if !is_non_decreasing(&self.preference.tier_count_thresholds.map(|c| c as f64))
            || !is_non_decreasing(&self.preference.tier_confidence_thresholds)
        {
            return Err(invalid(
                "preference.tier_thresholds",
                "must be non-decreasing",
            ));
        }
        if self.dialogue.session_timeout_secs == 0 {
            return Err(invalid(
                "dialogue.session_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.memory.snapshot_interval == 0 {
            return Err(invalid(
                "memory.snapshot_interval",
                "must be greater than 0",
            ));
        }
        if self.runtime.turn_timeout_ms == 0 {
            return Err(invalid("runtime.turn_timeout_ms", "must be greater than 0"));
        }
        for (field, secs) in self.sweep.intervals() {
            if !(defaults::MIN_SWEEP_INTERVAL_SECS..=defaults::MAX_SWEEP_INTERVAL_SECS)
                .contains(&secs)
            {
                return Err(invalid(field, "must be between 30 and 300 seconds"));
            }
        }
        for (name, policy) in &self.memory.retention_overrides {
            if MemoryType::parse(name).is_none() {
                return Err(invalid(
                    "memory.retention_overrides",
                    &format!("unknown memory type '{name}'"),
                ));
            }
            if !(0.0..=1.0).contains(&policy.importance_floor) {
                return Err(invalid(
                    "memory.retention_overrides",
                    "importance_floor must be between 0.0 and 1.0",
                ));
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Unparseable values are ignored and the lower layer wins.
    fn apply_env_overrides(config: &mut ColloquyConfig) {
        if let Ok(val) = std::env::var("COLLOQUY_DB_PATH") {
            config.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("COLLOQUY_SESSION_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.dialogue.session_timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("COLLOQUY_DECAY_RATE") {
            if let Ok(v) = val.parse::<f64>() {
                config.preference.decay_rate = v;
            }
        }
        if let Ok(val) = std::env::var("COLLOQUY_TURN_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.runtime.turn_timeout_ms = v;
            }
        }
        if let Ok(val) = std::env::var("COLLOQUY_LOG_LEVEL") {
            config.observability.log_level = val;
        }
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}
