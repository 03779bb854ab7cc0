//! # colloquy-runtime
//!
//! Explicitly constructed runtime that owns the classifier, dialogue engine,
//! session manager, memory and context store, and preference engine.
//!
//! ## Modules
//!
//! - `runtime` — `ColloquyRuntime` and the exposed operations
//! - `pipeline` — the classify → respond → transition → observe draft of one turn
//! - `responses` — built-in per-intent response strategies
//! - `advisors` — built-in sports and product advisors
//! - `background` — periodic sweeps and their shutdown handle

pub mod advisors;
pub mod background;
pub mod pipeline;
pub mod responses;
pub mod runtime;

pub use advisors::{ProductAdvisor, SportsAdvisor};
pub use background::BackgroundTasks;
pub use pipeline::{FALLBACK_FOLLOW_UPS, FALLBACK_TEXT};
pub use responses::{ResponseStrategy, TemplateResponseGenerator};
pub use runtime::ColloquyRuntime;

use colloquy_core::config::ObservabilityConfig;

/// Install the process-wide subscriber described by `config`. Later calls are no-ops.
pub fn init_tracing(config: &ObservabilityConfig) {
    colloquy_observability::tracing_setup::init_tracing_with(&config.log_level, config.json);
}
