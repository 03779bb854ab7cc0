//! # colloquy-session
//!
//! Conversation state machine and session lifecycle.
//!
//! ## Modules
//!
//! - `transitions` — fixed per-state transition table and overrides
//! - `follow_ups` — entity-aware follow-up question templates
//! - `selector` — single best follow-up from conversation signals
//! - `dialogue` — `DialogueEngine` applying one turn to a session
//! - `manager` — `SessionManager` with one async lock per session
//! - `cleanup` — expired session purge

pub mod cleanup;
pub mod dialogue;
pub mod follow_ups;
pub mod manager;
pub mod selector;
pub mod transitions;

pub use dialogue::{Advisory, DialogueEngine, TurnOutcome};
pub use follow_ups::{generate_follow_ups, FollowUpTemplate, GENERIC_FOLLOW_UPS};
pub use manager::{SessionManager, SessionSummary};
pub use selector::{FollowUpSelector, FollowUpSignals};
pub use transitions::{transition, TransitionContext};
