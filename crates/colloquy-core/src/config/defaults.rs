// Single source of truth for all default values.

// --- Classifier ---
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_BASE_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_BOUNDARY_BONUS: f64 = 0.1;

// --- Dialogue ---
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_GATHERING_TURN_LIMIT: usize = 10;
pub const DEFAULT_MAX_FOLLOW_UPS: usize = 3;
pub const DEFAULT_ADVISOR_HISTORY: usize = 4;

// --- Memory ---
pub const DEFAULT_SNAPSHOT_INTERVAL: usize = 5;
pub const DEFAULT_INTENT_HISTORY_LEN: usize = 10;
pub const DEFAULT_SUMMARY_WINDOW: usize = 5;
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_RELEVANT_CONTEXT_LIMIT: usize = 3;
pub const DEFAULT_RELEVANCE_CANDIDATES: usize = 5;
pub const DEFAULT_INACTIVE_CONTEXT_HOURS: u64 = 24;

// --- Preference ---
pub const DEFAULT_DECAY_RATE: f64 = 0.95; // per day
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;
pub const DEFAULT_WEIGHT_CAP: f64 = 10.0;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.1;
pub const DEFAULT_TIER_COUNT_THRESHOLDS: [usize; 3] = [5, 15, 30];
pub const DEFAULT_TIER_CONFIDENCE_THRESHOLDS: [f64; 3] = [0.5, 0.7, 0.8];

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "colloquy.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Sweep ---
pub const DEFAULT_MEMORY_SWEEP_SECS: u64 = 300;
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;
pub const DEFAULT_DECAY_SWEEP_SECS: u64 = 300;
pub const DEFAULT_CONTEXT_SWEEP_SECS: u64 = 300;
pub const MIN_SWEEP_INTERVAL_SECS: u64 = 30;
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 300;

// --- Runtime ---
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 5_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
