//! Structured logging schema and field name constants for macrolens.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), request completions |
//! | DEBUG | Decision points (which stage hit), config choices |
//! | TRACE | Per-item iteration (individual labels, nutrients) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across request → sub-calls.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "detector", "nutrition", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "google_vision", "usda", "openai_vision", "analyzer"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "detect", "search_macros", "estimate", "resolve"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Food label being resolved.
pub const LABEL: &str = "label";

/// Canonical table key after synonym resolution.
pub const CANONICAL_KEY: &str = "canonical_key";

/// Result source tag ("static_table", "nutrition_database", ...).
pub const SOURCE: &str = "source";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned.
pub const RESULT_COUNT: &str = "result_count";

/// Size of an uploaded image in bytes.
pub const IMAGE_BYTES: &str = "image_bytes";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Whether a cached entry was used.
pub const CACHE_HIT: &str = "cache_hit";
