//! Centralized default constants for macrolens.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 8000;

/// Default CORS origin whitelist (local frontend dev servers).
pub const ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Maximum upload size in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 60;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

// =============================================================================
// ANALYSIS
// =============================================================================

/// Soft wall-clock budget for one analysis request, in seconds.
pub const ANALYSIS_BUDGET_SECS: u64 = 20;

/// Fraction of the budget after which the LLM stage is no longer started.
pub const BUDGET_LLM_CUTOFF: f64 = 0.3;

/// Fraction of the budget after which the nutrition database is no longer queried.
pub const BUDGET_DATABASE_CUTOFF: f64 = 0.7;

/// Default capacity of the per-label response cache.
pub const RESPONSE_CACHE_SIZE: usize = 256;

/// Label emitted when detection produced nothing usable.
pub const UNIDENTIFIED_FOOD: &str = "unidentified food";

// =============================================================================
// GENERIC ESTIMATE
// =============================================================================

/// Calories of the generic estimate used when every lookup misses.
pub const GENERIC_CALORIES: f64 = 250.0;

/// Protein (g) of the generic estimate.
pub const GENERIC_PROTEIN: f64 = 15.0;

/// Carbohydrates (g) of the generic estimate.
pub const GENERIC_CARBS: f64 = 25.0;

/// Fat (g) of the generic estimate.
pub const GENERIC_FAT: f64 = 10.0;

// =============================================================================
// LABEL DETECTION
// =============================================================================

/// Default Google Cloud Vision REST base URL.
pub const GOOGLE_VISION_URL: &str = "https://vision.googleapis.com/v1";

/// Maximum label annotations requested per image.
pub const VISION_MAX_LABELS: u32 = 20;

/// Maximum localized objects requested per image.
pub const VISION_MAX_OBJECTS: u32 = 10;

/// Minimum score for a localized object to count.
pub const OBJECT_MIN_SCORE: f64 = 0.6;

/// Minimum score for a label to be taken directly.
pub const LABEL_MIN_SCORE: f64 = 0.7;

/// Minimum score for a label that signals food context.
pub const FOOD_CONTEXT_MIN_SCORE: f64 = 0.6;

/// Minimum score for labels added once food context is established.
pub const FOOD_CONTEXT_LABEL_MIN_SCORE: f64 = 0.65;

/// Number of top labels used when nothing else qualified.
pub const FALLBACK_LABEL_COUNT: usize = 3;

/// Timeout for label detection requests in seconds.
pub const VISION_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// NUTRITION DATABASE
// =============================================================================

/// Default USDA FoodData Central base URL.
pub const USDA_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// USDA data types searched, in priority order.
pub const USDA_DATA_TYPES: &[&str] = &["Foundation", "SR Legacy", "Branded"];

/// Timeout for nutrition database requests in seconds.
pub const USDA_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default vision-capable chat model.
pub const OPENAI_VISION_MODEL: &str = "gpt-4o-mini";

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Environment variable naming the Ollama vision model.
pub const ENV_OLLAMA_VISION_MODEL: &str = "OLLAMA_VISION_MODEL";

/// Timeout for vision LLM requests in seconds.
pub const VISION_LLM_TIMEOUT_SECS: u64 = 60;

/// Maximum tokens requested from the vision LLM.
pub const VISION_LLM_MAX_TOKENS: u32 = 800;
