//! Service layer for business logic.

pub mod analyzer;
pub mod response_cache;

pub use analyzer::{FoodAnalyzer, ImageAnalysis};
pub use response_cache::ResponseCache;
