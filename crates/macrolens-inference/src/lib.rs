//! # macrolens-inference
//!
//! Clients for the external collaborators of macrolens.
//!
//! This crate provides:
//! - Google Cloud Vision label detector
//! - USDA FoodData Central nutrition database client
//! - Vision backend trait with OpenAI-compatible and Ollama
//!   implementations
//! - The vision-LLM macro estimator: prompt and response parsing
//! - In-process collaborator doubles (feature `mock`)
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable the Ollama vision backend
//! - `openai` (default): Enable the OpenAI-compatible vision backend
//! - `mock`: Enable collaborator doubles for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use macrolens_inference::GoogleVisionDetector;
//! use macrolens_core::LabelDetector;
//!
//! #[tokio::main]
//! async fn main() {
//!     let detector = GoogleVisionDetector::from_env().unwrap();
//!     let image = std::fs::read("plate.jpg").unwrap();
//!     let detection = detector.detect(&image).await.unwrap();
//!     println!("{} labels", detection.labels.len());
//! }
//! ```

pub mod estimate;
pub mod google_vision;
pub mod usda;
pub mod vision;

#[cfg(feature = "openai")]
pub mod openai;

// Collaborator doubles for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use macrolens_core::*;

pub use estimate::{
    estimate_prompt, extract_json_object, parse_meal_estimate, vision_backend_from_env,
    LlmMacroEstimator,
};
pub use google_vision::{GoogleVisionConfig, GoogleVisionDetector};
pub use usda::UsdaClient;
pub use vision::VisionBackend;

#[cfg(feature = "ollama")]
pub use vision::OllamaVisionBackend;

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIVisionBackend};
