//! OpenAI-compatible vision backend.
//!
//! Works with any endpoint that accepts `image_url` content parts in chat
//! completions, including:
//!
//! - OpenAI cloud API
//! - Azure OpenAI
//! - OpenRouter
//! - vLLM / LM Studio serving a vision model
//!
//! # Example
//!
//! ```rust,no_run
//! use macrolens_inference::openai::{OpenAIConfig, OpenAIVisionBackend};
//! use macrolens_inference::VisionBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         api_key: Some("sk-...".to_string()),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIVisionBackend::new(config).unwrap();
//!     let image = std::fs::read("plate.jpg").unwrap();
//!     let reply = backend
//!         .describe_image(&image, "image/jpeg", "What food is this?")
//!         .await
//!         .unwrap();
//!     println!("{}", reply);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIConfig, OpenAIVisionBackend, DEFAULT_TIMEOUT_SECS};
pub use error::{to_macrolens_error, OpenAIErrorCode};
pub use types::*;
