//! OpenAI-compatible vision backend implementation.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use macrolens_core::{defaults, Error, Result};

use super::error::{to_macrolens_error, OpenAIErrorCode};
use super::types::*;
use crate::vision::VisionBackend;

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = defaults::VISION_LLM_TIMEOUT_SECS;

/// Configuration for OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Vision-capable chat model.
    pub model: String,
    /// Maximum tokens in the reply.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// HTTP-Referer header for OpenRouter.ai rankings (optional).
    pub http_referer: Option<String>,
    /// X-Title header for app name on OpenRouter.ai (optional).
    pub x_title: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_URL.to_string(),
            api_key: None,
            model: defaults::OPENAI_VISION_MODEL.to_string(),
            max_tokens: defaults::VISION_LLM_MAX_TOKENS,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            http_referer: None,
            x_title: None,
        }
    }
}

impl OpenAIConfig {
    /// Read configuration from the environment.
    /// Returns None if OPENAI_API_KEY is not set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())?;
        Some(Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| defaults::OPENAI_URL.to_string()),
            api_key: Some(api_key),
            model: std::env::var("OPENAI_VISION_MODEL")
                .unwrap_or_else(|_| defaults::OPENAI_VISION_MODEL.to_string()),
            max_tokens: defaults::VISION_LLM_MAX_TOKENS,
            timeout_seconds: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            http_referer: std::env::var("OPENAI_HTTP_REFERER").ok(),
            x_title: std::env::var("OPENAI_X_TITLE").ok(),
        })
    }
}

/// Vision backend over `/chat/completions` with an inline image.
pub struct OpenAIVisionBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIVisionBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            model = %config.model,
            "Initializing OpenAI vision backend: url={}",
            config.base_url
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    /// Returns None if OPENAI_API_KEY is not set.
    pub fn from_env() -> Option<Result<Self>> {
        OpenAIConfig::from_env().map(Self::new)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        // Add OpenRouter-specific headers if configured
        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }

        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }

    fn build_body(
        &self,
        image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> ChatCompletionRequest {
        let data_uri = format!(
            "data:{};base64,{}",
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(image_data)
        );

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_uri,
                            detail: None,
                        },
                    },
                ]),
            }],
            temperature: Some(0.2),
            max_tokens: Some(self.config.max_tokens),
        }
    }
}

#[async_trait]
impl VisionBackend for OpenAIVisionBackend {
    async fn describe_image(
        &self,
        image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        let start = Instant::now();
        let request = self.build_body(image_data, mime_type, prompt);

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: OpenAIErrorResponse = response.json().await.unwrap_or(OpenAIErrorResponse {
                error: OpenAIError {
                    message: "Unknown error".to_string(),
                    error_type: "unknown".to_string(),
                    code: None,
                },
            });
            let code = OpenAIErrorCode::from_response(status.as_u16(), &body.error.error_type);
            return Err(to_macrolens_error(
                code,
                &format!("OpenAI returned {}: {}", status, body.error.message),
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "describe_image",
            model = %self.config.model,
            image_bytes = image_data.len(),
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Vision completion finished"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
