//! Vision backend traits and the Ollama implementation.

use async_trait::async_trait;
use macrolens_core::Result;

#[cfg(feature = "ollama")]
use macrolens_core::{defaults, Error};
#[cfg(feature = "ollama")]
use serde::{Deserialize, Serialize};

/// Backend for prompting a vision LLM with one image.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Send an image and an instruction, return the model's raw text reply.
    async fn describe_image(
        &self,
        image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Ollama-based vision backend (e.g., llava, qwen2.5-vl).
#[cfg(feature = "ollama")]
pub struct OllamaVisionBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

#[cfg(feature = "ollama")]
impl OllamaVisionBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
            timeout_secs: defaults::VISION_LLM_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables.
    /// Returns None if OLLAMA_VISION_MODEL is not set.
    pub fn from_env() -> Option<Self> {
        let model = std::env::var(defaults::ENV_OLLAMA_VISION_MODEL).ok()?;
        if model.is_empty() {
            return None;
        }
        let base_url = std::env::var("OLLAMA_BASE")
            .or_else(|_| std::env::var("OLLAMA_URL"))
            .unwrap_or_else(|_| defaults::OLLAMA_URL.to_string());
        Some(Self::new(base_url, model))
    }
}

#[cfg(feature = "ollama")]
#[derive(Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    images: Vec<String>, // base64 encoded
    stream: bool,
}

#[cfg(feature = "ollama")]
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[cfg(feature = "ollama")]
#[async_trait]
impl VisionBackend for OllamaVisionBackend {
    async fn describe_image(
        &self,
        image_data: &[u8],
        _mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        use base64::Engine;
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            images: vec![image_b64],
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Vision request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Vision API returned {}: {}",
                status, body
            )));
        }

        let result: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse vision response: {}", e)))?;

        Ok(result.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
