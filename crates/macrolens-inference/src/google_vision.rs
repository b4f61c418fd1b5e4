//! Google Cloud Vision label detector (REST, API key auth).

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use macrolens_core::{
    defaults, BoundingBox, Detection, Error, LabelDetector, LocalizedObject, Result, ScoredLabel,
};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "GOOGLE_VISION_API_KEY";

/// Environment variable overriding the REST base URL.
pub const ENV_BASE_URL: &str = "GOOGLE_VISION_URL";

/// Message used for every credential problem.
const NOT_CONFIGURED: &str = "Google Vision credentials are missing or were rejected";

/// Configuration for the Vision detector.
#[derive(Debug, Clone)]
pub struct GoogleVisionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub max_labels: u32,
    pub max_objects: u32,
    pub timeout_seconds: u64,
}

impl Default for GoogleVisionConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GOOGLE_VISION_URL.to_string(),
            api_key: None,
            max_labels: defaults::VISION_MAX_LABELS,
            max_objects: defaults::VISION_MAX_OBJECTS,
            timeout_seconds: defaults::VISION_TIMEOUT_SECS,
        }
    }
}

/// Label detector backed by the `images:annotate` endpoint.
///
/// Requests both `LABEL_DETECTION` and `OBJECT_LOCALIZATION`. Without an
/// API key every call fails with [`Error::Config`].
pub struct GoogleVisionDetector {
    client: Client,
    config: GoogleVisionConfig,
}

impl GoogleVisionDetector {
    pub fn new(config: GoogleVisionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Detection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Create from environment variables. A missing key is not an error
    /// here; it surfaces on the first `detect` call.
    pub fn from_env() -> Result<Self> {
        let config = GoogleVisionConfig {
            base_url: std::env::var(ENV_BASE_URL)
                .unwrap_or_else(|_| defaults::GOOGLE_VISION_URL.to_string()),
            api_key: std::env::var(ENV_API_KEY).ok().filter(|k| !k.is_empty()),
            ..Default::default()
        };
        Self::new(config)
    }

    pub fn config(&self) -> &GoogleVisionConfig {
        &self.config
    }

    fn build_request(&self, image: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![
                    Feature {
                        feature_type: "LABEL_DETECTION",
                        max_results: self.config.max_labels,
                    },
                    Feature {
                        feature_type: "OBJECT_LOCALIZATION",
                        max_results: self.config.max_objects,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl LabelDetector for GoogleVisionDetector {
    async fn detect(&self, image: &[u8]) -> Result<Detection> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(Error::Config(NOT_CONFIGURED.to_string()));
        };

        let start = Instant::now();
        let url = format!(
            "{}/images:annotate",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&self.build_request(image))
            .send()
            .await
            .map_err(|e| Error::Detection(format!("Vision request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| Error::Detection(format!("Failed to parse vision response: {}", e)))?;

        let Some(first) = body.responses.into_iter().next() else {
            return Ok(Detection::default());
        };

        if let Some(err) = first.error {
            warn!(
                subsystem = "inference",
                component = "google_vision",
                code = err.code,
                error = %err.message,
                "Vision returned a per-image error"
            );
            return Err(Error::Detection(err.message));
        }

        let detection = first.into_detection();
        debug!(
            subsystem = "inference",
            component = "google_vision",
            op = "detect",
            image_bytes = image.len(),
            labels = detection.labels.len(),
            objects = detection.objects.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Label detection complete"
        );
        Ok(detection)
    }

    fn name(&self) -> &str {
        "google_vision"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

/// Rejected keys come back as 401/403, or 400 mentioning the key.
fn classify_failure(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    let credential_problem = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && message.to_lowercase().contains("api key"));

    if credential_problem {
        Error::Config(format!("{}: {}", NOT_CONFIGURED, message))
    } else {
        Error::Detection(format!("Vision API returned {}: {}", status, message))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotations>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotations {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectAnnotation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoundingPoly {
    #[serde(default)]
    normalized_vertices: Vec<Vertex>,
}

#[derive(Debug, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Status,
}

impl BoundingPoly {
    fn to_box(&self) -> Option<BoundingBox> {
        let first = self.normalized_vertices.first()?;
        let init = BoundingBox {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        Some(
            self.normalized_vertices
                .iter()
                .fold(init, |b, v| BoundingBox {
                    x_min: b.x_min.min(v.x),
                    y_min: b.y_min.min(v.y),
                    x_max: b.x_max.max(v.x),
                    y_max: b.y_max.max(v.y),
                }),
        )
    }
}

impl ImageAnnotations {
    fn into_detection(self) -> Detection {
        Detection {
            labels: self
                .label_annotations
                .into_iter()
                .map(|l| ScoredLabel {
                    description: l.description,
                    score: l.score,
                })
                .collect(),
            objects: self
                .localized_object_annotations
                .into_iter()
                .map(|o| LocalizedObject {
                    bounding_box: o.bounding_poly.as_ref().and_then(BoundingPoly::to_box),
                    name: o.name,
                    score: o.score,
                })
                .collect(),
        }
    }
}
