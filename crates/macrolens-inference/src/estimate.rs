//! Vision-LLM macro estimation: prompt, response parsing, and the estimator.
//!
//! The model is asked for one JSON object with per-component macros. Its
//! reply is free text, so the object is cut out of any surrounding prose or
//! code fences before parsing. The reported `total` is never trusted: the
//! estimate total is always recomputed from the components.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use macrolens_core::{FoodComponent, MacroEstimator, MacroRecord, MealEstimate, Result};

use crate::vision::VisionBackend;

/// Fenced code block, optionally tagged `json`.
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fence pattern is valid"));

/// Leading decimal number in strings like `"12.5g"` or `"250 kcal"`.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").expect("number pattern is valid"));

const MACRO_FIELDS: [&str; 4] = ["calories", "protein", "carbs", "fat"];

/// Instruction sent with the image.
pub fn estimate_prompt(label: &str) -> String {
    format!(
        "You are a nutrition assistant. An image classifier labelled this photo \"{label}\".\n\
         Identify each distinct food visible on the plate and estimate its calories (kcal), \
         protein (g), carbohydrates (g), and fat (g) for the portion shown.\n\
         Respond with a single JSON object and nothing else, in exactly this shape:\n\
         {{\"components\": [{{\"name\": \"<food>\", \"calories\": 0, \"protein\": 0, \"carbs\": 0, \"fat\": 0}}], \
         \"total\": {{\"calories\": 0, \"protein\": 0, \"carbs\": 0, \"fat\": 0}}}}\n\
         Use plain numbers without units.",
        label = label
    )
}

/// The JSON object inside a model reply, if any.
///
/// Prefers the contents of a code fence, then takes the span from the first
/// `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let inner = FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text);
    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    (end > start).then(|| &inner[start..=end])
}

fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => NUMBER_RE
            .captures(s)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Macros from an object holding at least one of the four fields.
fn record_from(value: &Value) -> Option<MacroRecord> {
    let obj = value.as_object()?;
    if !MACRO_FIELDS.iter().any(|f| obj.contains_key(*f)) {
        return None;
    }
    let field = |name: &str| obj.get(name).map(number).unwrap_or(0.0);
    Some(
        MacroRecord::new(
            field("calories"),
            field("protein"),
            field("carbs"),
            field("fat"),
        )
        .sanitized(),
    )
}

/// Parse a model reply into an estimate.
///
/// Accepted shapes, in order: a non-empty `components` list; a flat object
/// with macro fields; an object with only a `total`. The last two become a
/// single component named after `label`. Anything else is `None`.
pub fn parse_meal_estimate(text: &str, label: &str) -> Option<MealEstimate> {
    let json: Value = serde_json::from_str(extract_json_object(text)?).ok()?;

    if let Some(items) = json.get("components").and_then(Value::as_array) {
        let components: Vec<FoodComponent> = items
            .iter()
            .filter_map(|item| {
                let macros = record_from(item)?;
                let name = item
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(label);
                Some(FoodComponent {
                    name: name.to_string(),
                    macros,
                })
            })
            .collect();
        if !components.is_empty() {
            return Some(MealEstimate::from_components(components));
        }
    }

    let single = record_from(&json).or_else(|| json.get("total").and_then(record_from))?;
    Some(MealEstimate::from_components(vec![FoodComponent {
        name: label.to_string(),
        macros: single,
    }]))
}

/// MIME type of an image, sniffed from its bytes.
pub fn image_mime_type(image: &[u8]) -> &'static str {
    infer::get(image)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or("image/jpeg")
}

/// [`MacroEstimator`] over any [`VisionBackend`].
pub struct LlmMacroEstimator {
    backend: Arc<dyn VisionBackend>,
}

impl LlmMacroEstimator {
    pub fn new(backend: Arc<dyn VisionBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl MacroEstimator for LlmMacroEstimator {
    async fn estimate(&self, image: &[u8], label: &str) -> Result<Option<MealEstimate>> {
        let start = Instant::now();
        let reply = self
            .backend
            .describe_image(image, image_mime_type(image), &estimate_prompt(label))
            .await?;

        let parsed = parse_meal_estimate(&reply, label);
        if parsed.is_none() {
            warn!(
                subsystem = "inference",
                component = "estimator",
                model = self.backend.model_name(),
                label = label,
                response_len = reply.len(),
                "Vision LLM reply had no usable macro estimate"
            );
        } else {
            debug!(
                subsystem = "inference",
                component = "estimator",
                op = "estimate",
                model = self.backend.model_name(),
                label = label,
                duration_ms = start.elapsed().as_millis() as u64,
                "Parsed vision LLM estimate"
            );
        }
        Ok(parsed)
    }

    fn model_name(&self) -> &str {
        self.backend.model_name()
    }
}

/// Pick the vision backend from the environment.
///
/// An OpenAI-compatible endpoint is preferred when `OPENAI_API_KEY` is set;
/// otherwise a local Ollama model when `OLLAMA_VISION_MODEL` is set.
pub fn vision_backend_from_env() -> Result<Option<Arc<dyn VisionBackend>>> {
    #[cfg(feature = "openai")]
    {
        if let Some(backend) = crate::openai::OpenAIVisionBackend::from_env() {
            return Ok(Some(Arc::new(backend?)));
        }
    }

    #[cfg(feature = "ollama")]
    {
        if let Some(backend) = crate::vision::OllamaVisionBackend::from_env() {
            return Ok(Some(Arc::new(backend)));
        }
    }

    Ok(None)
}
