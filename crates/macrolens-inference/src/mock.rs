//! In-process collaborator doubles for deterministic testing.
//!
//! Each mock implements the matching core trait, returns canned data, and
//! records the inputs it was called with.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use macrolens_inference::mock::{MockLabelDetector, MockNutritionDatabase};
//! use macrolens_core::{LabelDetector, MacroRecord, NutritionDatabase};
//!
//! #[tokio::main]
//! async fn main() {
//!     let detector = MockLabelDetector::new().with_label("Pizza", 0.95);
//!     let detection = detector.detect(b"image").await.unwrap();
//!     assert_eq!(detection.labels.len(), 1);
//!
//!     let db = MockNutritionDatabase::new()
//!         .with_record("apple", MacroRecord::new(52.0, 0.3, 14.0, 0.2));
//!     assert!(db.search_macros("apple").await.unwrap().is_some());
//!     assert_eq!(db.calls(), vec!["apple".to_string()]);
//! }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use macrolens_core::{
    Detection, Error, FoodComponent, LabelDetector, LocalizedObject, MacroEstimator, MacroRecord,
    MealEstimate, NutritionDatabase, Result, ScoredLabel,
};

use crate::vision::VisionBackend;

/// Failure a mock should report instead of data.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Missing or rejected credentials.
    Config(String),
    /// Upstream call failed.
    Upstream(String),
}

impl MockFailure {
    fn to_error(&self, upstream: fn(String) -> Error) -> Error {
        match self {
            MockFailure::Config(msg) => Error::Config(msg.clone()),
            MockFailure::Upstream(msg) => upstream(msg.clone()),
        }
    }
}

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, input: &str) {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(input.to_string());
    }

    fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

// =============================================================================
// LABEL DETECTOR
// =============================================================================

/// Label detector returning a fixed detection.
#[derive(Clone, Default)]
pub struct MockLabelDetector {
    detection: Detection,
    failure: Option<MockFailure>,
    calls: CallLog,
}

impl MockLabelDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label annotation.
    pub fn with_label(mut self, description: impl Into<String>, score: f64) -> Self {
        self.detection.labels.push(ScoredLabel {
            description: description.into(),
            score,
        });
        self
    }

    /// Add a localized object without a bounding box.
    pub fn with_object(mut self, name: impl Into<String>, score: f64) -> Self {
        self.detection.objects.push(LocalizedObject {
            name: name.into(),
            score,
            bounding_box: None,
        });
        self
    }

    /// Fail every call.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Number of `detect` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.snapshot().len()
    }
}

#[async_trait]
impl LabelDetector for MockLabelDetector {
    async fn detect(&self, image: &[u8]) -> Result<Detection> {
        self.calls.push(&format!("{} bytes", image.len()));
        if let Some(failure) = &self.failure {
            return Err(failure.to_error(Error::Detection));
        }
        Ok(self.detection.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        !matches!(self.failure, Some(MockFailure::Config(_)))
    }
}

// =============================================================================
// NUTRITION DATABASE
// =============================================================================

/// Nutrition database answering from an in-memory map.
#[derive(Clone, Default)]
pub struct MockNutritionDatabase {
    records: HashMap<String, MacroRecord>,
    failure: Option<MockFailure>,
    latency: Duration,
    calls: CallLog,
}

impl MockNutritionDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` (case-insensitive) with `record`.
    pub fn with_record(mut self, query: impl Into<String>, record: MacroRecord) -> Self {
        self.records.insert(query.into().to_lowercase(), record);
        self
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Delay every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queries received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.snapshot()
    }
}

#[async_trait]
impl NutritionDatabase for MockNutritionDatabase {
    async fn search_macros(&self, query: &str) -> Result<Option<MacroRecord>> {
        self.calls.push(query);
        simulate_latency(self.latency).await;
        if let Some(failure) = &self.failure {
            return Err(failure.to_error(Error::NutritionLookup));
        }
        Ok(self.records.get(&query.to_lowercase()).copied())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// MACRO ESTIMATOR
// =============================================================================

/// Macro estimator returning fixed components.
#[derive(Clone, Default)]
pub struct MockMacroEstimator {
    components: Vec<FoodComponent>,
    failure: Option<MockFailure>,
    latency: Duration,
    calls: CallLog,
}

impl MockMacroEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component to every estimate.
    pub fn with_component(mut self, name: impl Into<String>, macros: MacroRecord) -> Self {
        self.components.push(FoodComponent {
            name: name.into(),
            macros,
        });
        self
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Labels received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.snapshot()
    }
}

#[async_trait]
impl MacroEstimator for MockMacroEstimator {
    /// With no components configured, behaves like an unparseable reply.
    async fn estimate(&self, _image: &[u8], label: &str) -> Result<Option<MealEstimate>> {
        self.calls.push(label);
        simulate_latency(self.latency).await;
        if let Some(failure) = &self.failure {
            return Err(failure.to_error(Error::Inference));
        }
        if self.components.is_empty() {
            return Ok(None);
        }
        Ok(Some(MealEstimate::from_components(self.components.clone())))
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}

// =============================================================================
// VISION BACKEND
// =============================================================================

/// Vision backend replying with fixed text.
#[derive(Clone, Default)]
pub struct MockVisionBackend {
    reply: String,
    prompts: CallLog,
}

impl MockVisionBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: CallLog::default(),
        }
    }

    /// Prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.snapshot()
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    async fn describe_image(
        &self,
        _image_data: &[u8],
        _mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        self.prompts.push(prompt);
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::LlmMacroEstimator;

    #[tokio::test]
    async fn test_detector_failure_kinds() {
        let detector = MockLabelDetector::new().with_failure(MockFailure::Config("no key".into()));
        assert!(!detector.is_configured());
        assert!(detector.detect(b"x").await.unwrap_err().is_config());

        let detector =
            MockLabelDetector::new().with_failure(MockFailure::Upstream("timeout".into()));
        assert!(detector.is_configured());
        let err = detector.detect(b"x").await.unwrap_err();
        assert!(matches!(err, Error::Detection(_)));
        assert_eq!(detector.call_count(), 1);
    }

    #[tokio::test]
    async fn test_database_is_case_insensitive() {
        let db = MockNutritionDatabase::new()
            .with_record("Apple", MacroRecord::new(52.0, 0.3, 14.0, 0.2));
        assert!(db.search_macros("apple").await.unwrap().is_some());
        assert!(db.search_macros("pear").await.unwrap().is_none());
        assert_eq!(db.calls(), vec!["apple", "pear"]);
    }

    #[tokio::test]
    async fn test_llm_estimator_over_mock_backend() {
        let backend = Arc::new(MockVisionBackend::new(
            "```json\n{\"components\": [{\"name\": \"egg\", \"calories\": 78, \"protein\": 6, \"carbs\": 0.6, \"fat\": 5}], \"total\": {\"calories\": 1}}\n```",
        ));
        let estimator = LlmMacroEstimator::new(backend.clone());
        let estimate = estimator.estimate(b"img", "egg").await.unwrap().unwrap();
        assert_eq!(estimate.total().calories, 78.0);
        assert_eq!(backend.prompts().len(), 1);
        assert!(backend.prompts()[0].contains("\"egg\""));
    }
}
