//! Core traits for the external collaborators.
//!
//! The analysis pipeline only depends on these traits, so every
//! collaborator can be swapped for a test double.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Image-label API: image bytes in, ranked labels and localized objects out.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Detect labels and objects in an image.
    ///
    /// Missing or rejected credentials are reported as [`crate::Error::Config`].
    async fn detect(&self, image: &[u8]) -> Result<Detection>;

    /// Name of the detector for logs and health output.
    fn name(&self) -> &str;

    /// Whether credentials are present. Unconfigured detectors fail every call.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Nutrition database searched by free-text food name.
#[async_trait]
pub trait NutritionDatabase: Send + Sync {
    /// Macros of the best match for `query`, or `None` when nothing matched.
    async fn search_macros(&self, query: &str) -> Result<Option<MacroRecord>>;

    fn name(&self) -> &str;
}

/// Vision LLM that estimates the macros of a plate from its photo.
#[async_trait]
pub trait MacroEstimator: Send + Sync {
    /// Estimate components and their macros for `label` as seen in `image`.
    ///
    /// `Ok(None)` means the model answered but nothing usable could be
    /// parsed.
    async fn estimate(&self, image: &[u8], label: &str) -> Result<Option<MealEstimate>>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
