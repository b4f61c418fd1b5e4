//! Image analysis handler: photo in, per-food macros out.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use macrolens_core::{CandidateLabel, LabelResult};

use super::read_image_upload;
use crate::services::ImageAnalysis;
use crate::{ApiError, AppState};

/// Shown when the label detector has no usable credentials.
pub const DETECTOR_NOT_CONFIGURED: &str =
    "Google Vision API is not configured properly. Please check server credentials.";

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<LabelResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<CandidateLabel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    fn success(analysis: ImageAnalysis) -> Self {
        Self {
            success: true,
            results: Some(analysis.results),
            candidates: Some(analysis.candidates),
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            candidates: None,
            error: Some(message.into()),
        }
    }
}

/// Detect foods in an uploaded photo and resolve macros for each.
///
/// Served at both `/api/analyze-image` and `/analyze`.
///
/// # Multipart Fields
/// - `file` (or `image`): image file (required)
///
/// # Returns
/// - 200 OK with `success: true`, one result per detected food, and candidates
/// - 200 OK with `success: false` and an error message if the detector fails
/// - 400 Bad Request if the upload is missing or not an image
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let image = read_image_upload(multipart).await?;

    let response = match state.analyzer.analyze_image(&image).await {
        Ok(analysis) => AnalyzeResponse::success(analysis),
        Err(e) if e.is_config() => {
            tracing::error!(
                detector = state.analyzer.detector().name(),
                error = %e,
                "Label detector is not configured"
            );
            AnalyzeResponse::failure(DETECTOR_NOT_CONFIGURED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Image analysis failed");
            AnalyzeResponse::failure(format!("Error analyzing food: {}", e))
        }
    };

    Ok(Json(response))
}
