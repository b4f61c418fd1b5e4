//! Label detection without macro resolution, for checking detector output.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use super::read_image_upload;
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    /// Food phrases after label post-processing.
    pub detected_labels: Vec<String>,
}

/// Run the label detector on an uploaded image.
///
/// # Multipart Fields
/// - `file` (or `image`): image file (required)
///
/// # Returns
/// - 200 OK with the detected food phrases
/// - 400 Bad Request if the upload is missing or not an image
/// - 500 Internal Server Error if the detector fails
pub async fn test_food_detection(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DetectionResponse>, ApiError> {
    let image = read_image_upload(multipart).await?;

    let detected_labels = state.analyzer.detect_labels(&image).await.map_err(|e| {
        tracing::error!(error = %e, "Food detection failed");
        ApiError::Internal(format!("Error detecting food: {}", e))
    })?;

    Ok(Json(DetectionResponse { detected_labels }))
}
