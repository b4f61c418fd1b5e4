//! HTTP handlers for macrolens-api.

pub mod analyze;
pub mod detection;
pub mod health;
pub mod macros;

use axum::extract::Multipart;

use crate::ApiError;

/// Multipart field names accepted for the uploaded image.
pub const IMAGE_FIELDS: &[&str] = &["file", "image"];

/// Read the uploaded image from a multipart form.
///
/// The first field named `file` or `image` is used; other fields are
/// ignored. The bytes must sniff as an image regardless of the declared
/// content type.
pub async fn read_image_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let is_image_field = field
            .name()
            .is_some_and(|name| IMAGE_FIELDS.contains(&name));
        if is_image_field && file_data.is_none() {
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let image = file_data
        .ok_or_else(|| ApiError::BadRequest("Missing file in multipart form".to_string()))?;

    if image.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".into()));
    }

    if !infer::is_image(&image) {
        let detected = infer::get(&image)
            .map(|kind| kind.mime_type())
            .unwrap_or("unknown");
        return Err(ApiError::BadRequest(format!(
            "Uploaded file is not an image (detected {})",
            detected
        )));
    }

    Ok(image)
}
