//! Text-only macro lookup.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use macrolens_core::LabelResult;

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct MacrosQuery {
    /// Food phrase, e.g. "3 tacos".
    pub label: Option<String>,
}

/// Resolve macros for a typed food phrase.
///
/// Tries the static table, then the nutrition database, then the generic
/// estimate. There is no image, so the vision LLM is never consulted.
///
/// # Returns
/// - 200 OK with a single result entry
/// - 400 Bad Request if `label` is missing or blank
pub async fn get_macros(
    State(state): State<AppState>,
    Query(query): Query<MacrosQuery>,
) -> Result<Json<LabelResult>, ApiError> {
    let label = query
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required query parameter: label".into()))?;

    Ok(Json(state.analyzer.resolve_text(label).await))
}
