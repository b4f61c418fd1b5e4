//! Health check handler.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Whether each collaborator is configured.
#[derive(Debug, Serialize)]
pub struct CollaboratorStatus {
    pub label_detector: bool,
    pub nutrition_database: bool,
    pub vision_llm: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub collaborators: CollaboratorStatus,
}

/// Liveness plus collaborator configuration. Makes no upstream calls.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        collaborators: CollaboratorStatus {
            label_detector: state.analyzer.detector().is_configured(),
            nutrition_database: state.analyzer.has_database(),
            vision_llm: state.analyzer.has_estimator(),
        },
    })
}
