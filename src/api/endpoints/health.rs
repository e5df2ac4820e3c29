//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub llm_available: bool,
}

/// `GET /api/health` — service status plus whether the configured model is
/// installed on the language model backend.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let llm = ctx.normalizer.llm();
    let model = ctx.normalizer.model().to_string();

    let probe_model = model.clone();
    let llm_available = tokio::task::spawn_blocking(move || llm.is_model_available(&probe_model))
        .await
        .map_err(|e| ApiError::Internal(format!("Health probe task failed: {e}")))?
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Language model backend unavailable");
            false
        });

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model,
        llm_available,
    }))
}
