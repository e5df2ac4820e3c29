//! `POST /api/normalize` — cluster raw test names without building a matrix.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{normalize_with_fallback, NormalizationStatus};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::comparison::NameMapping;

#[derive(Deserialize)]
pub struct NormalizeRequest {
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Serialize)]
pub struct NormalizeResponse {
    /// Total over the requested names.
    pub mapping: NameMapping,
    #[serde(flatten)]
    pub status: NormalizationStatus,
}

pub async fn normalize(
    State(ctx): State<ApiContext>,
    Json(req): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let names: BTreeSet<String> = req
        .names
        .into_iter()
        .filter(|n| !n.trim().is_empty())
        .collect();

    let (mut mapping, status) = normalize_with_fallback(&ctx, &names).await;
    mapping.complete_with_identity(names.iter().map(String::as_str));

    Ok(Json(NormalizeResponse { mapping, status }))
}
