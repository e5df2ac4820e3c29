//! `POST /api/compare` — the interactive comparison table.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{build_matrix, NormalizationStatus};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ComparisonRequest};
use crate::comparison::{CanonicalTest, TableView};

#[derive(Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub table: TableView,
    pub tests: Vec<CanonicalTest>,
    pub normalization: NormalizationStatus,
}

pub async fn compare(
    State(ctx): State<ApiContext>,
    Json(req): Json<ComparisonRequest>,
) -> Result<Json<CompareResponse>, ApiError> {
    let selected = req.selected_categories();
    let (matrix, normalization) = build_matrix(&ctx, req.reports).await?;

    let tests = matrix
        .filter_categories(&selected)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(CompareResponse {
        table: matrix.table_view(&selected),
        tests,
        normalization,
    }))
}
