//! `POST /api/compare/export/:format` — file downloads.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};

use super::build_matrix;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ComparisonRequest};
use crate::comparison::ComparisonMatrix;
use crate::export::{
    content_disposition, export_csv, export_html, export_json, render_matrix_pdf,
    resolve_filename, ExportFormat,
};

pub async fn download(
    State(ctx): State<ApiContext>,
    Path(format): Path<String>,
    Json(req): Json<ComparisonRequest>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;
    let selected = req.selected_categories();
    let requested_name = req.filename;
    let (matrix, _) = build_matrix(&ctx, req.reports).await?;

    let now = Utc::now();
    let filename = resolve_filename(requested_name.as_deref(), format, now.date_naive());

    let body = match format {
        ExportFormat::Csv => export_csv(&matrix, &selected)?,
        ExportFormat::Json => export_json(&matrix, &selected, now)?,
        ExportFormat::Html => export_html(&matrix, &selected, &ctx.layout, now.date_naive()).into_bytes(),
        ExportFormat::Pdf => render_pdf(&ctx, matrix, selected, &filename, now.date_naive()).await?,
    };

    tracing::info!(format = format.extension(), bytes = body.len(), %filename, "Comparison exported");

    Ok((
        [
            (CONTENT_TYPE, format.content_type().to_string()),
            (CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response())
}

async fn render_pdf(
    ctx: &ApiContext,
    matrix: ComparisonMatrix,
    selected: BTreeSet<String>,
    filename: &str,
    generated_on: NaiveDate,
) -> Result<Vec<u8>, ApiError> {
    match &ctx.pdf_renderer {
        Some(renderer) => {
            let html = export_html(&matrix, &selected, &ctx.layout, generated_on);
            Ok(renderer.render(&html, filename).await?)
        }
        None => {
            let layout = Arc::clone(&ctx.layout);
            tokio::task::spawn_blocking(move || render_matrix_pdf(&matrix, &selected, &layout))
                .await
                .map_err(|e| ApiError::Internal(format!("PDF task failed: {e}")))?
                .map_err(ApiError::from)
        }
    }
}
