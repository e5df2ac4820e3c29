//! API endpoint handlers.

pub mod compare;
pub mod export;
pub mod health;
pub mod normalize;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::comparison::{collect_raw_names, reconcile, ComparisonMatrix, NameMapping};
use crate::models::ReportSnapshot;

/// Whether names were clustered by the model or left as-is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizationStatus {
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Run the normalizer, degrading to an identity mapping on failure.
///
/// On success the mapping may be partial and callers complete it with
/// identity. On failure every name maps to itself.
pub(crate) async fn normalize_with_fallback(
    ctx: &ApiContext,
    names: &BTreeSet<String>,
) -> (NameMapping, NormalizationStatus) {
    match ctx.normalizer.normalize(names).await {
        Ok(mapping) => (mapping, NormalizationStatus::default()),
        Err(e) => {
            tracing::warn!(error = %e, names = names.len(), "Name normalization failed, using raw names");
            (
                NameMapping::identity(names.iter().map(String::as_str)),
                NormalizationStatus {
                    fallback: true,
                    warning: Some(format!(
                        "Test names could not be matched across reports ({e}). Results are shown under their original names."
                    )),
                },
            )
        }
    }
}

/// Normalize, then reconcile. An empty report list is rejected.
pub(crate) async fn build_matrix(
    ctx: &ApiContext,
    reports: Vec<ReportSnapshot>,
) -> Result<(ComparisonMatrix, NormalizationStatus), ApiError> {
    if reports.is_empty() {
        return Err(ApiError::BadRequest("No reports to compare".into()));
    }

    let names = collect_raw_names(&reports);
    let (mapping, status) = normalize_with_fallback(ctx, &names).await;
    let matrix = reconcile(reports, mapping);

    tracing::info!(
        reports = matrix.reports().len(),
        dates = matrix.columns().len(),
        tests = matrix.tests().len(),
        fallback = status.fallback,
        "Comparison built"
    );
    Ok((matrix, status))
}
