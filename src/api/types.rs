//! Shared state and request types for the API layer.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::export::{PdfRenderClient, SectionLayout};
use crate::models::ReportSnapshot;
use crate::normalization::NameNormalizer;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub normalizer: Arc<NameNormalizer>,
    /// Remote HTML→PDF service; local rendering when `None`.
    pub pdf_renderer: Option<Arc<PdfRenderClient>>,
    pub layout: Arc<SectionLayout>,
}

impl ApiContext {
    pub fn new(normalizer: Arc<NameNormalizer>) -> Self {
        Self {
            normalizer,
            pdf_renderer: None,
            layout: Arc::new(SectionLayout::default()),
        }
    }

    pub fn with_pdf_renderer(mut self, renderer: PdfRenderClient) -> Self {
        self.pdf_renderer = Some(Arc::new(renderer));
        self
    }

    pub fn with_layout(mut self, layout: SectionLayout) -> Self {
        self.layout = Arc::new(layout);
        self
    }
}

/// Body of `POST /api/compare` and the export routes.
#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub reports: Vec<ReportSnapshot>,
    /// Category filter; absent or empty means all categories.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Requested download name (export routes only).
    #[serde(default)]
    pub filename: Option<String>,
}

impl ComparisonRequest {
    pub fn selected_categories(&self) -> BTreeSet<String> {
        self.categories
            .iter()
            .flatten()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}
