//! Comparison exports: CSV, JSON, HTML and PDF.
//!
//! Every exporter is a pure function of the `ComparisonMatrix` plus the
//! caller's category selection. PDF goes through a headless-browser render
//! service when one is configured, and through a local text layout otherwise.

pub mod csv;
pub mod disposition;
pub mod html;
pub mod json;
pub mod pdf;
pub mod render_client;

pub use self::csv::export_csv;
pub use disposition::content_disposition;
pub use html::{export_html, CategoryMatcher, ReportSection, SectionLayout};
pub use json::{build_json_export, export_json, parse_json_export, JsonExport};
pub use pdf::render_matrix_pdf;
pub use render_client::PdfRenderClient;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(String),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("PDF render service is not reachable at {0}")]
    RenderConnection(String),

    #[error("PDF render service returned error (status {status}): {body}")]
    RenderService { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Html => "text/html; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// `blood-test-comparison-YYYY-MM-DD.<ext>`
pub fn default_filename(format: ExportFormat, today: NaiveDate) -> String {
    format!(
        "blood-test-comparison-{}.{}",
        today.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Client-supplied filename reduced to its last path component, with the
/// format's extension enforced. Falls back to the default name when empty.
pub fn resolve_filename(requested: Option<&str>, format: ExportFormat, today: NaiveDate) -> String {
    let base = requested
        .map(|r| r.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("").trim())
        .filter(|r| !r.is_empty() && *r != "." && *r != "..");

    match base {
        None => default_filename(format, today),
        Some(name) => {
            let ext = format!(".{}", format.extension());
            if name.to_ascii_lowercase().ends_with(&ext) {
                name.to_string()
            } else {
                format!("{name}{ext}")
            }
        }
    }
}
