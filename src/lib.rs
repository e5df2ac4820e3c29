pub mod abbreviations;
pub mod api;
pub mod comparison;
pub mod config;
pub mod export;
pub mod models;
pub mod normalization;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{start_server_on, ApiContext, ServerError};
use crate::config::{AppConfig, ConfigError};
use crate::export::{ExportError, PdfRenderClient};
use crate::normalization::{LlmClient, NameNormalizer, NormalizationError, OllamaClient};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Language model client: {0}")]
    Llm(#[from] NormalizationError),
    #[error("PDF render client: {0}")]
    PdfRenderer(#[from] ExportError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Startup task failed: {0}")]
    Task(String),
}

/// Wire the service together from the environment and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        version = config::APP_VERSION,
        llm_url = %config.llm_url,
        model = %config.llm_model,
        pdf_renderer = config.pdf_render_url.as_deref().unwrap_or("local"),
        "Starting {}",
        config::APP_NAME
    );

    // The blocking reqwest client owns a runtime; build it off the async threads.
    let llm_url = config.llm_url.clone();
    let llm_timeout = config.llm_timeout;
    let llm: Arc<dyn LlmClient> = Arc::new(
        tokio::task::spawn_blocking(move || OllamaClient::new(&llm_url, llm_timeout))
            .await
            .map_err(|e| StartupError::Task(e.to_string()))??,
    );

    let mut ctx = ApiContext::new(Arc::new(NameNormalizer::new(llm, config.llm_model.clone())));
    if let Some(url) = &config.pdf_render_url {
        ctx = ctx.with_pdf_renderer(PdfRenderClient::new(url, config.pdf_timeout)?);
    }

    let server = start_server_on(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    server.stop().await;
    Ok(())
}
