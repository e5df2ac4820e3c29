use std::time::Duration;

use serde::Serialize;

use super::ExportError;

/// Client for an external headless-browser HTML→PDF service.
///
/// The service accepts `{"html", "filename"}` and answers with the PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfRenderClient {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
    filename: &'a str,
}

impl PdfRenderClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: url.trim().to_string(),
            client,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn render(&self, html: &str, filename: &str) -> Result<Vec<u8>, ExportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&RenderRequest { html, filename })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::RenderService {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExportError::HttpClient(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ExportError::RenderService {
                status: status.as_u16(),
                body: "empty response body".into(),
            });
        }

        tracing::debug!(bytes = bytes.len(), "PDF rendered by remote service");
        Ok(bytes.to_vec())
    }

    fn map_send_error(&self, e: reqwest::Error) -> ExportError {
        if e.is_connect() {
            ExportError::RenderConnection(self.url.clone())
        } else if e.is_timeout() {
            ExportError::HttpClient(format!(
                "Render request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            ExportError::HttpClient(e.to_string())
        }
    }
}
