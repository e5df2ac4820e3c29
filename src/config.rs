use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "labcompare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_LLM_URL: &str = "http://localhost:11434";
const DEFAULT_LLM_MODEL: &str = "medgemma";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PDF_TIMEOUT_SECS: u64 = 60;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", APP_NAME)
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime configuration, read from `LABCOMPARE_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    /// Headless-browser HTML→PDF service. `None` renders PDFs locally.
    pub pdf_render_url: Option<String>,
    pub pdf_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("LABCOMPARE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: "LABCOMPARE_BIND",
                value: bind_raw.clone(),
            })?;

        let llm_timeout = parse_secs(
            "LABCOMPARE_LLM_TIMEOUT_SECS",
            get("LABCOMPARE_LLM_TIMEOUT_SECS"),
            DEFAULT_LLM_TIMEOUT_SECS,
        )?;
        let pdf_timeout = parse_secs(
            "LABCOMPARE_PDF_TIMEOUT_SECS",
            get("LABCOMPARE_PDF_TIMEOUT_SECS"),
            DEFAULT_PDF_TIMEOUT_SECS,
        )?;

        Ok(Self {
            bind_addr,
            llm_url: get("LABCOMPARE_LLM_URL")
                .unwrap_or_else(|| DEFAULT_LLM_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_model: get("LABCOMPARE_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout,
            pdf_render_url: get("LABCOMPARE_PDF_RENDER_URL"),
            pdf_timeout,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            llm_url: DEFAULT_LLM_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            pdf_render_url: None,
            pdf_timeout: Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS),
        }
    }
}

fn parse_secs(
    var: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(Duration::from_secs(default)),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidValue { var, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.llm_url, "http://localhost:11434");
        assert_eq!(config.llm_model, "medgemma");
        assert_eq!(config.llm_timeout, Duration::from_secs(120));
        assert!(config.pdf_render_url.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("LABCOMPARE_BIND", "0.0.0.0:9000"),
            ("LABCOMPARE_LLM_URL", "http://llm.internal:11434/"),
            ("LABCOMPARE_LLM_MODEL", "llama3:8b"),
            ("LABCOMPARE_LLM_TIMEOUT_SECS", "30"),
            ("LABCOMPARE_PDF_RENDER_URL", "http://renderer:3000/pdf"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.llm_url, "http://llm.internal:11434");
        assert_eq!(config.llm_model, "llama3:8b");
        assert_eq!(config.llm_timeout, Duration::from_secs(30));
        assert_eq!(config.pdf_render_url.as_deref(), Some("http://renderer:3000/pdf"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("LABCOMPARE_PDF_RENDER_URL", "  ")])).unwrap();
        assert!(config.pdf_render_url.is_none());
    }

    #[test]
    fn invalid_bind_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("LABCOMPARE_BIND", "nowhere")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "LABCOMPARE_BIND",
                value: "nowhere".into()
            }
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("LABCOMPARE_LLM_TIMEOUT_SECS", "0")]))
            .is_err());
    }

    #[test]
    fn default_log_filter_names_crate() {
        assert!(default_log_filter().starts_with("labcompare=info"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
