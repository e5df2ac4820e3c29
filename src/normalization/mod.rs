//! Test-name normalization through an external language model.
//!
//! One request per distinct name set: the model clusters spelling and
//! abbreviation variants ("Hemoglobin (Hb)", "Hemoglobin (HGB)") under one
//! label. The client only reports success or failure; substituting the
//! identity mapping on failure is the caller's decision.

pub mod client;
pub mod llm;
pub mod parser;
pub mod prompt;

pub use client::NameNormalizer;
pub use llm::{LlmClient, MockLlmClient, OllamaClient};
pub use parser::{extract_json_object, parse_mapping_response};
pub use prompt::{build_normalization_prompt, NORMALIZATION_SYSTEM_PROMPT};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("Language model is not reachable at {0}")]
    LlmConnection(String),

    #[error("Language model returned error (status {status}): {body}")]
    LlmError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Normalization task failed: {0}")]
    Task(String),

    #[error("Normalization cache lock poisoned")]
    LockPoisoned,
}
