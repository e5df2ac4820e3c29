//! Tolerant extraction of a JSON object from free-text model output.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::NormalizationError;
use crate::comparison::NameMapping;

/// Find and parse the JSON object in a model response.
///
/// Accepted, in order: the whole response when it is a JSON object, a ```json fenced block,
/// a bare ``` fenced block, the first balanced `{…}` span in the text.
pub fn extract_json_object(response: &str) -> Result<Map<String, Value>, NormalizationError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(NormalizationError::MalformedResponse("Empty response".into()));
    }

    let mut last_error = None;
    for candidate in candidates(trimmed) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => return Ok(map),
            Ok(_) => {
                last_error = Some(NormalizationError::MalformedResponse(
                    "JSON is not an object".into(),
                ))
            }
            Err(e) => last_error = Some(NormalizationError::JsonParsing(e.to_string())),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        NormalizationError::MalformedResponse("No JSON object found".into())
    }))
}

fn candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    if text.starts_with('{') {
        out.push(text);
    }
    if let Some(block) = fenced_block(text, "```json") {
        out.push(block);
    }
    if let Some(block) = fenced_block(text, "```") {
        out.push(block);
    }
    if let Some(span) = balanced_object(text) {
        out.push(span);
    }
    out
}

fn fenced_block<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let end = text[start..].find("```")?;
    Some(text[start..start + end].trim())
}

/// First `{…}` span with balanced braces, skipping braces inside strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the clustering response into a mapping restricted to `names`.
///
/// Keys not among the requested names and non-string labels are dropped;
/// names the model skipped stay unmapped (they resolve to themselves).
pub fn parse_mapping_response(
    response: &str,
    names: &[String],
) -> Result<NameMapping, NormalizationError> {
    let object = extract_json_object(response)?;
    let requested: BTreeSet<&str> = names.iter().map(String::as_str).collect();

    let mut mapping = NameMapping::new();
    let mut dropped = 0usize;
    for (raw, label) in object {
        match label {
            Value::String(label) if requested.contains(raw.as_str()) && !label.trim().is_empty() => {
                mapping.insert(raw, label.trim());
            }
            _ => dropped += 1,
        }
    }

    if mapping.is_empty() && !names.is_empty() {
        return Err(NormalizationError::MalformedResponse(
            "Response maps none of the requested names".into(),
        ));
    }

    let missing = names.iter().filter(|n| !mapping.contains(n)).count();
    if dropped > 0 || missing > 0 {
        tracing::debug!(dropped, missing, "Partial normalization response");
    }

    Ok(mapping)
}
