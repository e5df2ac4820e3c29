use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::ExportError;
use crate::comparison::ComparisonMatrix;
use crate::models::{TestStatus, TestValue, Trend};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    pub export_date: String,
    pub total_tests: usize,
    pub total_dates: usize,
    pub dates: Vec<String>,
    pub tests: Vec<JsonTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTest {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub normal_range: String,
    /// Other raw names clustered under `name`.
    pub alternative_names: Vec<String>,
    pub values: Vec<JsonValue>,
}

/// One cell; everything but `date` and `trend` is null when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonValue {
    pub date: String,
    pub value: Option<TestValue>,
    pub unit: Option<String>,
    pub status: Option<TestStatus>,
    pub normal_range: Option<String>,
    pub trend: Trend,
}

pub fn build_json_export(
    matrix: &ComparisonMatrix,
    selected: &BTreeSet<String>,
    exported_at: DateTime<Utc>,
) -> JsonExport {
    let dates: Vec<String> = matrix
        .columns()
        .iter()
        .map(|c| c.display_label().to_string())
        .collect();

    let tests: Vec<JsonTest> = matrix
        .filter_categories(selected)
        .into_iter()
        .map(|test| JsonTest {
            name: test.canonical_name.clone(),
            category: test.category.clone(),
            unit: test.unit.clone(),
            normal_range: test.reference_range.clone(),
            alternative_names: test
                .original_names
                .iter()
                .filter(|n| **n != test.canonical_name)
                .cloned()
                .collect(),
            values: dates
                .iter()
                .enumerate()
                .map(|(col, date)| {
                    let obs = matrix.lookup(&test.canonical_name, col);
                    JsonValue {
                        date: date.clone(),
                        value: obs.map(|o| o.value.clone()),
                        unit: obs.map(|o| o.unit.clone()),
                        status: obs.map(|o| o.status),
                        normal_range: obs.map(|o| o.reference_range.clone()),
                        trend: matrix.trend(&test.canonical_name, col),
                    }
                })
                .collect(),
        })
        .collect();

    JsonExport {
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        total_tests: tests.len(),
        total_dates: dates.len(),
        dates,
        tests,
    }
}

/// Pretty-printed JSON document.
pub fn export_json(
    matrix: &ComparisonMatrix,
    selected: &BTreeSet<String>,
    exported_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let export = build_json_export(matrix, selected, exported_at);
    Ok(serde_json::to_vec_pretty(&export)?)
}

pub fn parse_json_export(bytes: &[u8]) -> Result<JsonExport, ExportError> {
    Ok(serde_json::from_slice(bytes)?)
}
