use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::TestStatus;

/// Leading decimal literal, the way lab values are usually written ("13.5 g/dL").
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

/// Comma thousands grouping ("1,050", "12,400.5").
static THOUSANDS_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d{1,3}(?:,\d{3})+(?:\.\d+)?(?:[^\d,.]|$)").unwrap());

/// Decimal comma with one or two fraction digits ("13,5", "4,25 mmol/L").
static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+,\d{1,2}(?:[^\d,.]|$)").unwrap());

/// A measured value: labs report numbers, but also "positive", "<5", "trace".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TestValue {
    Number(f64),
    Text(String),
}

impl Default for TestValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl TestValue {
    /// Numeric reading of the value, if there is one.
    ///
    /// Text values yield their leading number. A comma followed by one or
    /// two digits is a decimal point; comma groups of three are thousands.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(text) => parse_leading_number(text),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl<'de> Deserialize<'de> for TestValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Text(n.to_string()),
            },
            Some(serde_json::Value::String(s)) => Self::Text(s),
            Some(other) => Self::Text(other.to_string()),
        })
    }
}

pub fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let normalized;
    let candidate = if THOUSANDS_GROUPED.is_match(trimmed) {
        normalized = trimmed.replace(',', "");
        normalized.as_str()
    } else if DECIMAL_COMMA.is_match(trimmed) {
        normalized = trimmed.replacen(',', ".", 1);
        normalized.as_str()
    } else {
        trimmed
    };
    LEADING_NUMBER
        .find(candidate)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn lenient_status<'de, D>(deserializer: D) -> Result<TestStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| TestStatus::from_lenient(&s)).unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_string(deserializer)?;
    Ok(if value.trim().is_empty() { None } else { Some(value) })
}

/// One measured parameter from one report, as extracted upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestObservation {
    pub name: String,
    #[serde(default)]
    pub value: TestValue,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: String,
    #[serde(default, alias = "reference_range", alias = "normalRange", deserialize_with = "lenient_string")]
    pub reference_range: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: TestStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub date: Option<String>,
}

/// One analysed document held for the duration of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    #[serde(default)]
    pub tests: Vec<TestObservation>,
    #[serde(default, alias = "patient_info")]
    pub patient_info: Option<PatientInfo>,
    #[serde(default, alias = "source_file_name", alias = "fileName")]
    pub source_file_name: Option<String>,
}

impl ReportSnapshot {
    /// Raw report date, trimmed; `None` when missing or blank.
    pub fn date(&self) -> Option<&str> {
        self.patient_info
            .as_ref()
            .and_then(|p| p.date.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
