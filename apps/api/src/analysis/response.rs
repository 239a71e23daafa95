//! Defensive parsing of the model's reply.
//!
//! The model is an untrusted producer of structured data. Its text goes through
//! four stages, each a pure function:
//! 1. `strip_code_fences`: drop a ```json … ``` wrapper the model was told not to add
//! 2. `parse_payload`: JSON object or `InvalidResponseFormat`
//! 3. `backfill_defaults`: fill any of the three keys that is missing or null
//! 4. `normalize`: clamp the score, truncate keywords and summary

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::{truncate_chars, AnalysisError};

pub const DEFAULT_MATCH_PERCENTAGE: u8 = 50;
pub const DEFAULT_PROFILE_SUMMARY: &str = "Analysis completed.";
pub const MAX_KEYWORDS: usize = 10;
pub const MAX_SUMMARY_CHARS: usize = 500;

static RE_OPEN_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*").unwrap());
static RE_CLOSE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Validated, clamped fields of a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchFields {
    pub match_percentage: u8,
    pub missing_keywords: Vec<String>,
    pub profile_summary: String,
}

/// The three contract keys after backfilling; values are still unvalidated JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub match_percentage: Value,
    pub missing_keywords: Value,
    pub profile_summary: Value,
}

/// Runs all four stages.
pub fn parse_match_response(text: &str) -> Result<MatchFields, AnalysisError> {
    let stripped = strip_code_fences(text);
    let payload = parse_payload(&stripped)?;
    Ok(normalize(backfill_defaults(payload)))
}

pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    let opened = RE_OPEN_FENCE.replace(text, "");
    RE_CLOSE_FENCE.replace(&opened, "").into_owned()
}

/// Anything other than a JSON object violates the contract.
pub fn parse_payload(text: &str) -> Result<Map<String, Value>, AnalysisError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(AnalysisError::InvalidResponseFormat),
    }
}

pub fn backfill_defaults(mut payload: Map<String, Value>) -> RawMatch {
    let mut take = |key: &str, default: Value| match payload.remove(key) {
        Some(Value::Null) | None => default,
        Some(v) => v,
    };

    RawMatch {
        match_percentage: take("match_percentage", Value::from(DEFAULT_MATCH_PERCENTAGE)),
        missing_keywords: take("missing_keywords", Value::Array(Vec::new())),
        profile_summary: take("profile_summary", Value::from(DEFAULT_PROFILE_SUMMARY)),
    }
}

pub fn normalize(raw: RawMatch) -> MatchFields {
    MatchFields {
        match_percentage: clamp_percentage(&raw.match_percentage),
        missing_keywords: truncate_keywords(&raw.missing_keywords),
        profile_summary: truncate_summary(&raw.profile_summary),
    }
}

/// Clamps into [0, 100] and drops any fractional part (87.6 → 87).
/// Numeric strings are accepted; any other shape falls back to the default.
pub fn clamp_percentage(value: &Value) -> u8 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => n.clamp(0.0, 100.0).trunc() as u8,
        _ => DEFAULT_MATCH_PERCENTAGE,
    }
}

/// First `MAX_KEYWORDS` entries, order preserved, no dedup.
pub fn truncate_keywords(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .take(MAX_KEYWORDS)
            .filter_map(keyword_text)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn keyword_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn truncate_summary(value: &Value) -> String {
    match value {
        Value::String(s) => truncate_chars(s, MAX_SUMMARY_CHARS).to_string(),
        other => truncate_chars(&other.to_string(), MAX_SUMMARY_CHARS).to_string(),
    }
}
