//! Maps transport/service failures onto the analysis error taxonomy.
//!
//! Structured signals win when present (HTTP 429, client-side timeout). The
//! provider otherwise exposes only human-readable error text, so the fallback
//! is a substring match on that text.

use crate::analysis::{truncate_chars, AnalysisError};
use crate::llm_client::LlmError;

const MAX_DETAIL_CHARS: usize = 100;

pub fn classify_failure(err: &LlmError) -> AnalysisError {
    match err {
        LlmError::Timeout(_) => return AnalysisError::TimedOut,
        LlmError::Http(e) if e.is_timeout() => return AnalysisError::TimedOut,
        _ => {}
    }

    if err.status() == Some(429) {
        return AnalysisError::RateLimited;
    }

    classify_message(&err.detail())
}

/// Case-insensitive; "rate_limit" (the provider's error code spelling) counts as "rate limit".
pub fn classify_message(message: &str) -> AnalysisError {
    let lower = message.to_lowercase().replace('_', " ");

    if lower.contains("rate limit") {
        AnalysisError::RateLimited
    } else if lower.contains("timeout") {
        AnalysisError::TimedOut
    } else {
        AnalysisError::ServiceError(truncate_chars(message, MAX_DETAIL_CHARS).to_string())
    }
}
