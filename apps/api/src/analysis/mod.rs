// Match analysis: résumé vs job description, scored by the LLM.
// All provider calls go through llm_client; there is no direct HTTP here.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{ChatCompletion, Credential, LlmClient, LlmError, LlmSettings};

pub mod classify;
pub mod handlers;
pub mod prompts;
pub mod response;

use classify::classify_failure;
use prompts::{build_match_prompt, MATCH_SYSTEM};
use response::{parse_match_response, MatchFields};

/// Cost/latency bounds on what is sent to the model.
pub const MAX_JD_CHARS: usize = 4000;
pub const MAX_RESUME_CHARS: usize = 6000;

pub const FALLBACK_SUMMARY: &str = "Unable to analyze. Please check your API key and try again.";

/// Why an analysis produced no genuine result. Display is the user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnalysisError {
    #[error("Please enter your Groq API key.")]
    MissingCredential,

    #[error("LLM client could not be initialised: {0}")]
    ClientUnavailable(String),

    #[error("LLM returned invalid JSON. Please try again.")]
    InvalidResponseFormat,

    #[error("Rate limit reached. Please wait a moment and try again.")]
    RateLimited,

    #[error("Request timed out. The service might be busy.")]
    TimedOut,

    #[error("API error: {0}")]
    ServiceError(String),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::MissingCredential => "missing_credential",
            AnalysisError::ClientUnavailable(_) => "client_unavailable",
            AnalysisError::InvalidResponseFormat => "invalid_response_format",
            AnalysisError::RateLimited => "rate_limited",
            AnalysisError::TimedOut => "timed_out",
            AnalysisError::ServiceError(_) => "service_error",
        }
    }
}

/// Outcome of one analysis. When `error` is set the other fields hold
/// fallback values and must not be shown as a genuine result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub match_percentage: u8,
    pub missing_keywords: Vec<String>,
    pub profile_summary: String,
    pub error: Option<AnalysisError>,
}

impl AnalysisResult {
    pub fn succeeded(fields: MatchFields) -> Self {
        Self {
            match_percentage: fields.match_percentage,
            missing_keywords: fields.missing_keywords,
            profile_summary: fields.profile_summary,
            error: None,
        }
    }

    pub fn failed(error: AnalysisError) -> Self {
        Self {
            match_percentage: 0,
            missing_keywords: Vec::new(),
            profile_summary: FALLBACK_SUMMARY.to_string(),
            error: Some(error),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-invocation analyzer: holds the credential and call settings for one analysis.
pub struct MatchAnalyzer {
    credential: Option<Credential>,
    settings: LlmSettings,
}

impl MatchAnalyzer {
    pub fn new(credential: Option<Credential>, settings: LlmSettings) -> Self {
        Self {
            credential,
            settings,
        }
    }

    /// Analyzes against the Groq API.
    pub async fn analyze(&self, resume_text: &str, jd_text: &str) -> AnalysisResult {
        self.analyze_with(resume_text, jd_text, LlmClient::new).await
    }

    /// Analyzes with a caller-supplied client constructor.
    ///
    /// `connect` is only invoked once a credential is present; a failed
    /// construction yields `ClientUnavailable` without any request.
    pub async fn analyze_with<C, F>(
        &self,
        resume_text: &str,
        jd_text: &str,
        connect: F,
    ) -> AnalysisResult
    where
        C: ChatCompletion,
        F: FnOnce(&Credential, &LlmSettings) -> Result<C, LlmError>,
    {
        let Some(credential) = &self.credential else {
            return AnalysisResult::failed(AnalysisError::MissingCredential);
        };

        let client = match connect(credential, &self.settings) {
            Ok(client) => client,
            Err(e) => {
                warn!("LLM client construction failed: {e}");
                return AnalysisResult::failed(AnalysisError::ClientUnavailable(e.to_string()));
            }
        };

        run_analysis(&client, resume_text, jd_text).await
    }
}

/// Sends one request and normalizes whatever comes back.
pub async fn run_analysis(
    client: &dyn ChatCompletion,
    resume_text: &str,
    jd_text: &str,
) -> AnalysisResult {
    let prompt = build_match_prompt(
        truncate_chars(jd_text, MAX_JD_CHARS),
        truncate_chars(resume_text, MAX_RESUME_CHARS),
    );

    let reply = match client.complete(MATCH_SYSTEM, &prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            let error = classify_failure(&e);
            warn!("LLM call failed ({}): {e}", error.kind());
            return AnalysisResult::failed(error);
        }
    };

    match parse_match_response(&reply) {
        Ok(fields) => {
            info!(
                "Analysis complete: match={}%, missing_keywords={}",
                fields.match_percentage,
                fields.missing_keywords.len()
            );
            AnalysisResult::succeeded(fields)
        }
        Err(error) => {
            warn!("LLM reply violated the JSON contract");
            AnalysisResult::failed(error)
        }
    }
}

/// Prefix of at most `max` characters (not bytes).
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
