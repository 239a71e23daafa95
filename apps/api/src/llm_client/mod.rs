/// LLM Client — the single point of entry for all Groq API calls in SmartMatch.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// All LLM interactions MUST go through the `ChatCompletion` trait defined here.
///
/// Clients are built per analysis from a credential and `LlmSettings`; there is
/// no shared process-wide client.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.groq.com";
const CHAT_COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";
/// The model used for all analysis calls.
/// This is intentionally hardcoded to keep scores comparable across runs.
pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 500;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP client could not be built: {0}")]
    Build(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM response carried no content")]
    EmptyContent,
}

impl LlmError {
    /// HTTP status reported by the provider, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            LlmError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-readable error text. Provider errors yield the provider's own message.
    pub fn detail(&self) -> String {
        match self {
            LlmError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Secret token authorizing calls to the provider.
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims the raw value; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Per-call knobs sent to the provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: MODEL.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// A single-shot chat completion: one system message, one user message, text back.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Trimmed content of the first choice. `None` only when there is no choice
    /// or no content; a blank reply comes back as `Some("")`.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Wraps Groq's OpenAI-compatible chat completions endpoint.
/// Issues exactly one request per `complete` call; there is no retry.
pub struct LlmClient {
    client: Client,
    credential: Credential,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(credential: &Credential, settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Build(e.to_string()))?;

        Ok(Self {
            client,
            credential: credential.clone(),
            settings: settings.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.settings.api_base.trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        )
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credential.expose())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.settings.timeout)
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}", status);
            // Try to parse error message
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.settings.timeout)
            } else {
                LlmError::Http(e)
            }
        })?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat_response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}
