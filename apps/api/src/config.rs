use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_API_BASE};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Nothing here is required: every variable has a default or is optional.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Fallback credential used when a request does not carry its own key.
    pub groq_api_key: Option<String>,
    pub llm: LlmSettings,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<redacted>"))
            .field("llm", &self.llm)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_base =
            optional_env("GROQ_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            groq_api_key: optional_env("GROQ_API_KEY"),
            llm: LlmSettings {
                api_base,
                ..LlmSettings::default()
            },
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

/// Reads a variable, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process router tests: no fallback key, unreachable API base.
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            groq_api_key: None,
            llm: LlmSettings {
                api_base: "http://127.0.0.1:9".to_string(),
                ..LlmSettings::default()
            },
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
