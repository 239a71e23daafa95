use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds configuration only: LLM clients are built per analysis.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}
