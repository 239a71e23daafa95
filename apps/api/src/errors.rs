use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::extraction::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl AppError {
    fn analysis_status(error: &AnalysisError) -> StatusCode {
        match error {
            AnalysisError::MissingCredential => StatusCode::BAD_REQUEST,
            AnalysisError::ClientUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalysisError::InvalidResponseFormat => StatusCode::BAD_GATEWAY,
            AnalysisError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AnalysisError::TimedOut => StatusCode::GATEWAY_TIMEOUT,
            AnalysisError::ServiceError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, kind) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Extraction(e) => {
                tracing::info!("Extraction rejected upload: {}", e.kind());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    e.to_string(),
                    Some(e.kind()),
                )
            }
            AppError::Analysis(e) => {
                tracing::warn!("Analysis failed: {}", e.kind());
                (
                    Self::analysis_status(e),
                    "ANALYSIS_ERROR",
                    e.to_string(),
                    Some(e.kind()),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "kind": kind
            }
        }));

        (status, body).into_response()
    }
}
