//! Axum route handler for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::{AnalysisResult, MatchAnalyzer};
use crate::errors::AppError;
use crate::extraction::extract_text_blocking;
use crate::llm_client::Credential;
use crate::presentation::{build_dashboard, DashboardView};
use crate::quality::{self, QualityReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields collected from the multipart upload.
#[derive(Default)]
struct AnalyzeForm {
    api_key: Option<String>,
    job_description: Option<String>,
    resume: Option<Bytes>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub analysis: AnalysisResult,
    pub quality: QualityReport,
    pub dashboard: DashboardView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart fields: `api_key` (optional), `job_description`, `resume` (PDF).
/// Pipeline: extract → analyze → quality check → dashboard. Stops at the first
/// failing stage; no partial results are returned.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_form(multipart).await?;

    let job_description = form
        .job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Please paste a job description.".to_string()))?;

    let resume = form
        .resume
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Please upload your resume (PDF format).".to_string())
        })?;

    let analysis_id = Uuid::new_v4();
    info!(%analysis_id, resume_bytes = resume.len(), "Starting analysis");

    let resume_text = extract_text_blocking(resume).await?;
    info!(%analysis_id, resume_chars = resume_text.chars().count(), "Resume text extracted");

    let credential = form
        .api_key
        .as_deref()
        .and_then(Credential::parse)
        .or_else(|| state.config.groq_api_key.as_deref().and_then(Credential::parse));

    let analyzer = MatchAnalyzer::new(credential, state.config.llm.clone());
    let mut analysis = analyzer.analyze(&resume_text, &job_description).await;

    if let Some(error) = analysis.error.take() {
        return Err(AppError::Analysis(error));
    }

    let quality = quality::evaluate(&resume_text);
    let dashboard = build_dashboard(&analysis, &quality);

    info!(%analysis_id, match_percentage = analysis.match_percentage, "Analysis delivered");

    Ok(Json(AnalyzeResponse {
        analysis_id,
        analyzed_at: Utc::now(),
        analysis,
        quality,
        dashboard,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let malformed = |e: axum::extract::multipart::MultipartError| {
            AppError::Validation(format!("Malformed field '{name}': {e}"))
        };

        match name.as_str() {
            "api_key" => form.api_key = Some(field.text().await.map_err(malformed)?),
            "job_description" => {
                form.job_description = Some(field.text().await.map_err(malformed)?)
            }
            "resume" => form.resume = Some(field.bytes().await.map_err(malformed)?),
            _ => {}
        }
    }

    Ok(form)
}
