//! Maps analysis and quality results onto the dashboard's visual artifacts:
//! a score gauge, keyword badges, and per-check status cards.

use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::quality::{title_case, CheckStatus, QualityReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Error,
}

/// Scoring bands communicated to the model in the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBand {
    Excellent,
    Good,
    Partial,
    Weak,
    Poor,
}

impl MatchBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            85.. => MatchBand::Excellent,
            70..=84 => MatchBand::Good,
            50..=69 => MatchBand::Partial,
            30..=49 => MatchBand::Weak,
            _ => MatchBand::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeStep {
    pub from: u8,
    pub to: u8,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub title: &'static str,
    pub value: u8,
    pub min: u8,
    pub max: u8,
    pub suffix: &'static str,
    pub steps: Vec<GaugeStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub tone: Tone,
    pub band: MatchBand,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCard {
    pub title: &'static str,
    pub caption: &'static str,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityCard {
    pub check: &'static str,
    pub title: String,
    pub icon: &'static str,
    pub status: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub gauge: Gauge,
    pub verdict: Verdict,
    pub summary: String,
    pub keywords: KeywordCard,
    pub quality: Vec<QualityCard>,
}

/// Builds the view for a successful analysis.
pub fn build_dashboard(analysis: &AnalysisResult, quality: &QualityReport) -> DashboardView {
    let score = analysis.match_percentage;

    DashboardView {
        gauge: gauge(score),
        verdict: verdict(score),
        summary: analysis.profile_summary.clone(),
        keywords: keyword_card(&analysis.missing_keywords),
        quality: quality
            .findings()
            .into_iter()
            .map(|(check, finding)| QualityCard {
                check,
                title: title_case(&check.replace('_', " ")),
                icon: status_icon(finding.status),
                status: status_label(finding.status).to_uppercase(),
                detail: finding.message.clone(),
            })
            .collect(),
    }
}

fn gauge(score: u8) -> Gauge {
    Gauge {
        title: "AI Match Score",
        value: score,
        min: 0,
        max: 100,
        suffix: "%",
        steps: vec![
            GaugeStep {
                from: 0,
                to: 40,
                color: "rgba(255, 107, 107, 0.3)",
            },
            GaugeStep {
                from: 40,
                to: 70,
                color: "rgba(252, 196, 25, 0.3)",
            },
            GaugeStep {
                from: 70,
                to: 100,
                color: "rgba(81, 207, 102, 0.3)",
            },
        ],
    }
}

fn verdict(score: u8) -> Verdict {
    let (tone, message) = if score >= 70 {
        (Tone::Success, "Excellent Match! Strong candidate for this position.")
    } else if score >= 50 {
        (Tone::Warning, "Partial Match. Some skill gaps to address.")
    } else {
        (Tone::Error, "Low Match. Significant improvements needed.")
    };

    Verdict {
        tone,
        band: MatchBand::for_score(score),
        message,
    }
}

fn keyword_card(missing: &[String]) -> KeywordCard {
    if missing.is_empty() {
        return KeywordCard {
            title: "Excellent Skill Coverage",
            caption: "No critical skills are missing from your resume!",
            badges: Vec::new(),
        };
    }

    KeywordCard {
        title: "Missing Skills (High Priority)",
        caption: "These skills appear in the job description but are missing from your resume:",
        badges: missing
            .iter()
            .map(|k| Badge {
                label: k.clone(),
                tone: Tone::Error,
            })
            .collect(),
    }
}

fn status_icon(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✅",
        CheckStatus::Warning => "⚠️",
        CheckStatus::Fail => "❌",
    }
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "pass",
        CheckStatus::Warning => "warning",
        CheckStatus::Fail => "fail",
    }
}
