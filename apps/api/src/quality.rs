//! Résumé hygiene checks. Deterministic and local; the LLM is not involved.
//!
//! Four fixed checks always run and always populate the report:
//! word_count, email, phone, sections.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const MIN_WORDS: usize = 150;
const MAX_WORDS: usize = 1500;
const MIN_SECTIONS: usize = 3;

/// Canonical section headers, in reporting order.
pub const SECTIONS: [&str; 5] = ["experience", "education", "skills", "projects", "summary"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\(?[0-9]{1,3}\)?[-\s.]?[0-9]{3,4}[-\s.]?[0-9]{4,6}").expect("valid phone regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

/// Check-specific payload carried alongside the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FindingValue {
    Count(usize),
    Match(Option<String>),
    Sections(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityFinding {
    pub status: CheckStatus,
    pub message: String,
    pub value: FindingValue,
}

/// Exactly four findings, one per check. Serializes as a map keyed by check name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub word_count: QualityFinding,
    pub email: QualityFinding,
    pub phone: QualityFinding,
    pub sections: QualityFinding,
}

impl QualityReport {
    /// Findings keyed by check name, in fixed order.
    pub fn findings(&self) -> [(&'static str, &QualityFinding); 4] {
        [
            ("word_count", &self.word_count),
            ("email", &self.email),
            ("phone", &self.phone),
            ("sections", &self.sections),
        ]
    }
}

/// Runs every check against the résumé text.
pub fn evaluate(resume_text: &str) -> QualityReport {
    QualityReport {
        word_count: check_word_count(resume_text),
        email: check_email(resume_text),
        phone: check_phone(resume_text),
        sections: check_sections(resume_text),
    }
}

fn check_word_count(text: &str) -> QualityFinding {
    let count = text.split_whitespace().count();

    let (status, message) = if count < MIN_WORDS {
        (
            CheckStatus::Fail,
            format!("Too brief ({count} words). Aim for 300-800 words."),
        )
    } else if count > MAX_WORDS {
        (
            CheckStatus::Warning,
            format!("Lengthy ({count} words). Consider condensing."),
        )
    } else {
        (CheckStatus::Pass, format!("Good length ({count} words)."))
    };

    QualityFinding {
        status,
        message,
        value: FindingValue::Count(count),
    }
}

fn check_email(text: &str) -> QualityFinding {
    match EMAIL_RE.find(text) {
        Some(m) => QualityFinding {
            status: CheckStatus::Pass,
            message: format!("Email: {}", m.as_str()),
            value: FindingValue::Match(Some(m.as_str().to_string())),
        },
        None => QualityFinding {
            status: CheckStatus::Fail,
            message: "No email found.".to_string(),
            value: FindingValue::Match(None),
        },
    }
}

// A missing phone number is a soft issue: warning, never fail.
fn check_phone(text: &str) -> QualityFinding {
    match PHONE_RE.find(text) {
        Some(m) => QualityFinding {
            status: CheckStatus::Pass,
            message: "Phone detected.".to_string(),
            value: FindingValue::Match(Some(m.as_str().to_string())),
        },
        None => QualityFinding {
            status: CheckStatus::Warning,
            message: "No phone detected.".to_string(),
            value: FindingValue::Match(None),
        },
    }
}

fn check_sections(text: &str) -> QualityFinding {
    let lower = text.to_lowercase();
    let found: Vec<String> = SECTIONS
        .iter()
        .filter(|s| lower.contains(*s))
        .map(|s| s.to_string())
        .collect();

    let status = if found.len() >= MIN_SECTIONS {
        CheckStatus::Pass
    } else {
        CheckStatus::Warning
    };

    let message = if found.is_empty() {
        "Add clear section headers.".to_string()
    } else {
        let names: Vec<String> = found.iter().map(|s| title_case(s)).collect();
        format!("Sections: {}", names.join(", "))
    };

    QualityFinding {
        status,
        message,
        value: FindingValue::Sections(found),
    }
}

/// Upper-cases the first letter of each space-separated word.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
