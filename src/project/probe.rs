//! Probe response classification
//!
//! The probe call is expected to fail with 404. That failure is the useful
//! outcome, so it is modelled as data rather than as an error path.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

static PROJECT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"projects/([^/]+)/locations/").expect("project id pattern is valid")
});

/// What a probe response says about the key's project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 404 carrying the project id in its message
    Identified(String),
    /// Any non-success response without a recognizable project id
    Rejected { status: u16, body: String },
    /// The probe model answered successfully, which leaves the project unknown
    UnexpectedSuccess { status: u16, body: String },
}

impl ProbeOutcome {
    /// Classify a probe response by status and raw body
    pub fn classify(status: StatusCode, body: String) -> Self {
        if status.is_success() {
            return ProbeOutcome::UnexpectedSuccess {
                status: status.as_u16(),
                body,
            };
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(project_id) = extract_project_id(&body) {
                return ProbeOutcome::Identified(project_id);
            }
        }

        ProbeOutcome::Rejected {
            status: status.as_u16(),
            body,
        }
    }

    /// Convert into the resolved project id or a resolution error
    pub fn into_result(self) -> Result<String, ResolutionError> {
        match self {
            ProbeOutcome::Identified(project_id) => Ok(project_id),
            ProbeOutcome::Rejected { status, body } => {
                Err(ResolutionError::Rejected { status, body })
            }
            ProbeOutcome::UnexpectedSuccess { status, body } => {
                Err(ResolutionError::UnexpectedSuccess { status, body })
            }
        }
    }
}

/// Failure to determine the project behind an express key
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to extract project ID: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to extract project ID: probe returned {status} without a project: {body}")]
    UnexpectedSuccess { status: u16, body: String },

    #[error("Failed to extract project ID: probe request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Find the project id in a probe error body
///
/// Looks in `error.message` of a JSON error envelope first and falls back to
/// the raw body text when the envelope is missing.
pub fn extract_project_id(body: &str) -> Option<String> {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

    let haystack = message.as_deref().unwrap_or(body);
    PROJECT_PATTERN
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
