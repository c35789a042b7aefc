//! Job records, per-recipient outcomes and the message template.

use crate::core::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overall delivery state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    #[default]
    Pending,
    Success,
    PartialSuccess,
    Failed,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pending => "pending",
            OverallStatus::Success => "success",
            OverallStatus::PartialSuccess => "partial_success",
            OverallStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one attempt. The detail text lives in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Success { message: String },
    Error { error: String },
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientOutcome {
    pub email: String,
    #[serde(flatten)]
    pub delivery: Delivery,
    pub time: DateTime<Utc>,
}

impl RecipientOutcome {
    pub fn success(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            delivery: Delivery::Success {
                message: message.into(),
            },
            time: Utc::now(),
        }
    }

    pub fn error(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            delivery: Delivery::Error {
                error: error.into(),
            },
            time: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.delivery, Delivery::Success { .. })
    }

    /// The success message or the error description.
    pub fn detail(&self) -> &str {
        match &self.delivery {
            Delivery::Success { message } => message,
            Delivery::Error { error } => error,
        }
    }
}

/// The unit of work and of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "from")]
    pub sender: String,
    pub subject: String,
    #[serde(rename = "overall_status")]
    overall_status: OverallStatus,
    #[serde(rename = "recipients", default)]
    recipient_outcomes: Vec<RecipientOutcome>,
}

impl Job {
    /// Creates a pending job; a fresh id is generated when none is supplied.
    pub fn new(id: Option<String>, sender: impl Into<String>, subject: impl Into<String>) -> Self {
        let id = id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_job_id);
        Self {
            id,
            created_at: Utc::now(),
            sender: sender.into(),
            subject: subject.into(),
            overall_status: OverallStatus::Pending,
            recipient_outcomes: Vec::new(),
        }
    }

    pub fn overall_status(&self) -> OverallStatus {
        self.overall_status
    }

    pub fn recipient_outcomes(&self) -> &[RecipientOutcome] {
        &self.recipient_outcomes
    }

    /// Appends the outcomes collected for this job. Frozen once terminal.
    pub(crate) fn record_outcomes(&mut self, outcomes: impl IntoIterator<Item = RecipientOutcome>) {
        if self.is_terminal() {
            tracing::warn!(job_id = %self.id, "Ignoring outcomes for a job that already completed");
            return;
        }
        self.recipient_outcomes.extend(outcomes);
    }

    /// Recomputes the overall status from the recorded outcomes.
    pub(crate) fn finalize(&mut self) -> OverallStatus {
        self.overall_status = crate::core::status::aggregate(&self.recipient_outcomes);
        self.overall_status
    }

    pub fn is_terminal(&self) -> bool {
        self.overall_status != OverallStatus::Pending
    }
}

/// Collision-resistant identifier for jobs submitted without one.
pub fn generate_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Where the message body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    Inline(String),
    File(PathBuf),
}

impl BodySource {
    /// Picks the body source from the two optional inputs; supplying both is an error.
    pub fn from_parts(body: Option<String>, body_file: Option<PathBuf>) -> Result<Self> {
        let body = body.filter(|b| !b.is_empty());
        let body_file = body_file.filter(|p| !p.as_os_str().is_empty());
        match (body, body_file) {
            (Some(_), Some(_)) => Err(AppError::ConflictingBody),
            (Some(body), None) => Ok(BodySource::Inline(body)),
            (None, Some(path)) => Ok(BodySource::File(path)),
            (None, None) => Ok(BodySource::Inline(String::new())),
        }
    }
}

/// Read-only message fields shared by every attempt of a job.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub sender: String,
    pub subject: String,
    pub body: BodySource,
    pub html: bool,
    pub attachments: Vec<PathBuf>,
}

/// Splits a comma-separated attachment list, ignoring blanks.
pub fn parse_attachment_list(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
