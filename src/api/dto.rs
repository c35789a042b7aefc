//! Request/response bodies for the HTTP API.

use crate::core::models::{Job, OverallStatus, RecipientOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    pub to: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_file: Option<String>,
    #[serde(default)]
    pub is_html: bool,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub id: String,
    pub status: String,
    pub message: String,
}

impl SendResponse {
    pub fn accepted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "accepted".to_string(),
            message: "Message accepted for delivery".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub overall_status: OverallStatus,
    pub details: Vec<RecipientOutcome>,
}

impl From<Job> for StatusResponse {
    fn from(job: Job) -> Self {
        Self {
            overall_status: job.overall_status(),
            details: job.recipient_outcomes().to_vec(),
            id: job.id,
            timestamp: job.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
}
