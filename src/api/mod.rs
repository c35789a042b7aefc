//! HTTP front end (Axum router + background dispatch).
//!
//! - `routes.rs`: handlers for submit, status lookup and health
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::{parse_attachment_list, BodySource, Job, MessageTemplate};
use crate::dispatch::{DispatchEngine, MailTransport};
use crate::recipients;
use crate::store::{validate_job_id, JobLogStore};

pub mod dto;
pub mod errors;
pub mod routes;

use dto::SendRequest;

/// Shared state behind every handler.
pub struct AppState {
    pub engine: DispatchEngine,
    pub store: JobLogStore,
    pub sender: String,
}

impl AppState {
    pub fn new(config: &Config, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            engine: DispatchEngine::new(transport),
            store: JobLogStore::new(config.log_dir.clone()),
            sender: config.smtp.sender().to_string(),
        }
    }

    /// Validates a submission and starts it in the background. Returns the job id.
    pub fn submit(&self, request: SendRequest) -> Result<String> {
        if request.subject.trim().is_empty() {
            return Err(AppError::InvalidSubmission("subject is required".to_string()));
        }
        let recipients = recipients::normalize(&request.to)?;
        let body = BodySource::from_parts(request.body, request.body_file.map(PathBuf::from))?;
        let attachments = parse_attachment_list(&request.attachments.join(","));

        let mut job = Job::new(request.message_id, self.sender.clone(), request.subject.clone());
        validate_job_id(&job.id)?;

        let template = MessageTemplate {
            sender: self.sender.clone(),
            subject: request.subject,
            body,
            html: request.is_html,
            attachments,
        };

        let id = job.id.clone();
        let engine = self.engine.clone();
        let store = self.store.clone();
        tracing::info!(target: "api", job_id = %id, "Accepted job for {} recipients", recipients.len());

        tokio::spawn(async move {
            if let Err(e) = engine.dispatch(&mut job, &template, &recipients).await {
                tracing::error!(target: "api", job_id = %job.id, "Dispatch failed: {}", e);
                return;
            }
            match store.persist(&job).await {
                Ok(path) => {
                    tracing::info!(target: "api", job_id = %job.id, "Log saved to {}", path.display())
                }
                Err(e) => tracing::error!(target: "api", job_id = %job.id, "Failed to save log: {}", e),
            }
        });

        Ok(id)
    }
}

/// Build the HTTP router.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/send", post(routes::send))
        .route("/api/status/:id", get(routes::status))
        .route("/api/health", get(routes::health))
        .layer(Extension(state))
}

/// Binds the configured address and serves until the process stops.
pub async fn serve(config: &Config, transport: Arc<dyn MailTransport>) -> Result<()> {
    let bind = config
        .api_bind
        .clone()
        .ok_or_else(|| AppError::Config("no API bind address configured".to_string()))?;
    let bind = if bind.starts_with(':') {
        format!("0.0.0.0{}", bind)
    } else {
        bind
    };

    let state = Arc::new(AppState::new(config, transport));
    state.store.ensure_dir().await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(target: "api", "Listening on {}", listener.local_addr()?);
    tracing::info!(target: "api", "POST /api/send, GET /api/status/:id, GET /api/health");

    axum::serve(listener, build_app(state)).await?;
    Ok(())
}
