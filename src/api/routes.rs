use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::dto::{HealthResponse, SendRequest, SendResponse, StatusResponse};
use super::errors::{app_error_to_response, json_error};
use super::AppState;

pub async fn send(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
        }
    };

    match state.submit(request) {
        Ok(id) => (StatusCode::ACCEPTED, Json(SendResponse::accepted(id))).into_response(),
        Err(e) => app_error_to_response(e),
    }
}

pub async fn status(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.retrieve(&id).await {
        Ok(job) => Json(StatusResponse::from(job)).into_response(),
        Err(e) => app_error_to_response(e),
    }
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        service: "mailcast".to_string(),
    })
}
