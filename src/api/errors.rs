use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::core::error::AppError;

pub fn app_error_to_response(err: AppError) -> axum::response::Response {
    match err {
        AppError::NotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("no record for job '{id}'"))
        }
        AppError::CorruptRecord { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_record", err.to_string())
        }
        e if e.is_setup() => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        e => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", e.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
