use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use taproll_attendance::RecordError;
use taproll_core::{DomainError, StoreError};

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

pub fn record_error_to_response(err: RecordError) -> axum::response::Response {
    match err {
        RecordError::UnknownTag => json_error(
            StatusCode::NOT_FOUND,
            "unknown_tag",
            "tag not mapped to any active student",
        ),
        RecordError::InvalidSession => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_session",
            "session id is empty or malformed",
        ),
        RecordError::StoreUnavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateKey => {
            json_error(StatusCode::CONFLICT, "conflict", "record already exists")
        }
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}
