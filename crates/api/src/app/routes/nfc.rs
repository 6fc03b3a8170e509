//! Scan intake: the transport edge of the attendance recorder.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use taproll_attendance::ScanOutcome;
use taproll_directory::TagId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/scan", post(scan))
        .route("/resolve/:tag_id", get(resolve))
}

/// Record one scan. `Recorded` maps to 201, the idempotent `AlreadyRecorded`
/// to 200; both carry the event.
pub async fn scan(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ScanRequest>,
) -> axum::response::Response {
    match services
        .recorder
        .record_scan(&body.tag_id, &body.session_id, body.observed_at)
        .await
    {
        Ok(ScanOutcome::Recorded(event)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "outcome": "recorded",
                "event": dto::event_to_json(&event),
            })),
        )
            .into_response(),
        Ok(ScanOutcome::AlreadyRecorded(event)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "outcome": "already_recorded",
                "event": dto::event_to_json(&event),
            })),
        )
            .into_response(),
        Err(e) => errors::record_error_to_response(e),
    }
}

/// Look up the student owning a tag (reader provisioning/debugging aid).
pub async fn resolve(
    Extension(services): Extension<Arc<AppServices>>,
    Path(tag_id): Path<String>,
) -> axum::response::Response {
    let tag = match TagId::new(&tag_id) {
        Ok(tag) => tag,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.students.find_student_by_tag(&tag).await {
        Ok(Some(student)) => {
            (StatusCode::OK, Json(dto::student_to_json(&student))).into_response()
        }
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "unknown_tag",
            "tag not mapped to any student",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}
