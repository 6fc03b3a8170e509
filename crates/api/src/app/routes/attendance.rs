use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use taproll_attendance::SessionId;
use taproll_core::StudentId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_by_session))
        .route("/students/:id", get(list_by_student))
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

pub async fn list_by_session(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<SessionQuery>,
) -> axum::response::Response {
    let session = match SessionId::new(&query.session_id) {
        Ok(s) => s,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_session",
                "session id is empty or malformed",
            );
        }
    };

    match services.attendance.list_by_session(&session).await {
        Ok(events) => {
            let items = events.iter().map(dto::event_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_by_student(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: StudentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid student id");
        }
    };

    match services.attendance.list_by_student(id).await {
        Ok(events) => {
            let items = events.iter().map(dto::event_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
