use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use taproll_core::{Entity, StudentId};
use taproll_directory::{Student, StudentStatus, TagId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_student).get(list_students))
        .route("/:id", get(get_student).patch(update_student))
        .route("/:id/tags", post(bind_tag))
}

pub async fn create_student(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateStudentRequest>,
) -> axum::response::Response {
    let mut student = match Student::new(StudentId::new(), body.name) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Some(raw) = body.tag_id {
        let tag = match TagId::new(&raw) {
            Ok(tag) => tag,
            Err(e) => return errors::domain_error_to_response(e),
        };
        if let Err(e) = student.bind_tag(tag, Utc::now()) {
            return errors::domain_error_to_response(e);
        }
    }

    match services.students.insert(student).await {
        Ok(created) => {
            (StatusCode::CREATED, Json(dto::student_to_json(&created))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_students(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.students.list().await {
        Ok(students) => {
            let items = students.iter().map(dto::student_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_student(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: StudentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid student id");
        }
    };

    match services.students.get(id).await {
        Ok(Some(student)) => {
            (StatusCode::OK, Json(dto::student_to_json(&student))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "student not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_student(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStudentRequest>,
) -> axum::response::Response {
    let id: StudentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid student id");
        }
    };

    let mut student = match services.students.get(id).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "student not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(name) = body.name {
        if let Err(e) = student.rename(name) {
            return errors::domain_error_to_response(e);
        }
    }
    match body.status {
        Some(StudentStatus::Active) => student.reactivate(),
        Some(StudentStatus::Inactive) => student.deactivate(),
        None => {}
    }

    match services.students.update(student).await {
        Ok(updated) => (StatusCode::OK, Json(dto::student_to_json(&updated))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Bind a new tag to a student, superseding any active binding.
pub async fn bind_tag(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::BindTagRequest>,
) -> axum::response::Response {
    let id: StudentId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid student id");
        }
    };

    let mut student = match services.students.get(id).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "student not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let tag = match TagId::new(&body.tag_id) {
        Ok(tag) => tag,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = student.bind_tag(tag, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match services.students.update(student).await {
        Ok(updated) => {
            tracing::info!(student_id = %updated.id(), "tag bound");
            (StatusCode::OK, Json(dto::student_to_json(&updated))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
