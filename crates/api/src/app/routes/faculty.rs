use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use taproll_core::FacultyId;
use taproll_directory::Faculty;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_faculty).get(list_faculty))
        .route(
            "/:id",
            get(get_faculty).patch(update_faculty).delete(delete_faculty),
        )
}

pub async fn create_faculty(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateFacultyRequest>,
) -> axum::response::Response {
    let faculty = match Faculty::new(FacultyId::new(), body.name, body.email, body.department) {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.faculty.insert(faculty).await {
        Ok(created) => {
            (StatusCode::CREATED, Json(dto::faculty_to_json(&created))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_faculty(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.faculty.list().await {
        Ok(faculty) => {
            let items = faculty.iter().map(dto::faculty_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_faculty(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: FacultyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid faculty id");
        }
    };

    match services.faculty.get(id).await {
        Ok(Some(faculty)) => {
            (StatusCode::OK, Json(dto::faculty_to_json(&faculty))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "faculty not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_faculty(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateFacultyRequest>,
) -> axum::response::Response {
    let id: FacultyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid faculty id");
        }
    };

    let mut faculty = match services.faculty.get(id).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "faculty not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "name cannot be empty",
            );
        }
        faculty.name = name;
    }
    if let Some(email) = body.email {
        faculty.email = Some(email);
    }
    if let Some(department) = body.department {
        faculty.department = Some(department);
    }

    match services.faculty.update(faculty).await {
        Ok(updated) => (StatusCode::OK, Json(dto::faculty_to_json(&updated))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_faculty(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: FacultyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid faculty id");
        }
    };

    match services.faculty.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
