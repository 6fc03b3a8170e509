use axum::Router;

pub mod attendance;
pub mod faculty;
pub mod nfc;
pub mod students;
pub mod system;

/// Router for all `/api` endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/students", students::router())
        .nest("/nfc", nfc::router())
        .nest("/attendance", attendance::router())
        .nest("/faculty", faculty::router())
}
