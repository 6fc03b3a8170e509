//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: store/recorder wiring behind `AppServices`
//! - `routes/`: HTTP routes + handlers (one file per route group)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::path::Path;
use std::sync::Arc;

use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::{Extension, Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `/api/*` carries the JSON API; everything else falls through to the static
/// frontend bundle, with unknown paths rewritten to `index.html` so the
/// single-page frontend owns client-side routing.
pub fn build_app(services: Arc<AppServices>, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let frontend =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(Extension(services))
        .layer(cors)
        .fallback_service(frontend)
}
