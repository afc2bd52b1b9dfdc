// Handlers module
// HTTP handlers for the REST API

pub mod astro;
pub mod auth;
pub mod posts;

use axum::{http::StatusCode, response::IntoResponse};

/// Liveness probe used by monitoring.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "API is running!")
}
