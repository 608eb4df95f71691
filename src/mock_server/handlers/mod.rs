//! HTTP request handlers for the mock server.

pub mod auth;
pub mod institutions;
pub mod metadata;
pub mod projects;

pub use auth::*;
pub use institutions::*;
pub use metadata::*;
pub use projects::*;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};

/// Error body in the shape the ODP API uses.
pub(crate) fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "detail": message.into() })),
    )
        .into_response()
}
