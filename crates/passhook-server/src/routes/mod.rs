//! HTTP handlers

mod hook;

pub use hook::{liveness, password_import};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use passhook_core::Error;
use serde_json::json;

/// Map a core error onto its HTTP response.
///
/// Authorization failures carry no body.
fn error_response(err: Error) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match err {
        Error::Unauthorized => status.into_response(),
        err => (
            status,
            Json(json!({
                "error": err.code(),
                "message": err.to_string(),
            })),
        )
            .into_response(),
    }
}
