//! Response rendering.
//!
//! Health responses carry only a status code and its reason phrase; error
//! detail goes to the log, not to the orchestrator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// `Cache-Control` for every probe response.
pub const NO_STORE: &str = "no-store, max-age=0";

pub fn render(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}
