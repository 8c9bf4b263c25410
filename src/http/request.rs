//! Request handling.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every probe request
//! - Parse the `timeout` query parameter
//!
//! # Design Decisions
//! - A bad `timeout` is the caller's mistake, reported as 500 and kept
//!   apart from node failures (503)
//! - Absent or empty `timeout` means one second
//! - The raw query is decoded leniently and the first `timeout` wins, so no
//!   query string can be rejected before the probe handler sees it

use axum::http::{HeaderValue, Request, StatusCode};
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Timeout used when the query does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Problems with the probe request itself.
#[derive(Debug, Error)]
pub enum ClientInputError {
    #[error("invalid timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl ClientInputError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Query parameters accepted by every probe route.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProbeQuery {
    pub timeout: Option<String>,
}

impl ProbeQuery {
    /// Read the parameters from a raw query string. Unknown keys are ignored.
    pub fn from_raw(query: Option<&str>) -> Self {
        let timeout = query.and_then(|q| {
            form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "timeout")
                .map(|(_, value)| value.into_owned())
        });
        Self { timeout }
    }

    pub fn timeout(&self) -> Result<Duration, ClientInputError> {
        parse_timeout(self.timeout.as_deref())
    }
}

/// Parse a timeout in whole seconds.
pub fn parse_timeout(raw: Option<&str>) -> Result<Duration, ClientInputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_TIMEOUT),
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|source| ClientInputError::InvalidTimeout {
                value: value.to_string(),
                source,
            }),
    }
}
