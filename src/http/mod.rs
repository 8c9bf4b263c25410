//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! GET /healthz | /healthz_block | /readiness ?timeout=N
//!     → server.rs (Axum router, request ID, tracing, no-store header)
//!     → request.rs (parse timeout)
//!     → health::Orchestrator (probe every endpoint)
//!     → response.rs (status code + reason phrase)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ClientInputError, ProbeQuery, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
