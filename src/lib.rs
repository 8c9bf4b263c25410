//! Health probes for a Substrate node's JSON-RPC WebSocket endpoint.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rpc;

pub use config::schema::ProbeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
