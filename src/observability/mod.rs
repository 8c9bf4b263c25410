//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probe engine and HTTP layer produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (probe counters, latency histogram, block height gauges)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → optional Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Node failures log at WARN, configuration and input problems at ERROR
//! - Metrics are recorded through the `metrics` facade; without an
//!   installed exporter they are no-ops

pub mod logging;
pub mod metrics;
