//! Metrics collection and exposition.
//!
//! # Metrics
//! - `probe_requests_total` (counter): probe requests by route and status
//! - `probe_duration_seconds` (histogram): end-to-end probe latency by route
//! - `probe_block_number` (gauge): last observed height by slot

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::health::Slot;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one answered probe request.
pub fn record_probe(route: &'static str, status: u16, started: Instant) {
    counter!("probe_requests_total", "route" => route, "status" => status.to_string()).increment(1);
    histogram!("probe_duration_seconds", "route" => route).record(started.elapsed().as_secs_f64());
}

pub fn record_block_number(slot: Slot, number: i64) {
    gauge!("probe_block_number", "slot" => slot.as_str()).set(number as f64);
}
