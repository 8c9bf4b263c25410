//! Probe engine.
//!
//! # Data Flow
//! ```text
//! HTTP request (timeout)
//!     → orchestrator.rs (one deadline, endpoints in order, fail-fast)
//!     → per endpoint: open session → Probe::probe → close session
//!         liveness.rs        system_health, system_chain,
//!                            system_properties, chain_getBlockHash
//!         liveness_block.rs  liveness + best/finalized heights → tracker.rs
//!         readiness.rs       system_health → synced and peered?
//!     → Outcome (status code + error)
//! ```
//!
//! # State Machine (per probe invocation)
//! ```text
//! Idle → Dialing → Exchanging → [Evaluating] → Done(outcome)
//! ```
//! There is no retry loop; the orchestrator that calls the HTTP endpoint
//! again on its next period is the retry.
//!
//! # Design Decisions
//! - Strategies are flat `Probe` implementors; the block variant holds a
//!   `LivenessProbe` rather than extending it
//! - The only state kept between requests is the block tracker, owned by
//!   the strategy and shared by every request routed to it

pub mod error;
pub mod liveness;
pub mod liveness_block;
pub mod node_metrics;
pub mod orchestrator;
pub mod readiness;
pub mod tracker;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::rpc::Session;

pub use error::{NotReady, ProbeError};
pub use liveness::LivenessProbe;
pub use liveness_block::LivenessBlockProbe;
pub use node_metrics::NodeMetricsProbe;
pub use orchestrator::Orchestrator;
pub use readiness::ReadinessProbe;
pub use tracker::{Block, BlockTracker, Slot};

/// A health check run over one open session.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Run the check. The caller owns and closes the session.
    async fn probe(&self, session: &mut dyn Session) -> Result<(), ProbeError>;
}

/// Result of one probe invocation.
#[derive(Debug)]
pub struct Outcome {
    status: StatusCode,
    error: Option<ProbeError>,
}

impl Outcome {
    pub fn healthy() -> Self {
        Self {
            status: StatusCode::OK,
            error: None,
        }
    }

    pub fn failed(error: ProbeError) -> Self {
        Self {
            status: error.status_code(),
            error: Some(error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.error.as_ref()
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<(), ProbeError>> for Outcome {
    fn from(result: Result<(), ProbeError>) -> Self {
        match result {
            Ok(()) => Self::healthy(),
            Err(e) => Self::failed(e),
        }
    }
}
