//! Probe orchestration across node endpoints.
//!
//! # Responsibilities
//! - Compute one deadline for the whole request
//! - Dial endpoints in order and run the selected probe on each
//! - Stop at the first failure; every endpoint must pass
//!
//! # Design Decisions
//! - Fail-fast, not fail-over: a relay chain node and its parachain
//!   collator are checked as one unit
//! - Sessions are closed before the outcome is returned, on every path
//! - The handshake may take the full request timeout; reads and writes
//!   share the one deadline, so a slow endpoint eats into later ones

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::health::{Outcome, Probe, ProbeError};
use crate::rpc::{Connector, Endpoint};

/// Longest deadline a request can ask for, roughly thirty years.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

pub struct Orchestrator {
    endpoints: Vec<Endpoint>,
    connector: Arc<dyn Connector>,
}

impl Orchestrator {
    pub fn new(endpoints: Vec<Endpoint>, connector: Arc<dyn Connector>) -> Self {
        Self {
            endpoints,
            connector,
        }
    }

    /// Run `probe` against every endpoint within `timeout`.
    pub async fn run(&self, probe: &dyn Probe, timeout: Duration) -> Outcome {
        if self.endpoints.is_empty() {
            return Outcome::failed(ProbeError::NoEndpoints);
        }

        let deadline = deadline_after(Instant::now(), timeout);
        for endpoint in &self.endpoints {
            if let Err(e) = self.probe_endpoint(probe, endpoint, timeout, deadline).await {
                return Outcome::failed(e);
            }
        }
        Outcome::healthy()
    }

    async fn probe_endpoint(
        &self,
        probe: &dyn Probe,
        endpoint: &Endpoint,
        timeout: Duration,
        deadline: Instant,
    ) -> Result<(), ProbeError> {
        let mut session = self
            .connector
            .open(endpoint, timeout)
            .await
            .map_err(|source| ProbeError::Dial {
                endpoint: endpoint.to_string(),
                source,
            })?;
        session.set_deadline(deadline);

        let result = probe.probe(session.as_mut()).await;
        session.close().await;

        match &result {
            Ok(()) => tracing::debug!(endpoint = %endpoint, probe = probe.name(), "Endpoint passed"),
            Err(e) => tracing::debug!(endpoint = %endpoint, probe = probe.name(), error = %e, "Endpoint failed"),
        }
        result
    }
}

/// `now + timeout`, saturating at [`FAR_FUTURE`] from `now`.
fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    now.checked_add(timeout.min(FAR_FUTURE))
        .unwrap_or(now + FAR_FUTURE)
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
