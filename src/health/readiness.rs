//! Readiness: is the node synced and peered?

use async_trait::async_trait;

use crate::health::{NotReady, Probe, ProbeError};
use crate::rpc::methods::SYSTEM_HEALTH;
use crate::rpc::types::SystemHealth;
use crate::rpc::{RpcExchange, Session};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessProbe;

impl ReadinessProbe {
    pub fn new() -> Self {
        Self
    }
}

/// Ready iff not syncing and at least one peer.
pub fn evaluate(health: &SystemHealth) -> Result<(), NotReady> {
    if health.is_syncing {
        return Err(NotReady::Syncing);
    }
    if health.peers == 0 {
        return Err(NotReady::NoPeers);
    }
    Ok(())
}

#[async_trait]
impl Probe for ReadinessProbe {
    fn name(&self) -> &'static str {
        "readiness"
    }

    async fn probe(&self, session: &mut dyn Session) -> Result<(), ProbeError> {
        let health: SystemHealth = RpcExchange::new(session)
            .call(SYSTEM_HEALTH, Vec::new())
            .await?;
        tracing::debug!(
            is_syncing = health.is_syncing,
            peers = health.peers,
            "Node health"
        );
        Ok(evaluate(&health)?)
    }
}
