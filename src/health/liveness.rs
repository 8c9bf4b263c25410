//! Liveness: can the node answer basic introspection?

use async_trait::async_trait;
use serde_json::Value;

use crate::health::{Probe, ProbeError};
use crate::rpc::methods::{CHAIN_GET_BLOCK_HASH, SYSTEM_CHAIN, SYSTEM_HEALTH, SYSTEM_PROPERTIES};
use crate::rpc::{RpcExchange, Session};

/// Calls issued by a liveness probe, in order.
pub const LIVENESS_CALLS: [&str; 4] = [
    SYSTEM_HEALTH,
    SYSTEM_CHAIN,
    SYSTEM_PROPERTIES,
    CHAIN_GET_BLOCK_HASH,
];

/// Passes when every introspection call succeeds.
///
/// Transport and RPC failures are both reported as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivenessProbe;

impl LivenessProbe {
    pub fn new() -> Self {
        Self
    }

    /// Run the call sequence on an existing exchange, stopping at the first failure.
    pub(crate) async fn check(&self, rpc: &mut RpcExchange<'_>) -> Result<(), ProbeError> {
        for method in LIVENESS_CALLS {
            let _: Value = rpc.call(method, Vec::new()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Probe for LivenessProbe {
    fn name(&self) -> &'static str {
        "liveness"
    }

    async fn probe(&self, session: &mut dyn Session) -> Result<(), ProbeError> {
        let mut rpc = RpcExchange::new(session);
        self.check(&mut rpc).await
    }
}
