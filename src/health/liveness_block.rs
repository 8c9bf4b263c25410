//! Liveness plus chain progress.
//!
//! # Responsibilities
//! - Run the liveness sequence first
//! - Fetch the best block, then the finalized head hash and its block
//! - Feed both numbers to the shared tracker and fail if either stalled
//!
//! # Design Decisions
//! - One invocation can never prove a stall: a slot's first observation is
//!   always fresh, so the probe only fails after repeated calls see the same
//!   number for longer than the threshold
//! - Both slots are observed before either is evaluated

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::health::liveness::LivenessProbe;
use crate::health::tracker::{parse_block_number, BlockTracker, Slot};
use crate::health::{Probe, ProbeError};
use crate::observability::metrics;
use crate::rpc::methods::{CHAIN_GET_BLOCK, CHAIN_GET_FINALIZED_HEAD};
use crate::rpc::types::SignedBlock;
use crate::rpc::{RpcExchange, Session};

/// Liveness that also fails when best or finalized blocks stop moving.
#[derive(Debug)]
pub struct LivenessBlockProbe {
    liveness: LivenessProbe,
    tracker: Arc<BlockTracker>,
    threshold: Duration,
}

impl LivenessBlockProbe {
    pub fn new(tracker: Arc<BlockTracker>, threshold: Duration) -> Self {
        Self {
            liveness: LivenessProbe::new(),
            tracker,
            threshold,
        }
    }

    async fn best_number(&self, rpc: &mut RpcExchange<'_>) -> Result<i64, ProbeError> {
        let block: SignedBlock = rpc.call(CHAIN_GET_BLOCK, Vec::new()).await?;
        Ok(parse_block_number(&block.block.header.number)?)
    }

    async fn finalized_number(&self, rpc: &mut RpcExchange<'_>) -> Result<i64, ProbeError> {
        let hash: String = rpc.call(CHAIN_GET_FINALIZED_HEAD, Vec::new()).await?;
        let block: SignedBlock = rpc.call(CHAIN_GET_BLOCK, vec![Value::String(hash)]).await?;
        Ok(parse_block_number(&block.block.header.number)?)
    }
}

#[async_trait]
impl Probe for LivenessBlockProbe {
    fn name(&self) -> &'static str {
        "liveness_block"
    }

    async fn probe(&self, session: &mut dyn Session) -> Result<(), ProbeError> {
        let mut rpc = RpcExchange::new(session);
        self.liveness.check(&mut rpc).await?;

        let best = self.best_number(&mut rpc).await?;
        let finalized = self.finalized_number(&mut rpc).await?;

        let now = Instant::now();
        let observed = [
            (Slot::Best, self.tracker.observe_at(Slot::Best, best, now)),
            (
                Slot::Finalized,
                self.tracker.observe_at(Slot::Finalized, finalized, now),
            ),
        ];

        for (slot, block) in observed {
            metrics::record_block_number(slot, block.number);

            let elapsed = block.age_at(now);
            if elapsed > self.threshold {
                return Err(ProbeError::Stale {
                    slot,
                    number: block.number,
                    elapsed,
                    threshold: self.threshold,
                });
            }
            tracing::debug!(
                slot = %slot,
                number = block.number,
                elapsed = ?elapsed,
                threshold = ?self.threshold,
                "Block within threshold"
            );
        }

        Ok(())
    }
}
