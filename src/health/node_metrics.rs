//! Finalized-height check against the node's Prometheus endpoint.
//!
//! # Responsibilities
//! - Scrape the node's metrics text over HTTP
//! - Extract the `status="best"` and `status="finalized"` block heights
//! - Fail when the finalized height stops changing for too long
//!
//! # Design Decisions
//! - Missing or non-positive samples mean "not known yet": they pass and
//!   restart the finalized clock
//! - Stale once the finalized height has been unchanged for at least the
//!   threshold
//! - Uses its own tracker so it cannot disturb the RPC-based one

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use url::Url;

use crate::health::tracker::{BlockTracker, Slot};
use crate::health::ProbeError;

/// Errors scraping the node metrics endpoint.
#[derive(Debug, Error)]
pub enum NodeMetricsError {
    #[error("scrape failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("scrape returned status {0}")]
    Status(u16),
}

/// Block heights found in a metrics scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHeights {
    pub best: Option<i64>,
    pub finalized: Option<i64>,
}

/// Extract block heights from Prometheus text exposition.
///
/// Recognizes series whose name ends in `block_height`, e.g.
/// `substrate_block_height{status="finalized",chain="dev"} 1234`.
pub fn parse_block_heights(text: &str) -> BlockHeights {
    let mut heights = BlockHeights::default();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((series, value)) = line.rsplit_once(char::is_whitespace) else {
            continue;
        };
        let name = series.split('{').next().unwrap_or_default();
        if !name.ends_with("block_height") {
            continue;
        }
        let Some(number) = parse_sample(value) else {
            continue;
        };

        if series.contains(r#"status="finalized""#) {
            heights.finalized = Some(number);
        } else if series.contains(r#"status="best""#) {
            heights.best = Some(number);
        }
    }

    heights
}

fn parse_sample(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|v| v as i64))
}

/// Scrapes node metrics and tracks finalized progress across calls.
#[derive(Debug)]
pub struct NodeMetricsProbe {
    client: Client,
    endpoint: Url,
    tracker: BlockTracker,
    threshold: Duration,
}

impl NodeMetricsProbe {
    pub fn new(endpoint: Url, threshold: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            tracker: BlockTracker::new(),
            threshold,
        }
    }

    pub async fn check(&self, timeout: Duration) -> Result<(), ProbeError> {
        let heights = self.scrape(timeout).await?;
        self.evaluate(heights, Instant::now())
    }

    async fn scrape(&self, timeout: Duration) -> Result<BlockHeights, NodeMetricsError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NodeMetricsError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(parse_block_heights(&text))
    }

    fn evaluate(&self, heights: BlockHeights, now: Instant) -> Result<(), ProbeError> {
        let previous = self.tracker.snapshot(Slot::Finalized);
        tracing::info!(
            best = ?heights.best,
            finalized = ?heights.finalized,
            last_finalized = ?previous.map(|b| b.number),
            "Scraped node block heights"
        );

        let known = match (heights.best, heights.finalized) {
            (Some(best), Some(finalized)) if best > 0 && finalized > 0 => Some(finalized),
            _ => None,
        };
        let Some(finalized) = known else {
            self.tracker.touch_at(Slot::Finalized, now);
            return Ok(());
        };

        let block = self.tracker.observe_at(Slot::Finalized, finalized, now);
        let elapsed = block.age_at(now);
        if elapsed >= self.threshold {
            return Err(ProbeError::Stale {
                slot: Slot::Finalized,
                number: block.number,
                elapsed,
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}
