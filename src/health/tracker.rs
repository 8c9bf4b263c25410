//! Block progress tracking.
//!
//! # Responsibilities
//! - Remember the last observed best and finalized block numbers
//! - Record when each number last *changed*, not when it was last polled
//! - Answer "has this slot stalled for longer than a threshold?"
//!
//! # Invariants
//! - `updated_at` moves only when the observed number differs from the
//!   stored one, and never moves backwards
//! - A slot that was never observed is not stale
//! - Number and timestamp of a slot are read and written under one lock,
//!   so a snapshot never mixes two observations

use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::rpc::ProtocolError;

/// Which chain head a block number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Best,
    Finalized,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Best, Slot::Finalized];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Best => "best",
            Slot::Finalized => "finalized",
        }
    }

    fn index(self) -> usize {
        match self {
            Slot::Best => 0,
            Slot::Finalized => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last observed number of a slot and when it last changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub number: i64,
    pub updated_at: Instant,
}

impl Block {
    /// Time since the number last changed, as of `now`.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.updated_at)
    }

    pub fn is_stale_at(&self, threshold: Duration, now: Instant) -> bool {
        self.age_at(now) > threshold
    }
}

/// Best and finalized block state shared by every request of one strategy.
#[derive(Debug, Default)]
pub struct BlockTracker {
    slots: Mutex<[Option<Block>; 2]>,
}

impl BlockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `number` for `slot` and return the resulting snapshot.
    pub fn observe(&self, slot: Slot, number: i64) -> Block {
        self.observe_at(slot, number, Instant::now())
    }

    pub fn observe_at(&self, slot: Slot, number: i64, now: Instant) -> Block {
        let mut slots = self.lock();
        let entry = &mut slots[slot.index()];

        match *entry {
            Some(block) if block.number == number => block,
            previous => {
                let updated_at = previous.map_or(now, |p| p.updated_at.max(now));
                if let Some(p) = previous {
                    if number < p.number {
                        tracing::info!(slot = %slot, from = p.number, to = number, "Block number went backwards");
                    } else {
                        tracing::trace!(slot = %slot, from = p.number, to = number, "Block advanced");
                    }
                }
                let block = Block { number, updated_at };
                *entry = Some(block);
                block
            }
        }
    }

    /// Restart the clock of an observed `slot` without changing its number.
    pub fn touch_at(&self, slot: Slot, now: Instant) {
        if let Some(block) = self.lock()[slot.index()].as_mut() {
            block.updated_at = block.updated_at.max(now);
        }
    }

    /// Current state of `slot`, if it was ever observed.
    pub fn snapshot(&self, slot: Slot) -> Option<Block> {
        self.lock()[slot.index()]
    }

    pub fn is_stale(&self, slot: Slot, threshold: Duration) -> bool {
        self.is_stale_at(slot, threshold, Instant::now())
    }

    pub fn is_stale_at(&self, slot: Slot, threshold: Duration, now: Instant) -> bool {
        self.snapshot(slot)
            .is_some_and(|block| block.is_stale_at(threshold, now))
    }

    fn lock(&self) -> MutexGuard<'_, [Option<Block>; 2]> {
        // Slots are plain copies; a panic mid-update cannot leave them torn.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse a block number as the node reports it: `0x`-prefixed hex,
/// a decimal string, or a JSON integer.
pub fn parse_block_number(value: &Value) -> Result<i64, ProtocolError> {
    let parsed = match value {
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => i64::from_str_radix(hex, 16).ok(),
                None => s.parse::<i64>().ok(),
            }
        }
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed.ok_or_else(|| ProtocolError::BlockNumber(value.clone()))
}
