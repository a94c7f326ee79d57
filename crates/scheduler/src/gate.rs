//! Pre-execution gate for a profile.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStatus {
    Open,
    Blocked(String),
}

#[derive(Debug, Clone)]
struct Block {
    until: Option<DateTime<Utc>>,
    reason: String,
}

/// Transient block on a profile. While blocked, the loop skips whole ticks
/// unless the selected task was triggered with gating bypassed.
#[derive(Debug, Default)]
pub struct ProfileGate {
    block: Mutex<Option<Block>>,
}

impl ProfileGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `until`. An existing later block is kept.
    pub fn block_until(&self, until: DateTime<Utc>, reason: impl Into<String>) {
        let mut block = self.block.lock();
        let keep_existing = match block.as_ref() {
            Some(existing) => existing.until.map_or(true, |t| t >= until),
            None => false,
        };
        if !keep_existing {
            *block = Some(Block {
                until: Some(until),
                reason: reason.into(),
            });
        }
    }

    /// Block until [`ProfileGate::clear`] is called.
    pub fn close(&self, reason: impl Into<String>) {
        *self.block.lock() = Some(Block {
            until: None,
            reason: reason.into(),
        });
    }

    pub fn clear(&self) {
        *self.block.lock() = None;
    }

    pub fn check(&self, now: DateTime<Utc>) -> GateStatus {
        let mut block = self.block.lock();
        match block.as_ref() {
            None => GateStatus::Open,
            Some(Block { until: Some(until), .. }) if *until <= now => {
                debug!("Gate block expired at {}", until);
                *block = None;
                GateStatus::Open
            }
            Some(b) => GateStatus::Blocked(b.reason.clone()),
        }
    }
}
