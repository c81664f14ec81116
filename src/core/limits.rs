//! Safety limits for the shift driver loop.
//!
//! The driver draws random events until the input queue is empty. These
//! limits stop a misconfigured workload from spinning forever.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits applied to one shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftLimits {
    /// Maximum number of events drawn per shift (default: 1,000,000)
    #[serde(default = "default_max_events")]
    pub max_events: u64,
}

fn default_max_events() -> u64 {
    1_000_000
}

impl Default for ShiftLimits {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
        }
    }
}

impl ShiftLimits {
    /// Check current tracker state against limits
    pub fn check(&self, tracker: &ShiftTracker) -> Result<(), LimitViolation> {
        if tracker.events_drawn >= self.max_events {
            return Err(LimitViolation::MaxEvents {
                actual: tracker.events_drawn,
                limit: self.max_events,
            });
        }
        Ok(())
    }
}

/// Tracks driver activity during a shift
#[derive(Debug, Clone, Default)]
pub struct ShiftTracker {
    /// Events drawn from the source, feasible or not
    pub events_drawn: u64,

    /// Events that passed the feasibility check and were dispatched
    pub events_dispatched: u64,
}

impl ShiftTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_draw(&mut self, dispatched: bool) {
        self.events_drawn += 1;
        if dispatched {
            self.events_dispatched += 1;
        }
    }

    /// Events drawn but rejected as infeasible
    pub fn events_rejected(&self) -> u64 {
        self.events_drawn - self.events_dispatched
    }
}

/// Limit violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Maximum events exceeded: {actual} >= {limit}")]
    MaxEvents { actual: u64, limit: u64 },
}
