//! Per-shift driver loop.
//!
//! Draws random events from the workload, dispatches the feasible ones and
//! ends the shift once the input queue is empty.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::core::{LimitViolation, Orchestrator, ShiftLimits, ShiftTracker};
use crate::domain::{Event, ShiftMetrics, Wagon};
use crate::workload::WorkloadGenerator;

/// What the driver saw during one shift
#[derive(Debug, Clone)]
pub struct ShiftSummary {
    pub metrics: ShiftMetrics,
    pub events_drawn: u64,
    pub events_dispatched: u64,

    /// Set when the driver stopped before the input queue ran dry
    pub limit_reached: Option<LimitViolation>,
}

/// Drives an orchestrator through one shift
#[derive(Debug)]
pub struct ShiftRunner {
    generator: WorkloadGenerator,
    limits: ShiftLimits,
    pace: Duration,
}

impl ShiftRunner {
    pub fn new(generator: WorkloadGenerator, limits: ShiftLimits, pace_ms: u64) -> Self {
        Self {
            generator,
            limits,
            pace: Duration::from_millis(pace_ms),
        }
    }

    /// Build an orchestrator sized and loaded by the workload.
    ///
    /// Explicit `paths` / `wagons` override the random draw.
    pub fn prepare_shift(&mut self, paths: Option<usize>, wagons: Option<usize>) -> Orchestrator {
        let path_count = paths.unwrap_or_else(|| self.generator.path_count());
        let incoming: Vec<Wagon> = match wagons {
            Some(count) => (0..count).map(|_| self.generator.wagon()).collect(),
            None => self.generator.wagons(),
        };

        let mut orchestrator = Orchestrator::with_operator(path_count);
        orchestrator.add_wagons(incoming);
        orchestrator
    }

    /// Run a complete shift: start, random events until the queue is empty, end
    #[instrument(skip_all, fields(paths = orchestrator.path_count()))]
    pub async fn run(&mut self, orchestrator: &mut Orchestrator) -> Result<ShiftSummary> {
        orchestrator.handle(Event::ShiftStarted)?;

        let mut tracker = ShiftTracker::new();
        let mut limit_reached = None;

        while orchestrator.has_pending_wagons() {
            if let Err(violation) = self.limits.check(&tracker) {
                warn!(%violation, pending = orchestrator.pending_wagons(), "Stopping shift early");
                limit_reached = Some(violation);
                break;
            }

            let event = self.generator.next_event();
            let feasible = orchestrator.can_handle(event.event_type());
            tracker.record_draw(feasible);
            if !feasible {
                continue;
            }

            let outcome = orchestrator.handle(event)?;
            debug!(event_type = %outcome.event_type, message = %outcome.message, "Duty officer command");

            if !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
        }

        orchestrator.handle(Event::ShiftEnded)?;

        let metrics = orchestrator.metrics();
        info!(
            drawn = tracker.events_drawn,
            dispatched = tracker.events_dispatched,
            rejected = tracker.events_rejected(),
            sent = metrics.sent_trains,
            "Shift complete"
        );

        Ok(ShiftSummary {
            metrics,
            events_drawn: tracker.events_drawn,
            events_dispatched: tracker.events_dispatched,
            limit_reached,
        })
    }
}
