//! Event orchestrator for a yard shift.
//!
//! Receives one event at a time, answers whether it is currently feasible,
//! dispatches it to every registered handler and folds the outcome into the
//! shadow mirror.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Event, EventType, KindCounts, Outcome, ShiftMetrics, Wagon};

use super::handler::{DispatchContext, Handler, ShiftHandler, YardOperator};
use super::mirror::YardMirror;

/// Errors returned by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Event '{0}' is not feasible in the current yard state")]
    Infeasible(EventType),

    #[error("No pending wagons left to sort")]
    NoPendingWagons,
}

/// Dispatcher over the allocation engine and any observers
pub struct Orchestrator {
    /// Participants in registration order
    handlers: Vec<Handler>,

    path_count: usize,

    /// Wagons that have not yet reached the hump
    pending: VecDeque<Wagon>,

    mirror: YardMirror,

    shift_ending: bool,
}

impl Orchestrator {
    /// Create an orchestrator with an explicit handler list
    pub fn new(path_count: usize, handlers: Vec<Handler>) -> Self {
        Self {
            handlers,
            path_count,
            pending: VecDeque::new(),
            mirror: YardMirror::new(path_count),
            shift_ending: false,
        }
    }

    /// Create an orchestrator driving a fresh [`YardOperator`]
    pub fn with_operator(path_count: usize) -> Self {
        Self::new(path_count, vec![Handler::active(YardOperator::new())])
    }

    /// Append a participant; it receives events after those already registered
    pub fn register(&mut self, handler: Handler) {
        debug!(handler = handler.name(), "Handler registered");
        self.handlers.push(handler);
    }

    /// Queue a wagon for sorting
    pub fn add_wagon(&mut self, wagon: Wagon) {
        self.pending.push_back(wagon);
    }

    pub fn add_wagons<I: IntoIterator<Item = Wagon>>(&mut self, wagons: I) {
        self.pending.extend(wagons);
    }

    pub fn pending_wagons(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending_wagons(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    /// True only while shift-end releases are running
    pub fn is_shift_ending(&self) -> bool {
        self.shift_ending
    }

    pub fn mirror(&self) -> &YardMirror {
        &self.mirror
    }

    pub fn metrics(&self) -> ShiftMetrics {
        let pending = KindCounts::tally(self.pending.iter().map(|w| w.kind));
        self.mirror.metrics(pending)
    }

    /// Whether an event of this category would currently succeed.
    ///
    /// Answered from the mirror only; never mutates.
    pub fn can_handle(&self, event_type: EventType) -> bool {
        match event_type {
            EventType::ShiftStarted | EventType::ShiftEnded => true,
            EventType::PreparePath => self.mirror.has_unprepared_path(),
            EventType::TrainPlanned => self.mirror.has_prepared_path(),
            EventType::LocoArrived => self.mirror.accepts_locomotive(),
            EventType::WagonArrived => self.has_pending_wagons(),
            EventType::TrainReady => {
                if self.mirror.has_full_train() {
                    return true;
                }
                // Partial release only once nothing more can arrive
                !self.has_pending_wagons()
                    && self.mirror.holding_total() == 0
                    && self.mirror.has_loaded_train()
            }
        }
    }

    /// Dispatch an event only if it is feasible
    pub fn try_handle(&mut self, event: Event) -> Result<Outcome, DispatchError> {
        let event_type = event.event_type();
        if !self.can_handle(event_type) {
            debug!(%event_type, "Event rejected");
            return Err(DispatchError::Infeasible(event_type));
        }
        self.handle(event)
    }

    /// Dispatch an event to every handler and fold the outcome.
    ///
    /// Engine operations are safe to call speculatively: an impossible
    /// operation comes back as an unsuccessful outcome.
    pub fn handle(&mut self, event: Event) -> Result<Outcome, DispatchError> {
        debug!(event_type = %event.event_type(), "Handling event");

        let outcome = match event {
            Event::ShiftStarted => self.start_shift(),
            Event::ShiftEnded => self.end_shift(),
            Event::PreparePath => {
                self.dispatch(EventType::PreparePath, |h, o| h.prepare_path(o))
            }
            Event::TrainPlanned => {
                self.dispatch(EventType::TrainPlanned, |h, o| h.allocate_train(o))
            }
            Event::LocoArrived { locomotive } => self.dispatch(EventType::LocoArrived, |h, o| {
                h.handle_locomotive(locomotive, o)
            }),
            Event::WagonArrived => {
                let wagon = self
                    .pending
                    .pop_front()
                    .ok_or(DispatchError::NoPendingWagons)?;
                self.dispatch(EventType::WagonArrived, |h, o| h.handle_wagon(wagon, o))
            }
            Event::TrainReady => self.send_train(),
        };

        Ok(outcome)
    }

    fn start_shift(&mut self) -> Outcome {
        self.mirror.reset(self.path_count);
        self.shift_ending = false;

        let metrics = self.metrics();
        for handler in &mut self.handlers {
            match handler {
                Handler::Active(h) => h.start_shift(self.path_count),
                Handler::Observer(o) => o.shift_started(&metrics),
            }
        }

        info!(
            paths = self.path_count,
            pending = self.pending.len(),
            "Shift started"
        );

        let mut outcome = Outcome::new(EventType::ShiftStarted);
        outcome.success = true;
        outcome.message = format!("Shift started with {} wagons queued", self.pending.len());
        outcome
    }

    fn end_shift(&mut self) -> Outcome {
        self.shift_ending = true;

        let mut released = 0;
        loop {
            let outcome = self.send_train();
            if !outcome.train_sent {
                break;
            }
            released += 1;
        }

        // Trains that never got a locomotive are dropped with their paths
        let discarded = self.mirror.discard_trains();
        self.shift_ending = false;

        let metrics = self.metrics();
        for handler in &mut self.handlers {
            match handler {
                Handler::Active(h) => h.end_shift(),
                Handler::Observer(o) => o.shift_ended(&metrics),
            }
        }

        info!(
            released,
            discarded,
            sent = metrics.sent_trains,
            missed = metrics.wagons_left(),
            "Shift ended"
        );

        let mut outcome = Outcome::new(EventType::ShiftEnded);
        outcome.success = true;
        outcome.message = format!(
            "Shift ended: {} trains released, {} discarded",
            released, discarded
        );
        outcome
    }

    fn send_train(&mut self) -> Outcome {
        let context = DispatchContext {
            no_more_incoming: self.pending.is_empty(),
            force: self.shift_ending,
        };
        self.dispatch(EventType::TrainReady, move |h, o| h.send_train(context, o))
    }

    /// Run one operation through every handler, then fold the outcome
    fn dispatch<F>(&mut self, event_type: EventType, mut operation: F) -> Outcome
    where
        F: FnMut(&mut dyn ShiftHandler, &mut Outcome),
    {
        let mut outcome = Outcome::new(event_type);
        for handler in &mut self.handlers {
            match handler {
                Handler::Active(h) => operation(h.as_mut(), &mut outcome),
                Handler::Observer(o) => o.observe(&outcome),
            }
        }

        self.mirror.apply_outcome(&outcome);
        debug!(
            %event_type,
            success = outcome.success,
            message = %outcome.message,
            "Outcome folded"
        );
        outcome
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("handlers", &self.handlers)
            .field("path_count", &self.path_count)
            .field("pending", &self.pending.len())
            .field("shift_ending", &self.shift_ending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocoKind, TrainKind};

    #[test]
    fn test_fresh_shift_feasibility() {
        let mut orchestrator = Orchestrator::with_operator(2);
        orchestrator.handle(Event::ShiftStarted).unwrap();

        assert!(orchestrator.can_handle(EventType::PreparePath));
        assert!(!orchestrator.can_handle(EventType::TrainPlanned));
        assert!(orchestrator.can_handle(EventType::LocoArrived));
        assert!(!orchestrator.can_handle(EventType::WagonArrived));
        assert!(!orchestrator.can_handle(EventType::TrainReady));
    }

    #[test]
    fn test_try_handle_rejects_without_mutation() {
        let mut orchestrator = Orchestrator::with_operator(1);
        orchestrator.handle(Event::ShiftStarted).unwrap();

        let before = orchestrator.metrics();
        let result = orchestrator.try_handle(Event::TrainPlanned);

        assert_eq!(result, Err(DispatchError::Infeasible(EventType::TrainPlanned)));
        assert_eq!(orchestrator.metrics(), before);
    }

    #[test]
    fn test_wagon_without_input_is_an_error() {
        let mut orchestrator = Orchestrator::with_operator(1);
        orchestrator.handle(Event::ShiftStarted).unwrap();

        assert_eq!(
            orchestrator.handle(Event::WagonArrived),
            Err(DispatchError::NoPendingWagons)
        );
    }

    #[test]
    fn test_loco_blocked_once_every_train_has_one() {
        let mut orchestrator = Orchestrator::with_operator(1);
        orchestrator.add_wagon(Wagon::new(1, TrainKind::Freight));
        orchestrator.handle(Event::ShiftStarted).unwrap();
        orchestrator.handle(Event::PreparePath).unwrap();
        orchestrator.handle(Event::TrainPlanned).unwrap();
        assert!(orchestrator.can_handle(EventType::LocoArrived));

        orchestrator.handle(Event::loco(LocoKind::Electric32)).unwrap();
        assert!(!orchestrator.can_handle(EventType::LocoArrived));
    }
}
