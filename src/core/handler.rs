//! Handler capability consumed by the orchestrator.
//!
//! Two kinds of participants receive every dispatched event:
//! - Active handlers (the yard operator) perform the operation and fill the
//!   outcome record.
//! - Observers (reporters, recorders) only ever see the finished outcome
//!   through a shared reference.

use crate::domain::{Locomotive, Outcome, ShiftMetrics, Wagon};

use super::yard::Yard;

/// Release conditions passed to `send_train`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchContext {
    /// The input queue is exhausted
    pub no_more_incoming: bool,

    /// Shift-end drain: release anything with a locomotive
    pub force: bool,
}

/// A participant that carries out yard operations
pub trait ShiftHandler {
    /// Human-readable handler name
    fn name(&self) -> &str;

    fn start_shift(&mut self, path_count: usize);

    fn end_shift(&mut self);

    fn prepare_path(&mut self, outcome: &mut Outcome);

    fn allocate_train(&mut self, outcome: &mut Outcome);

    fn handle_locomotive(&mut self, locomotive: Locomotive, outcome: &mut Outcome);

    fn handle_wagon(&mut self, wagon: Wagon, outcome: &mut Outcome);

    fn send_train(&mut self, context: DispatchContext, outcome: &mut Outcome);
}

/// A passive participant; it can read outcomes and counters but never
/// change them
pub trait ShiftObserver {
    fn name(&self) -> &str;

    fn shift_started(&mut self, _metrics: &ShiftMetrics) {}

    fn shift_ended(&mut self, _metrics: &ShiftMetrics) {}

    /// Called for every dispatched operation, in registration order
    fn observe(&mut self, _outcome: &Outcome) {}
}

/// Registered participant
pub enum Handler {
    Active(Box<dyn ShiftHandler>),
    Observer(Box<dyn ShiftObserver>),
}

impl Handler {
    pub fn active<H: ShiftHandler + 'static>(handler: H) -> Self {
        Handler::Active(Box::new(handler))
    }

    pub fn observer<O: ShiftObserver + 'static>(observer: O) -> Self {
        Handler::Observer(Box::new(observer))
    }

    pub fn name(&self) -> &str {
        match self {
            Handler::Active(h) => h.name(),
            Handler::Observer(o) => o.name(),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Active(h) => f.debug_tuple("Active").field(&h.name()).finish(),
            Handler::Observer(o) => f.debug_tuple("Observer").field(&o.name()).finish(),
        }
    }
}

/// Active handler driving a [`Yard`]
#[derive(Debug, Default)]
pub struct YardOperator {
    yard: Yard,
}

impl YardOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yard(&self) -> &Yard {
        &self.yard
    }
}

impl ShiftHandler for YardOperator {
    fn name(&self) -> &str {
        "yard-operator"
    }

    fn start_shift(&mut self, path_count: usize) {
        self.yard.start_shift(path_count);
    }

    fn end_shift(&mut self) {
        self.yard.end_shift();
    }

    fn prepare_path(&mut self, outcome: &mut Outcome) {
        self.yard.prepare_path(outcome);
    }

    fn allocate_train(&mut self, outcome: &mut Outcome) {
        self.yard.allocate_train(outcome);
    }

    fn handle_locomotive(&mut self, locomotive: Locomotive, outcome: &mut Outcome) {
        self.yard.handle_locomotive(locomotive, outcome);
    }

    fn handle_wagon(&mut self, wagon: Wagon, outcome: &mut Outcome) {
        self.yard.handle_wagon(wagon, outcome);
    }

    fn send_train(&mut self, context: DispatchContext, outcome: &mut Outcome) {
        self.yard
            .send_train(context.no_more_incoming, context.force, outcome);
    }
}
