//! Yard events and the outcome record each operation fills.
//!
//! The outcome record is the only channel through which the allocation
//! engine reports its mutations. The orchestrator folds it into its mirror,
//! observers read it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rolling_stock::{LocoKind, Locomotive, TrainKind, Wagon};

/// Categories of events the duty officer can issue during a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Shift begins, all state is reset
    ShiftStarted,

    /// Prepare a classification path
    PreparePath,

    /// Plan a new train on a prepared path
    TrainPlanned,

    /// A locomotive is delivered
    LocoArrived,

    /// The next wagon rolls over the hump
    WagonArrived,

    /// Release a train
    TrainReady,

    /// Shift ends, remaining trains are flushed
    ShiftEnded,
}

impl Default for EventType {
    fn default() -> Self {
        Self::ShiftStarted
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventType::ShiftStarted => "shift started",
            EventType::PreparePath => "prepare path",
            EventType::TrainPlanned => "plan train",
            EventType::LocoArrived => "locomotive arrived",
            EventType::WagonArrived => "wagon to sorting",
            EventType::TrainReady => "send train",
            EventType::ShiftEnded => "shift ended",
        };
        f.write_str(label)
    }
}

/// An event together with the payload it brings into the yard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Event {
    ShiftStarted,
    PreparePath,
    TrainPlanned,
    LocoArrived { locomotive: Locomotive },
    WagonArrived,
    TrainReady,
    ShiftEnded,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        match self {
            Event::ShiftStarted => EventType::ShiftStarted,
            Event::PreparePath => EventType::PreparePath,
            Event::TrainPlanned => EventType::TrainPlanned,
            Event::LocoArrived { .. } => EventType::LocoArrived,
            Event::WagonArrived => EventType::WagonArrived,
            Event::TrainReady => EventType::TrainReady,
            Event::ShiftEnded => EventType::ShiftEnded,
        }
    }

    /// Locomotive arrival shorthand
    pub fn loco(kind: LocoKind) -> Self {
        Event::LocoArrived {
            locomotive: Locomotive::new(kind),
        }
    }
}

/// Why an operation could not be carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refusal {
    #[error("No free unprepared path")]
    NoFreePath,

    #[error("No prepared free path for a train")]
    NoPreparedPath,

    #[error("No train eligible for release")]
    NoTrainReady,
}

/// Result of one engine operation.
///
/// Reset before every operation, then filled by the active handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Which event was attempted
    pub event_type: EventType,

    /// Whether the operation changed yard state
    pub success: bool,

    /// Path the operation applied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_id: Option<usize>,

    /// Display number of the affected train
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_number: Option<String>,

    /// Kind of the affected train
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_kind: Option<TrainKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loco_kind: Option<LocoKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loco_capacity: Option<usize>,

    /// A locomotive was coupled to a specific train
    pub loco_attached: bool,

    /// A locomotive went to the reserve queue
    pub loco_reserved: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wagon: Option<Wagon>,

    /// `Some(true)`: wagon went to the holding track, `Some(false)`: onto a train
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wagon_to_holding: Option<bool>,

    /// Wagons aboard the affected train after the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_wagons: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_capacity: Option<usize>,

    /// Holding-track occupancy after the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding_total: Option<usize>,

    /// Holding-track peak for the shift
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding_peak: Option<usize>,

    /// A train left the yard
    pub train_sent: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal: Option<Refusal>,

    /// Human-readable summary
    pub message: String,
}

impl Outcome {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            ..Default::default()
        }
    }

    /// Clear every field and stamp the event being attempted
    pub fn reset(&mut self, event_type: EventType) {
        *self = Self::new(event_type);
    }

    /// Mark the operation as refused
    pub fn refuse(&mut self, refusal: Refusal) {
        self.success = false;
        self.message = refusal.to_string();
        self.refusal = Some(refusal);
    }
}
