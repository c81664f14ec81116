//! Core dispatch logic.
//!
//! This module contains:
//! - Yard: the allocation engine (paths, trains, holding track, reserve)
//! - Handler: the capability the orchestrator dispatches through
//! - Mirror: the shadow view folded from outcomes
//! - Orchestrator: feasibility checks and event dispatch
//! - Limits: safety limits for the shift driver

pub mod handler;
pub mod holding;
pub mod limits;
pub mod mirror;
pub mod orchestrator;
pub mod yard;

// Re-export commonly used types
pub use handler::{DispatchContext, Handler, ShiftHandler, ShiftObserver, YardOperator};
pub use holding::HoldingTrack;
pub use limits::{LimitViolation, ShiftLimits, ShiftTracker};
pub use mirror::{PathMeta, TrainMeta, YardMirror};
pub use orchestrator::{DispatchError, Orchestrator};
pub use yard::{Path, Train, Yard};
