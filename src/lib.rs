//! sorting-yard - Dispatch engine for a rail marshalling yard
//!
//! Routes incoming wagons onto a limited number of classification paths,
//! matches trains with locomotives and releases complete or partial trains
//! over one working shift.
//!
//! # Architecture
//!
//! Two layers make up the core:
//! - The allocation engine (`Yard`) owns all yard state and performs the
//!   operations of a shift, reporting each mutation in an `Outcome`
//! - The orchestrator checks event feasibility, dispatches events to the
//!   engine and to passive observers, and folds each outcome into a shadow
//!   mirror used for feasibility checks and shift counters
//!
//! # Modules
//!
//! - `core`: Engine, handler capability, mirror, orchestrator, driver limits
//! - `domain`: Data structures (Wagon, Locomotive, Event, Outcome, metrics)
//! - `workload`: Seeded random event source
//! - `simulation`: Per-shift driver loop
//! - `report`: Shift report and reporter observer
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Simulate a shift
//! sorting-yard run --seed 42
//!
//! # Reproducible small shift with a JSON report
//! sorting-yard run --paths 3 --wagons 200 --seed 7 --json
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod simulation;
pub mod workload;

// Re-export main types at crate root for convenience
pub use core::{Orchestrator, Yard};
pub use domain::{Event, EventType, Locomotive, Outcome, TrainKind, Wagon};
pub use report::{ShiftReport, ShiftReporter};
