//! Domain types for the sorting yard.
//!
//! This module contains the core data structures:
//! - Rolling stock: wagons, locomotives and their kinds
//! - Events: event categories and the per-operation outcome record
//! - Metrics: shift counters read by reporters

pub mod events;
pub mod metrics;
pub mod rolling_stock;

// Re-export commonly used types
pub use events::{Event, EventType, Outcome, Refusal};
pub use metrics::{KindCounts, ShiftMetrics};
pub use rolling_stock::{train_number, LocoKind, Locomotive, TrainKind, Wagon, WagonKind};
