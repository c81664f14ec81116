//! Rolling stock: wagons, locomotives and the kinds that route them.
//!
//! Wagons and trains share one four-valued kind. The kind decides which
//! holding-track queue a wagon waits in and which suffix a train number
//! carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of a wagon, and of the train that may carry it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainKind {
    /// General goods
    Freight,

    /// Passenger coaches
    Passenger,

    /// Hazardous cargo
    Dangerous,

    /// Empty wagons returning to service
    Empty,
}

/// Wagons use the same classification as trains
pub type WagonKind = TrainKind;

impl TrainKind {
    /// All kinds in their fixed tie-break order
    pub const ALL: [TrainKind; 4] = [
        TrainKind::Freight,
        TrainKind::Passenger,
        TrainKind::Dangerous,
        TrainKind::Empty,
    ];

    /// Position of this kind in [`TrainKind::ALL`]
    pub fn index(self) -> usize {
        match self {
            TrainKind::Freight => 0,
            TrainKind::Passenger => 1,
            TrainKind::Dangerous => 2,
            TrainKind::Empty => 3,
        }
    }

    /// Kind at a rotation cursor (wraps around)
    pub fn from_rotation(cursor: usize) -> Self {
        Self::ALL[cursor % Self::ALL.len()]
    }

    /// Release code appended to train numbers
    pub fn suffix(self) -> char {
        match self {
            TrainKind::Freight => 'F',
            TrainKind::Passenger => 'P',
            TrainKind::Dangerous => 'D',
            TrainKind::Empty => 'E',
        }
    }

    /// Parse a release code
    pub fn from_suffix(code: char) -> Option<Self> {
        match code {
            'F' => Some(TrainKind::Freight),
            'P' => Some(TrainKind::Passenger),
            'D' => Some(TrainKind::Dangerous),
            'E' => Some(TrainKind::Empty),
            _ => None,
        }
    }

    /// Recover the kind from a train number such as `0042D`.
    ///
    /// Numbers without a recognised suffix decode to `Freight`. The result is
    /// only used for holding-track bookkeeping, so a bad suffix degrades
    /// instead of failing.
    pub fn from_train_number(number: &str) -> Self {
        match number.chars().last().and_then(Self::from_suffix) {
            Some(kind) => kind,
            None => {
                debug!(number, "Unrecognised train number suffix, assuming freight");
                TrainKind::Freight
            }
        }
    }
}

impl fmt::Display for TrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainKind::Freight => "freight",
            TrainKind::Passenger => "passenger",
            TrainKind::Dangerous => "dangerous",
            TrainKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// Build the display number of a train: zero-padded id plus kind suffix
pub fn train_number(id: u32, kind: TrainKind) -> String {
    format!("{:04}{}", id, kind.suffix())
}

/// A wagon waiting to be sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wagon {
    /// Wagon number as painted on the stock
    pub id: u32,

    /// What the wagon carries
    pub kind: WagonKind,
}

impl Wagon {
    pub fn new(id: u32, kind: WagonKind) -> Self {
        Self { id, kind }
    }
}

/// Traction type of a locomotive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocoKind {
    Electric16,
    Electric32,
    Diesel24,
    Diesel64,
}

impl LocoKind {
    pub const ALL: [LocoKind; 4] = [
        LocoKind::Electric16,
        LocoKind::Electric32,
        LocoKind::Diesel24,
        LocoKind::Diesel64,
    ];

    /// Number of wagons this locomotive can haul
    pub fn capacity(self) -> usize {
        match self {
            LocoKind::Electric16 => 16,
            LocoKind::Electric32 => 32,
            LocoKind::Diesel24 => 24,
            LocoKind::Diesel64 => 64,
        }
    }
}

/// A locomotive delivered to the yard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locomotive {
    pub kind: LocoKind,
}

impl Locomotive {
    pub fn new(kind: LocoKind) -> Self {
        Self { kind }
    }

    pub fn capacity(&self) -> usize {
        self.kind.capacity()
    }
}
