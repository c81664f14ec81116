//! Shift counters exposed for reporting.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::rolling_stock::TrainKind;

/// One counter per train kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub freight: usize,
    pub passenger: usize,
    pub dangerous: usize,
    pub empty: usize,
}

impl KindCounts {
    pub fn total(&self) -> usize {
        self.freight + self.passenger + self.dangerous + self.empty
    }

    /// Count the kinds yielded by an iterator
    pub fn tally<I: IntoIterator<Item = TrainKind>>(kinds: I) -> Self {
        let mut counts = Self::default();
        for kind in kinds {
            counts[kind] += 1;
        }
        counts
    }
}

impl Index<TrainKind> for KindCounts {
    type Output = usize;

    fn index(&self, kind: TrainKind) -> &usize {
        match kind {
            TrainKind::Freight => &self.freight,
            TrainKind::Passenger => &self.passenger,
            TrainKind::Dangerous => &self.dangerous,
            TrainKind::Empty => &self.empty,
        }
    }
}

impl IndexMut<TrainKind> for KindCounts {
    fn index_mut(&mut self, kind: TrainKind) -> &mut usize {
        match kind {
            TrainKind::Freight => &mut self.freight,
            TrainKind::Passenger => &mut self.passenger,
            TrainKind::Dangerous => &mut self.dangerous,
            TrainKind::Empty => &mut self.empty,
        }
    }
}

/// Snapshot of the shift counters, reset at shift start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftMetrics {
    /// Number of classification paths in the yard
    pub paths: usize,

    pub prepared_paths: usize,
    pub planned_trains: usize,
    pub arrived_locos: usize,

    /// Wagons taken from the input queue
    pub processed_wagons: usize,

    pub sent_trains: usize,

    /// Wagons that left aboard sent trains
    pub departed_wagons: usize,

    /// Wagons currently on the holding track
    pub holding_total: usize,

    /// Highest holding-track occupancy this shift
    pub holding_peak: usize,

    pub holding_by_kind: KindCounts,

    /// Wagons still waiting in the input queue
    pub pending_by_kind: KindCounts,
}

impl ShiftMetrics {
    pub fn pending_total(&self) -> usize {
        self.pending_by_kind.total()
    }

    /// Wagons of a kind that no sent train picked up: still pending or
    /// still on the holding track
    pub fn missed(&self, kind: TrainKind) -> usize {
        self.pending_by_kind[kind] + self.holding_by_kind[kind]
    }

    pub fn missed_by_kind(&self) -> KindCounts {
        let mut missed = KindCounts::default();
        for kind in TrainKind::ALL {
            missed[kind] = self.missed(kind);
        }
        missed
    }

    /// Wagons left in the yard system: pending input plus holding track
    pub fn wagons_left(&self) -> usize {
        self.pending_total() + self.holding_total
    }
}
