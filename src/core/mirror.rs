//! Shadow view of the yard, rebuilt from outcome records.
//!
//! The orchestrator never looks inside the engine. It folds every outcome
//! into this mirror and answers feasibility questions and shift counters
//! from it.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{EventType, KindCounts, Outcome, ShiftMetrics, TrainKind};

/// Mirrored state of one path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMeta {
    pub prepared: bool,
    pub occupied: bool,
    pub train_number: Option<String>,
}

/// Mirrored state of one train
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainMeta {
    pub kind: TrainKind,
    pub has_loco: bool,
    pub capacity: usize,
    pub wagons: usize,
    pub path_id: usize,
}

impl TrainMeta {
    pub fn is_full(&self) -> bool {
        self.has_loco && self.capacity > 0 && self.wagons >= self.capacity
    }
}

/// Read model kept in sync by [`YardMirror::apply_outcome`]
#[derive(Debug, Clone, Default)]
pub struct YardMirror {
    paths: Vec<PathMeta>,
    trains: HashMap<String, TrainMeta>,

    holding_total: usize,
    holding_peak: usize,
    holding_by_kind: KindCounts,

    prepared_paths: usize,
    planned_trains: usize,
    arrived_locos: usize,
    processed_wagons: usize,
    sent_trains: usize,
    departed_wagons: usize,
}

impl YardMirror {
    pub fn new(path_count: usize) -> Self {
        let mut mirror = Self::default();
        mirror.reset(path_count);
        mirror
    }

    /// Forget everything, including the shift counters
    pub fn reset(&mut self, path_count: usize) {
        *self = Self {
            paths: vec![PathMeta::default(); path_count],
            ..Default::default()
        };
    }

    /// Fold one outcome into the mirror
    pub fn apply_outcome(&mut self, outcome: &Outcome) {
        // Holding-track drains are only visible as a drop in the total.
        let previous_total = self.holding_total;
        if let Some(total) = outcome.holding_total {
            self.holding_total = total;
        }
        if let Some(peak) = outcome.holding_peak {
            self.holding_peak = self.holding_peak.max(peak);
        }

        match outcome.event_type {
            EventType::PreparePath => {
                if !outcome.success {
                    return;
                }
                if let Some(path) = outcome.path_id.and_then(|id| self.paths.get_mut(id)) {
                    if !path.prepared {
                        path.prepared = true;
                        self.prepared_paths += 1;
                    }
                }
            }

            EventType::TrainPlanned => {
                let (true, Some(path_id), Some(number)) =
                    (outcome.success, outcome.path_id, outcome.train_number.as_ref())
                else {
                    return;
                };
                let Some(kind) = outcome_kind(outcome) else {
                    return;
                };

                if let Some(path) = self.paths.get_mut(path_id) {
                    path.occupied = true;
                    path.train_number = Some(number.clone());
                }

                let meta = TrainMeta {
                    kind,
                    has_loco: outcome.loco_attached,
                    capacity: outcome.loco_capacity.unwrap_or(0),
                    wagons: outcome.train_wagons.unwrap_or(0),
                    path_id,
                };
                self.trains.insert(number.clone(), meta);
                self.planned_trains += 1;

                // A reserved locomotive may have coupled and drained the ring
                self.apply_drain(previous_total, outcome);
            }

            EventType::LocoArrived => {
                if !outcome.success {
                    return;
                }
                self.arrived_locos += 1;

                if !outcome.loco_attached {
                    return;
                }
                if let Some(meta) = outcome
                    .train_number
                    .as_ref()
                    .and_then(|n| self.trains.get_mut(n))
                {
                    meta.has_loco = true;
                    if let Some(capacity) = outcome.loco_capacity {
                        meta.capacity = capacity;
                    }
                    if let Some(wagons) = outcome.train_wagons {
                        meta.wagons = wagons;
                    }
                    if let Some(path_id) = outcome.path_id {
                        meta.path_id = path_id;
                    }
                }
                self.apply_drain(previous_total, outcome);
            }

            EventType::WagonArrived => {
                if !outcome.success {
                    return;
                }
                self.processed_wagons += 1;

                match outcome.wagon_to_holding {
                    Some(true) => {
                        if let Some(wagon) = outcome.wagon {
                            self.holding_by_kind[wagon.kind] += 1;
                        }
                        if outcome.holding_total.is_none() {
                            self.holding_total += 1;
                            self.holding_peak = self.holding_peak.max(self.holding_total);
                        }
                    }
                    Some(false) => {
                        if let Some(meta) = outcome
                            .train_number
                            .as_ref()
                            .and_then(|n| self.trains.get_mut(n))
                        {
                            if let Some(wagons) = outcome.train_wagons {
                                meta.wagons = wagons;
                            }
                            if let Some(capacity) = outcome.train_capacity {
                                meta.capacity = capacity;
                            }
                        }
                    }
                    None => {}
                }
            }

            EventType::TrainReady => {
                if !outcome.train_sent {
                    return;
                }
                let removed = outcome
                    .train_number
                    .as_ref()
                    .and_then(|n| self.trains.remove(n));

                let path_id = match removed {
                    Some(meta) => Some(meta.path_id),
                    None => {
                        warn!(
                            train = ?outcome.train_number,
                            "Sent train missing from mirror, freeing path from outcome"
                        );
                        outcome.path_id
                    }
                };
                if let Some(id) = path_id {
                    self.free_path(id);
                }

                self.sent_trains += 1;
                self.departed_wagons += outcome.train_wagons.unwrap_or(0);
            }

            EventType::ShiftStarted | EventType::ShiftEnded => {}
        }
    }

    /// Drop every mirrored train and free its path.
    ///
    /// Returns how many trains were discarded.
    pub fn discard_trains(&mut self) -> usize {
        let path_ids: Vec<usize> = self.trains.values().map(|meta| meta.path_id).collect();
        for id in &path_ids {
            self.free_path(*id);
        }
        self.trains.clear();
        path_ids.len()
    }

    /// Some path is neither prepared nor occupied
    pub fn has_unprepared_path(&self) -> bool {
        self.paths.iter().any(|p| !p.occupied && !p.prepared)
    }

    /// Some path is prepared and free
    pub fn has_prepared_path(&self) -> bool {
        self.paths.iter().any(|p| !p.occupied && p.prepared)
    }

    /// A locomotive would be coupled, or there is no train to compete with
    /// the reserve
    pub fn accepts_locomotive(&self) -> bool {
        self.trains.is_empty() || self.trains.values().any(|t| !t.has_loco)
    }

    pub fn has_full_train(&self) -> bool {
        self.trains.values().any(TrainMeta::is_full)
    }

    /// Some train with a locomotive carries at least one wagon
    pub fn has_loaded_train(&self) -> bool {
        self.trains.values().any(|t| t.has_loco && t.wagons > 0)
    }

    pub fn paths(&self) -> &[PathMeta] {
        &self.paths
    }

    pub fn train(&self, number: &str) -> Option<&TrainMeta> {
        self.trains.get(number)
    }

    pub fn trains(&self) -> impl Iterator<Item = (&String, &TrainMeta)> {
        self.trains.iter()
    }

    pub fn holding_total(&self) -> usize {
        self.holding_total
    }

    pub fn holding_by_kind(&self) -> KindCounts {
        self.holding_by_kind
    }

    pub fn processed_wagons(&self) -> usize {
        self.processed_wagons
    }

    /// Counter snapshot; pending input is owned by the orchestrator
    pub fn metrics(&self, pending_by_kind: KindCounts) -> ShiftMetrics {
        ShiftMetrics {
            paths: self.paths.len(),
            prepared_paths: self.prepared_paths,
            planned_trains: self.planned_trains,
            arrived_locos: self.arrived_locos,
            processed_wagons: self.processed_wagons,
            sent_trains: self.sent_trains,
            departed_wagons: self.departed_wagons,
            holding_total: self.holding_total,
            holding_peak: self.holding_peak,
            holding_by_kind: self.holding_by_kind,
            pending_by_kind,
        }
    }

    fn free_path(&mut self, id: usize) {
        if let Some(path) = self.paths.get_mut(id) {
            *path = PathMeta::default();
        }
    }

    fn apply_drain(&mut self, previous_total: usize, outcome: &Outcome) {
        if previous_total <= self.holding_total {
            return;
        }
        let Some(kind) = outcome_kind(outcome) else {
            return;
        };
        let drained = previous_total - self.holding_total;
        let queued = &mut self.holding_by_kind[kind];
        *queued = queued.saturating_sub(drained);
    }
}

/// Kind of the train an outcome refers to, decoded from its number when the
/// outcome does not carry it
fn outcome_kind(outcome: &Outcome) -> Option<TrainKind> {
    outcome.train_kind.or_else(|| {
        outcome
            .train_number
            .as_deref()
            .map(TrainKind::from_train_number)
    })
}
