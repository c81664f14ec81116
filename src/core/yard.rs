//! Allocation engine for the sorting yard.
//!
//! Owns paths, trains, the holding track and the locomotive reserve, and
//! implements the state-changing operations of a shift. Every operation
//! either mutates consistently and reports success, or leaves the yard
//! untouched and fills a refusal into the outcome.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::domain::{
    train_number, EventType, Locomotive, Outcome, Refusal, TrainKind, Wagon,
};

use super::holding::HoldingTrack;

/// A classification path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    /// Path was prepared and may receive a train
    pub prepared: bool,

    /// Id of the train standing on the path
    pub train: Option<u32>,
}

impl Path {
    pub fn is_occupied(&self) -> bool {
        self.train.is_some()
    }
}

/// A train being formed on a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Train {
    pub id: u32,
    pub number: String,
    pub kind: TrainKind,
    pub path_id: usize,
    pub locomotive: Option<Locomotive>,

    /// Zero until a locomotive couples
    pub capacity: usize,

    /// Wagons in arrival order
    pub wagons: Vec<Wagon>,
}

impl Train {
    fn new(id: u32, kind: TrainKind, path_id: usize) -> Self {
        Self {
            id,
            number: train_number(id, kind),
            kind,
            path_id,
            locomotive: None,
            capacity: 0,
            wagons: Vec::new(),
        }
    }

    pub fn has_locomotive(&self) -> bool {
        self.locomotive.is_some()
    }

    /// Locomotive attached and every slot taken
    pub fn is_full(&self) -> bool {
        self.has_locomotive() && self.capacity > 0 && self.wagons.len() >= self.capacity
    }

    /// Locomotive attached and at least one free slot
    pub fn has_room(&self) -> bool {
        self.has_locomotive() && self.capacity > 0 && self.wagons.len() < self.capacity
    }
}

/// Yard state for one shift
#[derive(Debug, Clone)]
pub struct Yard {
    paths: Vec<Path>,

    /// Active trains in creation order
    trains: VecDeque<Train>,

    holding: HoldingTrack,

    /// Locomotives waiting for a train, oldest first
    reserve: VecDeque<Locomotive>,

    next_train_id: u32,
    kind_rotation: usize,
}

impl Default for Yard {
    fn default() -> Self {
        Self::new()
    }
}

impl Yard {
    /// Create an empty yard with no paths; call [`Yard::start_shift`] before use
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            trains: VecDeque::new(),
            holding: HoldingTrack::new(),
            reserve: VecDeque::new(),
            next_train_id: 1,
            kind_rotation: 0,
        }
    }

    /// Create a yard with a shift already started on `path_count` paths
    pub fn with_paths(path_count: usize) -> Self {
        let mut yard = Self::new();
        yard.start_shift(path_count);
        yard
    }

    /// Reset every piece of state for a new shift
    pub fn start_shift(&mut self, path_count: usize) {
        self.paths = vec![Path::default(); path_count];
        self.trains.clear();
        self.holding.reset();
        self.reserve.clear();
        self.next_train_id = 1;
        self.kind_rotation = 0;
        debug!(path_count, "Yard reset for new shift");
    }

    /// Flush the yard at shift end.
    ///
    /// Releases every train with a locomotive, discards trains that never got
    /// one, and empties the reserve and the holding track. Returns the number
    /// of trains released. Safe to call repeatedly.
    pub fn end_shift(&mut self) -> usize {
        let mut outcome = Outcome::default();
        let mut released = 0;
        while self.send_train(true, true, &mut outcome) {
            released += 1;
        }

        let discarded = self.trains.len();
        for train in self.trains.drain(..) {
            if let Some(path) = self.paths.get_mut(train.path_id) {
                path.train = None;
                path.prepared = false;
            }
        }

        self.reserve.clear();
        self.holding.clear();

        info!(released, discarded, "Yard flushed at shift end");
        released
    }

    /// Prepare the lowest-index path that is neither prepared nor occupied
    pub fn prepare_path(&mut self, outcome: &mut Outcome) -> bool {
        outcome.reset(EventType::PreparePath);

        let Some(path_id) = self
            .paths
            .iter()
            .position(|p| !p.prepared && !p.is_occupied())
        else {
            outcome.refuse(Refusal::NoFreePath);
            return false;
        };

        self.paths[path_id].prepared = true;

        outcome.success = true;
        outcome.path_id = Some(path_id);
        outcome.message = format!("Path #{} prepared", path_id);
        debug!(path_id, "Path prepared");
        true
    }

    /// Plan a train on the lowest-index prepared free path.
    ///
    /// A reserved locomotive, if any, couples to the new train at once.
    pub fn allocate_train(&mut self, outcome: &mut Outcome) -> bool {
        outcome.reset(EventType::TrainPlanned);

        let Some(path_id) = self
            .paths
            .iter()
            .position(|p| p.prepared && !p.is_occupied())
        else {
            outcome.refuse(Refusal::NoPreparedPath);
            return false;
        };

        let kind = self.choose_kind();
        let id = self.next_train_id;
        self.next_train_id += 1;

        let train = Train::new(id, kind, path_id);
        let number = train.number.clone();
        self.paths[path_id].train = Some(id);
        self.trains.push_back(train);

        if let Some(loco) = self.reserve.pop_front() {
            let idx = self.trains.len() - 1;
            self.attach_locomotive(idx, loco, outcome);
        }

        outcome.success = true;
        outcome.path_id = Some(path_id);
        outcome.train_kind = Some(kind);
        outcome.message = format!("Train {} planned on path #{}", number, path_id);
        outcome.train_number = Some(number);
        debug!(path_id, train = ?outcome.train_number, "Train planned");
        true
    }

    /// Couple a locomotive to the oldest train without one, or reserve it
    pub fn handle_locomotive(&mut self, loco: Locomotive, outcome: &mut Outcome) -> bool {
        outcome.reset(EventType::LocoArrived);
        outcome.loco_kind = Some(loco.kind);

        let Some(idx) = self.trains.iter().position(|t| !t.has_locomotive()) else {
            self.reserve.push_back(loco);
            outcome.success = true;
            outcome.loco_reserved = true;
            outcome.message = "Locomotive reserved (no train without a locomotive)".to_string();
            debug!(kind = ?loco.kind, reserve = self.reserve.len(), "Locomotive reserved");
            return true;
        };

        self.attach_locomotive(idx, loco, outcome);

        let train = &self.trains[idx];
        outcome.success = true;
        outcome.path_id = Some(train.path_id);
        outcome.train_number = Some(train.number.clone());
        outcome.train_kind = Some(train.kind);
        outcome.message = format!("Locomotive coupled to train {}", train.number);
        true
    }

    /// Route a wagon onto the oldest matching train with room, else onto the
    /// holding track
    pub fn handle_wagon(&mut self, wagon: Wagon, outcome: &mut Outcome) -> bool {
        outcome.reset(EventType::WagonArrived);
        outcome.wagon = Some(wagon);

        let kind = wagon.kind;
        let Some(idx) = self
            .trains
            .iter()
            .position(|t| t.kind == kind && t.has_room())
        else {
            self.holding.push(wagon);
            outcome.success = true;
            outcome.wagon_to_holding = Some(true);
            outcome.holding_total = Some(self.holding.total());
            outcome.holding_peak = Some(self.holding.peak());
            outcome.message = "Wagon sent to the holding track".to_string();
            debug!(wagon = wagon.id, %kind, holding = self.holding.total(), "Wagon held");
            return true;
        };

        let train = &mut self.trains[idx];
        train.wagons.push(wagon);

        outcome.success = true;
        outcome.wagon_to_holding = Some(false);
        outcome.path_id = Some(train.path_id);
        outcome.train_number = Some(train.number.clone());
        outcome.train_kind = Some(train.kind);
        outcome.train_wagons = Some(train.wagons.len());
        outcome.train_capacity = Some(train.capacity);
        outcome.message = format!("Wagon coupled to train {}", train.number);
        true
    }

    /// Release a train.
    ///
    /// A full train always goes first. Otherwise a partial train may leave
    /// only when `force` is set, or when `no_more_incoming` holds and the
    /// holding track is empty; an empty train leaves only when forced.
    pub fn send_train(&mut self, no_more_incoming: bool, force: bool, outcome: &mut Outcome) -> bool {
        outcome.reset(EventType::TrainReady);

        let allow_partial = force || (no_more_incoming && self.holding.is_empty());

        let full = self.trains.iter().position(Train::is_full);
        let candidate = full.or_else(|| {
            if !allow_partial {
                return None;
            }
            self.trains
                .iter()
                .position(|t| t.has_locomotive() && (force || !t.wagons.is_empty()))
        });

        let Some(idx) = candidate else {
            outcome.refuse(Refusal::NoTrainReady);
            return false;
        };

        let Some(train) = self.trains.remove(idx) else {
            outcome.refuse(Refusal::NoTrainReady);
            return false;
        };
        if let Some(path) = self.paths.get_mut(train.path_id) {
            path.train = None;
            path.prepared = false;
        }

        outcome.success = true;
        outcome.train_sent = true;
        outcome.path_id = Some(train.path_id);
        outcome.train_kind = Some(train.kind);
        outcome.train_wagons = Some(train.wagons.len());
        outcome.train_capacity = Some(train.capacity);
        outcome.message = if full.is_some() {
            format!("Full train {} sent", train.number)
        } else {
            format!("Train {} sent", train.number)
        };
        info!(
            train = %train.number,
            wagons = train.wagons.len(),
            capacity = train.capacity,
            forced = force,
            "Train sent"
        );
        outcome.train_number = Some(train.number);
        true
    }

    /// Paths by index
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Active trains in creation order
    pub fn trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.iter()
    }

    pub fn train(&self, number: &str) -> Option<&Train> {
        self.trains.iter().find(|t| t.number == number)
    }

    pub fn holding(&self) -> &HoldingTrack {
        &self.holding
    }

    pub fn reserve_len(&self) -> usize {
        self.reserve.len()
    }

    /// Wagons currently aboard unsent trains
    pub fn wagons_aboard(&self) -> usize {
        self.trains.iter().map(|t| t.wagons.len()).sum()
    }

    fn choose_kind(&mut self) -> TrainKind {
        if let Some(kind) = self.holding.largest_kind() {
            return kind;
        }
        let kind = TrainKind::from_rotation(self.kind_rotation);
        self.kind_rotation += 1;
        kind
    }

    fn attach_locomotive(&mut self, idx: usize, loco: Locomotive, outcome: &mut Outcome) {
        let train = &mut self.trains[idx];
        train.locomotive = Some(loco);
        train.capacity = loco.capacity();

        let room = train.capacity.saturating_sub(train.wagons.len());
        let drained = self.holding.drain_into(train.kind, room, &mut train.wagons);
        if drained > 0 {
            debug!(train = %train.number, drained, "Holding track drained");
        }

        outcome.loco_kind = Some(loco.kind);
        outcome.loco_attached = true;
        outcome.loco_capacity = Some(train.capacity);
        outcome.train_capacity = Some(train.capacity);
        outcome.train_wagons = Some(train.wagons.len());
        outcome.holding_total = Some(self.holding.total());
        outcome.holding_peak = Some(self.holding.peak());
    }
}
