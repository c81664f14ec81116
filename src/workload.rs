//! Random workload for a shift.
//!
//! Stands in for the dispatcher's radio: picks the yard size, the incoming
//! wagons and the stream of event categories. All randomness in the crate
//! lives here; the same seed always yields the same shift.

use std::ops::RangeInclusive;

use anyhow::{Context, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{Event, EventType, LocoKind, Locomotive, TrainKind, Wagon};

/// Highest wagon number painted on stock
const MAX_WAGON_NUMBER: u32 = 99_999_999;

/// Relative frequency of each event category drawn by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWeights {
    #[serde(default = "default_wagon_weight")]
    pub wagon: u32,
    #[serde(default = "default_loco_weight")]
    pub loco: u32,
    #[serde(default = "default_prepare_weight")]
    pub prepare: u32,
    #[serde(default = "default_plan_weight")]
    pub plan: u32,
    #[serde(default = "default_ready_weight")]
    pub ready: u32,
}

fn default_wagon_weight() -> u32 {
    9
}
fn default_loco_weight() -> u32 {
    4
}
fn default_prepare_weight() -> u32 {
    2
}
fn default_plan_weight() -> u32 {
    1
}
fn default_ready_weight() -> u32 {
    1
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            wagon: default_wagon_weight(),
            loco: default_loco_weight(),
            prepare: default_prepare_weight(),
            plan: default_plan_weight(),
            ready: default_ready_weight(),
        }
    }
}

impl EventWeights {
    fn table(&self) -> [(EventType, u32); 5] {
        [
            (EventType::WagonArrived, self.wagon),
            (EventType::LocoArrived, self.loco),
            (EventType::PreparePath, self.prepare),
            (EventType::TrainPlanned, self.plan),
            (EventType::TrainReady, self.ready),
        ]
    }
}

/// Shape of the generated shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSettings {
    #[serde(default = "default_min_paths")]
    pub min_paths: usize,
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    #[serde(default = "default_min_wagons")]
    pub min_wagons: usize,
    #[serde(default = "default_max_wagons")]
    pub max_wagons: usize,
    #[serde(default)]
    pub event_weights: EventWeights,
}

fn default_min_paths() -> usize {
    2
}
fn default_max_paths() -> usize {
    15
}
fn default_min_wagons() -> usize {
    1024
}
fn default_max_wagons() -> usize {
    4095
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            min_paths: default_min_paths(),
            max_paths: default_max_paths(),
            min_wagons: default_min_wagons(),
            max_wagons: default_max_wagons(),
            event_weights: EventWeights::default(),
        }
    }
}

impl WorkloadSettings {
    /// Validate ranges and weights
    pub fn validate(&self) -> Result<()> {
        if self.min_paths == 0 {
            anyhow::bail!("Yard needs at least one path");
        }
        if self.min_paths > self.max_paths {
            anyhow::bail!(
                "Invalid path range: {} > {}",
                self.min_paths,
                self.max_paths
            );
        }
        if self.min_wagons > self.max_wagons {
            anyhow::bail!(
                "Invalid wagon range: {} > {}",
                self.min_wagons,
                self.max_wagons
            );
        }
        if self.event_weights.wagon == 0 {
            // The driver runs until the input queue is empty
            anyhow::bail!("Wagon event weight must be positive");
        }
        Ok(())
    }

    pub fn paths(&self) -> RangeInclusive<usize> {
        self.min_paths..=self.max_paths
    }

    pub fn wagons(&self) -> RangeInclusive<usize> {
        self.min_wagons..=self.max_wagons
    }
}

/// Seeded source of wagons, locomotives and events
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    rng: ChaCha8Rng,
    settings: WorkloadSettings,
    events: Vec<EventType>,
    picker: WeightedIndex<u32>,
}

impl WorkloadGenerator {
    /// Create a generator; without a seed the RNG is seeded from entropy
    pub fn new(settings: WorkloadSettings, seed: Option<u64>) -> Result<Self> {
        settings.validate()?;

        let (events, weights): (Vec<EventType>, Vec<u32>) =
            settings.event_weights.table().into_iter().unzip();
        let picker = WeightedIndex::new(&weights).context("Invalid event weights")?;

        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            rng,
            settings,
            events,
            picker,
        })
    }

    pub fn settings(&self) -> &WorkloadSettings {
        &self.settings
    }

    /// Number of classification paths for the shift
    pub fn path_count(&mut self) -> usize {
        self.rng.gen_range(self.settings.paths())
    }

    /// The shift's incoming wagons, in arrival order
    pub fn wagons(&mut self) -> Vec<Wagon> {
        let count = self.rng.gen_range(self.settings.wagons());
        (0..count).map(|_| self.wagon()).collect()
    }

    pub fn wagon(&mut self) -> Wagon {
        let id = self.rng.gen_range(0..=MAX_WAGON_NUMBER);
        let kind = TrainKind::ALL[self.rng.gen_range(0..TrainKind::ALL.len())];
        Wagon::new(id, kind)
    }

    pub fn locomotive(&mut self) -> Locomotive {
        Locomotive::new(LocoKind::ALL[self.rng.gen_range(0..LocoKind::ALL.len())])
    }

    /// Draw the next event category
    pub fn next_event_type(&mut self) -> EventType {
        self.events[self.picker.sample(&mut self.rng)]
    }

    /// Draw the next event, with a random locomotive for arrivals
    pub fn next_event(&mut self) -> Event {
        match self.next_event_type() {
            EventType::WagonArrived => Event::WagonArrived,
            EventType::LocoArrived => Event::LocoArrived {
                locomotive: self.locomotive(),
            },
            EventType::PreparePath => Event::PreparePath,
            EventType::TrainPlanned => Event::TrainPlanned,
            EventType::TrainReady => Event::TrainReady,
            EventType::ShiftStarted => Event::ShiftStarted,
            EventType::ShiftEnded => Event::ShiftEnded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> WorkloadSettings {
        WorkloadSettings {
            min_paths: 2,
            max_paths: 4,
            min_wagons: 10,
            max_wagons: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_shift() {
        let mut a = WorkloadGenerator::new(small(), Some(7)).unwrap();
        let mut b = WorkloadGenerator::new(small(), Some(7)).unwrap();

        assert_eq!(a.path_count(), b.path_count());
        assert_eq!(a.wagons(), b.wagons());
        for _ in 0..50 {
            assert_eq!(a.next_event(), b.next_event());
        }
    }

    #[test]
    fn test_ranges_respected() {
        let mut generator = WorkloadGenerator::new(small(), Some(1)).unwrap();
        for _ in 0..20 {
            assert!((2..=4).contains(&generator.path_count()));
            let wagons = generator.wagons();
            assert!((10..=20).contains(&wagons.len()));
            assert!(wagons.iter().all(|w| w.id <= MAX_WAGON_NUMBER));
        }
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let settings = WorkloadSettings {
            event_weights: EventWeights {
                ready: 0,
                ..Default::default()
            },
            ..small()
        };
        let mut generator = WorkloadGenerator::new(settings, Some(3)).unwrap();
        for _ in 0..500 {
            assert_ne!(generator.next_event_type(), EventType::TrainReady);
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = WorkloadSettings {
            min_paths: 5,
            max_paths: 2,
            ..Default::default()
        };
        assert!(WorkloadGenerator::new(settings, None).is_err());

        let settings = WorkloadSettings {
            event_weights: EventWeights {
                wagon: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(WorkloadGenerator::new(settings, None).is_err());
    }
}
