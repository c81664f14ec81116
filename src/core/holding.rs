//! Holding track: overflow queues for wagons with no eligible train.
//!
//! One FIFO per kind. Wagons are never reordered within a kind; they leave
//! only when a locomotive couples to a train of the same kind.

use std::collections::VecDeque;

use crate::domain::{TrainKind, Wagon};

/// The overflow "ring" of the yard
#[derive(Debug, Clone, Default)]
pub struct HoldingTrack {
    queues: [VecDeque<Wagon>; 4],
    peak: usize,
}

impl HoldingTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a wagon at the back of its kind's queue
    pub fn push(&mut self, wagon: Wagon) {
        self.queues[wagon.kind.index()].push_back(wagon);
        self.peak = self.peak.max(self.total());
    }

    /// Move up to `room` wagons of `kind`, oldest first, onto `train_wagons`.
    ///
    /// Returns how many wagons were moved.
    pub fn drain_into(&mut self, kind: TrainKind, room: usize, train_wagons: &mut Vec<Wagon>) -> usize {
        let queue = &mut self.queues[kind.index()];
        let take = room.min(queue.len());
        train_wagons.extend(queue.drain(..take));
        take
    }

    /// Wagons waiting for a train of `kind`
    pub fn len(&self, kind: TrainKind) -> usize {
        self.queues[kind.index()].len()
    }

    pub fn total(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Highest occupancy since the last [`HoldingTrack::reset`]
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Kind with the strictly largest queue; earlier kinds win ties.
    /// `None` when the track is empty.
    pub fn largest_kind(&self) -> Option<TrainKind> {
        let mut best: Option<(TrainKind, usize)> = None;
        for kind in TrainKind::ALL {
            let len = self.len(kind);
            if len > best.map_or(0, |(_, best_len)| best_len) {
                best = Some((kind, len));
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// Wagons queued for `kind`, oldest first
    pub fn queue(&self, kind: TrainKind) -> impl Iterator<Item = &Wagon> {
        self.queues[kind.index()].iter()
    }

    /// Drop every wagon but keep the shift peak
    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }

    /// Drop every wagon and the peak
    pub fn reset(&mut self) {
        self.clear();
        self.peak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wagon(id: u32, kind: TrainKind) -> Wagon {
        Wagon::new(id, kind)
    }

    #[test]
    fn test_push_tracks_total_and_peak() {
        let mut track = HoldingTrack::new();
        track.push(wagon(1, TrainKind::Freight));
        track.push(wagon(2, TrainKind::Empty));

        assert_eq!(track.total(), 2);
        assert_eq!(track.peak(), 2);
        assert_eq!(track.len(TrainKind::Empty), 1);

        let mut aboard = Vec::new();
        track.drain_into(TrainKind::Freight, 10, &mut aboard);
        assert_eq!(track.total(), 1);
        assert_eq!(track.peak(), 2);
    }

    #[test]
    fn test_drain_is_fifo_and_bounded() {
        let mut track = HoldingTrack::new();
        for id in 0..5 {
            track.push(wagon(id, TrainKind::Passenger));
        }

        let mut aboard = vec![wagon(99, TrainKind::Passenger)];
        let moved = track.drain_into(TrainKind::Passenger, 3, &mut aboard);

        assert_eq!(moved, 3);
        let ids: Vec<u32> = aboard.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![99, 0, 1, 2]);
        let left: Vec<u32> = track.queue(TrainKind::Passenger).map(|w| w.id).collect();
        assert_eq!(left, vec![3, 4]);
    }

    #[test]
    fn test_largest_kind_first_wins_ties() {
        let mut track = HoldingTrack::new();
        assert_eq!(track.largest_kind(), None);

        track.push(wagon(1, TrainKind::Dangerous));
        track.push(wagon(2, TrainKind::Passenger));
        assert_eq!(track.largest_kind(), Some(TrainKind::Passenger));

        track.push(wagon(3, TrainKind::Dangerous));
        assert_eq!(track.largest_kind(), Some(TrainKind::Dangerous));
    }

    #[test]
    fn test_clear_keeps_peak_reset_drops_it() {
        let mut track = HoldingTrack::new();
        track.push(wagon(1, TrainKind::Freight));
        track.clear();
        assert!(track.is_empty());
        assert_eq!(track.peak(), 1);

        track.reset();
        assert_eq!(track.peak(), 0);
    }
}
