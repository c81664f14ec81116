//! Allocation Engine Integration Tests
//!
//! Walks the yard through the reference shift situations and the
//! holding-track and reserve interactions.

use sorting_yard::core::Yard;
use sorting_yard::domain::{
    EventType, LocoKind, Locomotive, Outcome, Refusal, TrainKind, Wagon,
};

fn wagon(id: u32, kind: TrainKind) -> Wagon {
    Wagon::new(id, kind)
}

/// One path with a prepared Freight train pulled by a 16-wagon locomotive
fn yard_with_freight_train() -> (Yard, String) {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    assert!(yard.prepare_path(&mut outcome));
    assert!(yard.allocate_train(&mut outcome));
    let number = outcome.train_number.clone().unwrap();
    assert_eq!(outcome.train_kind, Some(TrainKind::Freight));

    assert!(yard.handle_locomotive(Locomotive::new(LocoKind::Electric16), &mut outcome));
    assert!(outcome.loco_attached);
    assert_eq!(outcome.loco_capacity, Some(16));

    (yard, number)
}

#[test]
fn test_first_train_on_first_path() {
    let mut yard = Yard::with_paths(2);
    let mut outcome = Outcome::default();

    assert!(yard.prepare_path(&mut outcome));
    assert_eq!(outcome.event_type, EventType::PreparePath);
    assert_eq!(outcome.path_id, Some(0));

    assert!(yard.allocate_train(&mut outcome));
    assert_eq!(outcome.event_type, EventType::TrainPlanned);
    assert_eq!(outcome.path_id, Some(0));
    assert_eq!(outcome.train_number.as_deref(), Some("0001F"));

    // Second path is still untouched
    assert!(!yard.paths()[1].prepared);
    assert!(yard.paths()[0].is_occupied());
}

#[test]
fn test_wagon_without_trains_goes_to_holding() {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    assert!(yard.handle_wagon(wagon(7, TrainKind::Freight), &mut outcome));
    assert_eq!(outcome.wagon_to_holding, Some(true));
    assert_eq!(outcome.holding_total, Some(1));
    assert_eq!(outcome.holding_peak, Some(1));
    assert_eq!(yard.holding().total(), 1);
    assert_eq!(yard.holding().peak(), 1);
}

#[test]
fn test_partial_release_when_input_exhausted() {
    let (mut yard, number) = yard_with_freight_train();
    let mut outcome = Outcome::default();

    assert!(yard.handle_wagon(wagon(1, TrainKind::Freight), &mut outcome));
    assert_eq!(outcome.wagon_to_holding, Some(false));
    assert_eq!(outcome.train_wagons, Some(1));

    assert!(yard.send_train(true, false, &mut outcome));
    assert!(outcome.train_sent);
    assert_eq!(outcome.train_number.as_deref(), Some(number.as_str()));
    assert_eq!(outcome.train_wagons, Some(1));

    // Path is free and unprepared again
    assert!(yard.trains().next().is_none());
    assert!(!yard.paths()[0].prepared);
    assert!(!yard.paths()[0].is_occupied());
}

#[test]
fn test_partial_release_blocked_while_input_pending() {
    let (mut yard, number) = yard_with_freight_train();
    let mut outcome = Outcome::default();

    assert!(yard.handle_wagon(wagon(1, TrainKind::Freight), &mut outcome));

    assert!(!yard.send_train(false, false, &mut outcome));
    assert!(!outcome.success);
    assert!(!outcome.train_sent);
    assert_eq!(outcome.refusal, Some(Refusal::NoTrainReady));

    // Nothing moved
    let train = yard.train(&number).unwrap();
    assert_eq!(train.wagons.len(), 1);
    assert!(yard.paths()[0].is_occupied());
}

#[test]
fn test_partial_release_blocked_by_holding_track() {
    let (mut yard, _) = yard_with_freight_train();
    let mut outcome = Outcome::default();

    yard.handle_wagon(wagon(1, TrainKind::Freight), &mut outcome);
    yard.handle_wagon(wagon(2, TrainKind::Dangerous), &mut outcome);
    assert_eq!(outcome.wagon_to_holding, Some(true));

    assert!(!yard.send_train(true, false, &mut outcome));

    // Forced release ignores the holding track
    assert!(yard.send_train(true, true, &mut outcome));
}

#[test]
fn test_full_train_leaves_while_input_pending() {
    let (mut yard, number) = yard_with_freight_train();
    let mut outcome = Outcome::default();

    for id in 0..16 {
        assert!(yard.handle_wagon(wagon(id, TrainKind::Freight), &mut outcome));
        assert_eq!(outcome.wagon_to_holding, Some(false));
    }
    assert!(yard.train(&number).unwrap().is_full());

    // A 17th wagon finds no room
    yard.handle_wagon(wagon(16, TrainKind::Freight), &mut outcome);
    assert_eq!(outcome.wagon_to_holding, Some(true));

    assert!(yard.send_train(false, false, &mut outcome));
    assert_eq!(outcome.train_wagons, Some(16));
    assert_eq!(outcome.train_capacity, Some(16));
}

#[test]
fn test_reserved_locomotive_couples_to_next_train() {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    assert!(yard.handle_locomotive(Locomotive::new(LocoKind::Diesel24), &mut outcome));
    assert!(outcome.loco_reserved);
    assert!(!outcome.loco_attached);
    assert_eq!(yard.reserve_len(), 1);

    yard.prepare_path(&mut outcome);
    assert!(yard.allocate_train(&mut outcome));
    assert!(outcome.loco_attached);
    assert_eq!(outcome.loco_capacity, Some(24));
    assert_eq!(yard.reserve_len(), 0);

    let number = outcome.train_number.clone().unwrap();
    assert!(yard.train(&number).unwrap().has_locomotive());
}

#[test]
fn test_locomotive_goes_to_oldest_train_without_one() {
    let mut yard = Yard::with_paths(2);
    let mut outcome = Outcome::default();

    let mut numbers = Vec::new();
    for _ in 0..2 {
        yard.prepare_path(&mut outcome);
        yard.allocate_train(&mut outcome);
        numbers.push(outcome.train_number.clone().unwrap());
    }

    yard.handle_locomotive(Locomotive::new(LocoKind::Diesel64), &mut outcome);
    assert_eq!(outcome.train_number.as_ref(), Some(&numbers[0]));

    yard.handle_locomotive(Locomotive::new(LocoKind::Electric32), &mut outcome);
    assert_eq!(outcome.train_number.as_ref(), Some(&numbers[1]));

    // Every train has one now, so the next goes to the reserve
    yard.handle_locomotive(Locomotive::new(LocoKind::Electric16), &mut outcome);
    assert!(outcome.loco_reserved);
}

#[test]
fn test_new_train_takes_largest_holding_queue() {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    yard.handle_wagon(wagon(1, TrainKind::Passenger), &mut outcome);
    for id in 2..5 {
        yard.handle_wagon(wagon(id, TrainKind::Empty), &mut outcome);
    }

    yard.prepare_path(&mut outcome);
    yard.allocate_train(&mut outcome);
    assert_eq!(outcome.train_kind, Some(TrainKind::Empty));
    assert!(outcome.train_number.as_deref().unwrap().ends_with('E'));

    // Coupling drains the matching queue in arrival order
    yard.handle_locomotive(Locomotive::new(LocoKind::Electric16), &mut outcome);
    assert_eq!(outcome.train_wagons, Some(3));
    assert_eq!(outcome.holding_total, Some(1));

    let number = outcome.train_number.clone().unwrap();
    let ids: Vec<u32> = yard.train(&number).unwrap().wagons.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![2, 3, 4]);
    assert_eq!(yard.holding().len(TrainKind::Passenger), 1);
}

#[test]
fn test_wagon_of_other_kind_bypasses_train() {
    let (mut yard, _) = yard_with_freight_train();
    let mut outcome = Outcome::default();

    yard.handle_wagon(wagon(1, TrainKind::Passenger), &mut outcome);
    assert_eq!(outcome.wagon_to_holding, Some(true));
    assert_eq!(yard.wagons_aboard(), 0);
}

#[test]
fn test_train_without_locomotive_takes_no_wagons() {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    yard.prepare_path(&mut outcome);
    yard.allocate_train(&mut outcome);
    yard.handle_wagon(wagon(1, TrainKind::Freight), &mut outcome);

    assert_eq!(outcome.wagon_to_holding, Some(true));
    assert!(!yard.send_train(true, true, &mut outcome));
}

#[test]
fn test_failed_operations_leave_state_untouched() {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    assert!(!yard.allocate_train(&mut outcome));
    assert_eq!(outcome.refusal, Some(Refusal::NoPreparedPath));

    yard.prepare_path(&mut outcome);
    assert!(!yard.prepare_path(&mut outcome));
    assert_eq!(outcome.refusal, Some(Refusal::NoFreePath));

    yard.allocate_train(&mut outcome);
    let before = yard.clone();
    assert!(!yard.prepare_path(&mut outcome));
    assert!(!yard.allocate_train(&mut outcome));
    assert!(!yard.send_train(false, false, &mut outcome));
    assert_eq!(yard.paths(), before.paths());
    assert_eq!(yard.trains().count(), before.trains().count());
}

#[test]
fn test_end_shift_releases_and_discards() {
    let mut yard = Yard::with_paths(3);
    let mut outcome = Outcome::default();

    for _ in 0..3 {
        yard.prepare_path(&mut outcome);
        yard.allocate_train(&mut outcome);
    }
    // Two trains get locomotives, one stays bare
    yard.handle_locomotive(Locomotive::new(LocoKind::Electric16), &mut outcome);
    yard.handle_locomotive(Locomotive::new(LocoKind::Electric16), &mut outcome);
    yard.handle_wagon(wagon(1, TrainKind::Freight), &mut outcome);
    yard.handle_wagon(wagon(2, TrainKind::Empty), &mut outcome);

    assert_eq!(yard.end_shift(), 2);
    assert!(yard.trains().next().is_none());
    assert!(yard.paths().iter().all(|p| !p.prepared && !p.is_occupied()));
    assert_eq!(yard.holding().total(), 0);
    assert_eq!(yard.reserve_len(), 0);

    // Peak survives for reporting
    assert_eq!(yard.holding().peak(), 1);
}

#[test]
fn test_start_shift_resets_numbering() {
    let mut yard = Yard::with_paths(1);
    let mut outcome = Outcome::default();

    yard.prepare_path(&mut outcome);
    yard.allocate_train(&mut outcome);
    yard.end_shift();

    yard.start_shift(2);
    assert_eq!(yard.paths().len(), 2);
    yard.prepare_path(&mut outcome);
    yard.allocate_train(&mut outcome);
    assert_eq!(outcome.train_number.as_deref(), Some("0001F"));
}
