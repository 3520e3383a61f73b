//! Statistical checks on role assignment with the production RNG.

mod common;

use impostor_core::rng::SeededRng;
use impostor_session::{Role, SessionEngine};

/// Deals `trials` times and counts how often each seat became an impostor.
fn impostor_seat_counts(
    engine: &mut SessionEngine,
    player_count: usize,
    impostor_count: usize,
    trials: usize,
) -> Vec<usize> {
    engine
        .create_session(player_count, "impostor", impostor_count)
        .unwrap();
    let mut counts = vec![0; player_count];
    for _ in 0..trials {
        engine.assign_words().unwrap();
        let session = engine.session().unwrap();
        let impostors: Vec<usize> = session
            .players()
            .iter()
            .enumerate()
            .filter(|(_, player)| player.role == Role::Impostor)
            .map(|(seat, _)| seat)
            .collect();
        assert_eq!(impostors.len(), impostor_count);
        for seat in impostors {
            counts[seat] += 1;
        }
    }
    counts
}

#[test]
fn test_single_impostor_is_spread_evenly_across_seats() {
    let mut engine = common::build_engine(Box::new(SeededRng::from_seed(7)));

    let counts = impostor_seat_counts(&mut engine, 4, 1, 6000);

    // Expected 1500 per seat.
    for (seat, count) in counts.iter().enumerate() {
        assert!(
            (1200..=1800).contains(count),
            "seat {seat} was impostor {count} times"
        );
    }
}

#[test]
fn test_two_impostors_are_spread_evenly_across_seats() {
    let mut engine = common::build_engine(Box::new(SeededRng::from_seed(11)));

    let counts = impostor_seat_counts(&mut engine, 5, 2, 5000);

    // Each seat is picked with probability 2/5: expected 2000.
    for (seat, count) in counts.iter().enumerate() {
        assert!(
            (1700..=2300).contains(count),
            "seat {seat} was impostor {count} times"
        );
    }
}

#[test]
fn test_every_deal_hands_out_consistent_words() {
    let mut engine = common::build_engine(Box::new(SeededRng::from_seed(3)));
    engine.create_session(8, "impostor", 2).unwrap();

    for _ in 0..200 {
        engine.assign_words().unwrap();
        let session = engine.session().unwrap();
        let pair = session.word_pair().unwrap();
        assert_ne!(pair.civil, pair.impostor);
        for player in session.players() {
            let expected = match player.role {
                Role::Civil => &pair.civil,
                Role::Impostor => &pair.impostor,
            };
            assert_eq!(&player.word, expected);
        }
    }
}

#[test]
fn test_same_seed_deals_the_same_game() {
    let deal = |seed: u64| {
        let mut engine = common::build_engine(Box::new(SeededRng::from_seed(seed)));
        engine.create_session(6, "impostor", 2).unwrap();
        engine.assign_words().unwrap();
        let session = engine.session().unwrap();
        let roles: Vec<Role> = session.players().iter().map(|p| p.role).collect();
        (session.word_pair().cloned(), roles)
    };

    assert_eq!(deal(42), deal(42));
}
