//! Shared helpers for session engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use impostor_catalog::Corpus;
use impostor_core::rng::DeterministicRng;
use impostor_session::{GamePhase, SessionEngine};
use impostor_test_support::{SequenceRng, fixed_clock};

/// Engine over the built-in corpus and a fixed clock.
pub fn build_engine(rng: Box<dyn DeterministicRng>) -> SessionEngine {
    SessionEngine::new(Arc::new(Corpus::builtin()), Arc::new(fixed_clock()), rng)
}

/// Engine whose random draws come from `values`, in order.
pub fn build_engine_with_draws(values: Vec<u32>) -> SessionEngine {
    build_engine(Box::new(SequenceRng::new(values)))
}

/// Creates a session and walks it through names, assignment and the reveal
/// into the voting phase.
pub fn play_until_voting(
    engine: &mut SessionEngine,
    player_count: usize,
    impostor_count: usize,
    names: &[&str],
) {
    engine
        .create_session(player_count, "impostor", impostor_count)
        .unwrap();
    engine.advance_to_names().unwrap();
    let names: Vec<String> = names.iter().map(|&name| name.to_owned()).collect();
    engine.set_player_names(&names).unwrap();
    engine.assign_words().unwrap();
    for _ in 0..player_count {
        engine.next_player().unwrap();
    }
    assert_eq!(engine.session().unwrap().phase(), GamePhase::Playing);
    engine.start_voting().unwrap();
}

/// Casts one vote per `(voter, target)` pair of player ids.
pub fn vote_all(engine: &mut SessionEngine, ballots: &[(&str, &str)]) {
    for (voter, target) in ballots {
        engine.cast_vote(voter, target).unwrap();
    }
}
