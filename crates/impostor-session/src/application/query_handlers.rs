//! Query handlers for the session engine.
//!
//! Read-only view DTOs the presentation layer renders from. A view is built
//! fresh from the engine after each operation and never aliases engine state.

use std::collections::BTreeMap;

use impostor_catalog::{GameDefinition, WordPair};
use impostor_core::aggregate::AggregateRoot;
use impostor_core::error::GameError;
use serde::Serialize;
use uuid::Uuid;

use crate::application::engine::SessionEngine;
use crate::domain::aggregates::{GamePhase, GameSession};
use crate::domain::players::Player;
use crate::domain::voting::{self, RoundResolution, VoteCount, Winner};

/// Read-only view of one player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    /// Player identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role as a string.
    pub role: String,
    /// Secret word (empty before assignment).
    pub word: String,
    /// Whether the player has been voted out.
    pub is_eliminated: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            role: player.role.as_str().to_owned(),
            word: player.word.clone(),
            is_eliminated: player.is_eliminated,
        }
    }
}

/// Read-only view of the active session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The selected game.
    pub game: GameDefinition,
    /// Players in seat order.
    pub players: Vec<PlayerView>,
    /// Active word pair, once assigned.
    pub word_pair: Option<WordPair>,
    /// Number of impostors.
    pub number_of_impostors: usize,
    /// Current phase as a string.
    pub phase: String,
    /// Seat holding the device during the reveal.
    pub current_player_index: usize,
    /// Voter id to target id for the current round.
    pub votes: BTreeMap<String, String>,
    /// Live tally of the current round, highest first.
    pub tally: Vec<VoteCount>,
    /// Round number, starting at 1.
    pub current_round: u32,
    /// Every resolved round, oldest first.
    pub rounds: Vec<RoundResolution>,
    /// Winner, present only in the results phase.
    pub winner: Option<Winner>,
    /// Current version (event count).
    pub version: i64,
}

impl From<&GameSession> for SessionView {
    fn from(session: &GameSession) -> Self {
        let winner = (session.phase() == GamePhase::Results)
            .then(|| voting::determine_winner(session));
        Self {
            session_id: session.id,
            game: session.game().clone(),
            players: session.players().iter().map(PlayerView::from).collect(),
            word_pair: session.word_pair().cloned(),
            number_of_impostors: session.number_of_impostors(),
            phase: session.phase().name().to_owned(),
            current_player_index: session.current_player_index(),
            votes: session.votes().clone(),
            tally: voting::tally_votes(session),
            current_round: session.current_round(),
            rounds: session.rounds().to_vec(),
            winner,
            version: session.version(),
        }
    }
}

/// What the presentation layer reads after every operation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Whether a session exists.
    pub has_active_session: bool,
    /// Engine revision the snapshot was taken at.
    pub revision: u64,
    /// The session, if any.
    pub session: Option<SessionView>,
}

/// Takes a snapshot of the engine.
#[must_use]
pub fn get_snapshot(engine: &SessionEngine) -> SessionSnapshot {
    SessionSnapshot {
        has_active_session: engine.has_active_session(),
        revision: engine.revision(),
        session: engine.session().map(SessionView::from),
    }
}

/// Retrieves a view of the active session.
///
/// # Errors
///
/// Returns `GameError::NoActiveSession` if the engine has no session.
pub fn get_session(engine: &SessionEngine) -> Result<SessionView, GameError> {
    engine
        .session()
        .map(SessionView::from)
        .ok_or(GameError::NoActiveSession)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use impostor_catalog::Corpus;
    use impostor_test_support::{MockRng, fixed_clock};

    fn engine() -> SessionEngine {
        SessionEngine::new(
            Arc::new(Corpus::builtin()),
            Arc::new(fixed_clock()),
            Box::new(MockRng),
        )
    }

    #[test]
    fn test_snapshot_without_session() {
        let engine = engine();

        let snapshot = get_snapshot(&engine);

        assert!(!snapshot.has_active_session);
        assert_eq!(snapshot.revision, 0);
        assert!(snapshot.session.is_none());
    }

    #[test]
    fn test_get_session_without_session_returns_error() {
        let engine = engine();

        let result = get_session(&engine);

        assert!(matches!(result, Err(GameError::NoActiveSession)));
    }

    #[test]
    fn test_snapshot_reflects_assigned_words() {
        // Arrange
        let mut engine = engine();
        engine.create_session(3, "impostor", 1).unwrap();
        engine.advance_to_names().unwrap();
        engine.assign_words().unwrap();

        // Act
        let snapshot = get_snapshot(&engine);

        // Assert
        let view = snapshot.session.unwrap();
        assert!(snapshot.has_active_session);
        assert_eq!(snapshot.revision, engine.revision());
        assert_eq!(view.phase, "assigning");
        assert_eq!(view.players.len(), 3);
        assert_eq!(view.players[0].role, "impostor");
        assert_eq!(view.players[0].word, "piscina");
        assert_eq!(view.players[1].word, "playa");
        assert_eq!(view.word_pair.unwrap().category, "lugares");
        assert!(view.winner.is_none());
        assert_eq!(view.version, 3);
    }

    #[test]
    fn test_snapshot_is_detached_from_engine() {
        let mut engine = engine();
        engine.create_session(3, "impostor", 1).unwrap();
        let before = get_snapshot(&engine);

        engine.advance_to_names().unwrap();

        assert_eq!(before.session.unwrap().phase, "setup");
        assert_eq!(get_session(&engine).unwrap().phase, "names");
    }

    #[test]
    fn test_results_view_carries_winner_and_rounds() {
        let mut engine = engine();
        engine.create_session(3, "impostor", 1).unwrap();
        engine.advance_to_names().unwrap();
        engine.assign_words().unwrap();
        for _ in 0..3 {
            engine.next_player().unwrap();
        }
        engine.start_voting().unwrap();
        engine.cast_vote("player-2", "player-1").unwrap();
        engine.cast_vote("player-3", "player-1").unwrap();
        engine.resolve_voting_round().unwrap();

        let view = get_session(&engine).unwrap();

        assert_eq!(view.phase, "results");
        assert_eq!(view.winner, Some(Winner::Civils));
        assert_eq!(view.rounds.len(), 1);
        assert_eq!(view.tally[0].player_id, "player-1");
        assert_eq!(view.tally[0].votes, 2);
        assert!(view.players[0].is_eliminated);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut engine = engine();
        engine.create_session(4, "impostor", 2).unwrap();

        let json = serde_json::to_value(get_snapshot(&engine)).unwrap();

        assert_eq!(json["has_active_session"], true);
        assert_eq!(json["session"]["phase"], "setup");
        assert_eq!(json["session"]["players"][3]["name"], "Jugador 4");
        assert_eq!(json["session"]["number_of_impostors"], 2);
    }
}
