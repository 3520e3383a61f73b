//! The session engine.
//!
//! Owns the one optional [`GameSession`] together with the collaborators its
//! operations need (corpus, clock, random source). Every operation runs the
//! aggregate method, commits its events on success and discards them on
//! failure, so a rejected call never changes what the presentation sees.

use std::sync::Arc;

use impostor_catalog::{Catalog, Corpus};
use impostor_core::aggregate::AggregateRoot;
use impostor_core::clock::{Clock, SystemClock};
use impostor_core::error::GameError;
use impostor_core::event::DomainEvent;
use impostor_core::rng::{DeterministicRng, SeededRng};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::GameSession;
use crate::domain::events::SessionEvent;
use crate::domain::voting::RoundResolution;

/// Collaborators handed to an aggregate command.
struct Deps<'a> {
    catalog: &'a dyn Catalog,
    clock: &'a dyn Clock,
    rng: &'a mut dyn DeterministicRng,
}

/// Holds at most one game session and drives it through its phases.
pub struct SessionEngine {
    catalog: Arc<dyn Catalog>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
    session: Option<GameSession>,
    history: Vec<SessionEvent>,
    revision: u64,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("session", &self.session)
            .field("history_len", &self.history.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    /// Creates an engine with no active session.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Catalog>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            catalog,
            clock,
            rng,
            session: None,
            history: Vec::new(),
            revision: 0,
        }
    }

    /// Engine over the built-in corpus, the system clock and an entropy-seeded RNG.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(Corpus::builtin()),
            Arc::new(SystemClock),
            Box::new(SeededRng::from_entropy()),
        )
    }

    /// The corpus sessions draw from.
    #[must_use]
    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Returns `true` while a session exists.
    #[must_use]
    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    /// Bumped after every operation that changed state.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Events committed to the active session, oldest first.
    #[must_use]
    pub fn history(&self) -> &[SessionEvent] {
        &self.history
    }

    /// Starts a new session, replacing any existing one on success.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for bad counts and
    /// `GameError::NotFound` for an unknown game id. The previous session is
    /// kept in either case.
    #[instrument(skip(self))]
    pub fn create_session(
        &mut self,
        player_count: usize,
        game_id: &str,
        impostor_count: usize,
    ) -> Result<(), GameError> {
        let correlation_id = Uuid::new_v4();
        let created = GameSession::create(
            Uuid::new_v4(),
            self.catalog.as_ref(),
            game_id,
            player_count,
            impostor_count,
            correlation_id,
            self.clock.as_ref(),
        );
        let mut session = match created {
            Ok(session) => session,
            Err(err) => {
                warn!(%correlation_id, error = %err, "create_session rejected");
                return Err(err);
            }
        };

        let events = session.commit();
        let session_id = session.id;
        self.session = Some(session);
        self.history.clear();
        publish(&mut self.history, &mut self.revision, events);
        info!(%correlation_id, %session_id, revision = self.revision, "session created");
        Ok(())
    }

    /// Moves from `setup` to `names`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::InvalidPhase`.
    #[instrument(skip(self))]
    pub fn advance_to_names(&mut self) -> Result<(), GameError> {
        self.execute("advance_to_names", |session, correlation_id, deps| {
            session.start_names_collection(correlation_id, deps.clock)
        })
    }

    /// Writes names onto the seats in order, padding with default names.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::InvalidPhase`.
    #[instrument(skip(self))]
    pub fn set_player_names(&mut self, names: &[String]) -> Result<(), GameError> {
        self.execute("set_player_names", |session, correlation_id, deps| {
            session.set_player_names(names, correlation_id, deps.clock)
        })
    }

    /// Draws a word pair and the impostor seats, then starts the reveal.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession`, or `GameError::Catalog` if the
    /// corpus has no word pairs.
    #[instrument(skip(self))]
    pub fn assign_words(&mut self) -> Result<(), GameError> {
        self.execute("assign_words", |session, correlation_id, deps| {
            session.assign_words(deps.catalog, deps.rng, correlation_id, deps.clock)
        })
    }

    /// Passes the device to the next player, or ends the reveal.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::InvalidPhase`.
    #[instrument(skip(self))]
    pub fn next_player(&mut self) -> Result<(), GameError> {
        self.execute("next_player", |session, correlation_id, deps| {
            session.next_player(correlation_id, deps.clock)
        })
    }

    /// Opens voting.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::InvalidPhase`.
    #[instrument(skip(self))]
    pub fn start_voting(&mut self) -> Result<(), GameError> {
        self.execute("start_voting", |session, correlation_id, deps| {
            session.start_voting(correlation_id, deps.clock)
        })
    }

    /// Records or overwrites a vote.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession`, `GameError::InvalidPhase`,
    /// `GameError::NotFound` for unknown players, or `GameError::Validation`
    /// for eliminated players and self-votes.
    #[instrument(skip(self))]
    pub fn cast_vote(&mut self, voter_id: &str, target_id: &str) -> Result<(), GameError> {
        self.execute("cast_vote", |session, correlation_id, deps| {
            session.cast_vote(voter_id, target_id, correlation_id, deps.clock)
        })
    }

    /// Tallies the current round, eliminates the majority target if any, and
    /// either ends the game or opens the next round.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::InvalidPhase`.
    #[instrument(skip(self))]
    pub fn resolve_voting_round(&mut self) -> Result<RoundResolution, GameError> {
        self.execute("resolve_voting_round", |session, correlation_id, deps| {
            session.resolve_voting_round(correlation_id, deps.clock)
        })
    }

    /// Opens the next round without tallying.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::InvalidPhase`.
    #[instrument(skip(self))]
    pub fn start_new_round(&mut self) -> Result<(), GameError> {
        self.execute("start_new_round", |session, correlation_id, deps| {
            session.start_new_round(correlation_id, deps.clock)
        })
    }

    /// Eliminates a player. Returns `false` if they already were.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession` or `GameError::NotFound`.
    #[instrument(skip(self))]
    pub fn eliminate_player(&mut self, player_id: &str) -> Result<bool, GameError> {
        self.execute("eliminate_player", |session, correlation_id, deps| {
            session.eliminate_player(player_id, correlation_id, deps.clock)
        })
    }

    /// Forces the session into results. Returns `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveSession`.
    #[instrument(skip(self))]
    pub fn finish_game(&mut self) -> Result<bool, GameError> {
        self.execute("finish_game", |session, correlation_id, deps| {
            Ok(session.finish_game(correlation_id, deps.clock))
        })
    }

    /// Discards the session and its history. Safe to call with no session.
    #[instrument(skip(self))]
    pub fn reset_game(&mut self) {
        if let Some(session) = self.session.take() {
            self.history.clear();
            self.revision += 1;
            info!(session_id = %session.id, revision = self.revision, "session reset");
        }
    }

    fn execute<T>(
        &mut self,
        operation: &'static str,
        command: impl FnOnce(&mut GameSession, Uuid, &mut Deps<'_>) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let correlation_id = Uuid::new_v4();
        let Self {
            catalog,
            clock,
            rng,
            session,
            history,
            revision,
        } = self;

        let Some(session) = session.as_mut() else {
            warn!(operation, %correlation_id, "rejected: no active session");
            return Err(GameError::NoActiveSession);
        };

        let mut deps = Deps {
            catalog: &**catalog,
            clock: &**clock,
            rng: &mut **rng,
        };
        match command(session, correlation_id, &mut deps) {
            Ok(value) => {
                let events = session.commit();
                if events.is_empty() {
                    debug!(operation, %correlation_id, "no state change");
                } else {
                    publish(history, revision, events);
                    info!(
                        operation,
                        %correlation_id,
                        phase = %session.phase(),
                        revision = *revision,
                        "session updated"
                    );
                }
                Ok(value)
            }
            Err(err) => {
                session.clear_uncommitted_events();
                warn!(operation, %correlation_id, error = %err, "operation rejected");
                Err(err)
            }
        }
    }
}

fn publish(history: &mut Vec<SessionEvent>, revision: &mut u64, events: Vec<SessionEvent>) {
    for event in &events {
        debug!(
            event_type = event.event_type(),
            sequence_number = event.metadata().sequence_number,
            payload = %event.to_payload(),
            "event committed"
        );
    }
    history.extend(events);
    *revision += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::GamePhase;
    use crate::domain::players::Role;
    use crate::domain::voting::RoundOutcome;
    use impostor_test_support::{MockRng, SequenceRng, fixed_clock};

    fn engine_with(rng: Box<dyn DeterministicRng>) -> SessionEngine {
        SessionEngine::new(Arc::new(Corpus::builtin()), Arc::new(fixed_clock()), rng)
    }

    fn engine() -> SessionEngine {
        engine_with(Box::new(MockRng))
    }

    fn phase(engine: &SessionEngine) -> GamePhase {
        engine.session().unwrap().phase()
    }

    /// Drives a fresh engine to the voting phase. `MockRng` puts the only
    /// impostor at seat 0.
    fn voting_engine(player_count: usize) -> SessionEngine {
        let mut engine = engine();
        engine.create_session(player_count, "impostor", 1).unwrap();
        engine.advance_to_names().unwrap();
        engine.assign_words().unwrap();
        for _ in 0..player_count {
            engine.next_player().unwrap();
        }
        engine.start_voting().unwrap();
        engine
    }

    #[test]
    fn test_new_engine_has_no_session() {
        let engine = engine();

        assert!(!engine.has_active_session());
        assert!(engine.session().is_none());
        assert_eq!(engine.revision(), 0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_operations_without_session_return_no_active_session() {
        let mut engine = engine();

        assert_eq!(engine.advance_to_names(), Err(GameError::NoActiveSession));
        assert_eq!(engine.assign_words(), Err(GameError::NoActiveSession));
        assert_eq!(engine.next_player(), Err(GameError::NoActiveSession));
        assert_eq!(engine.start_voting(), Err(GameError::NoActiveSession));
        assert_eq!(
            engine.cast_vote("player-1", "player-2"),
            Err(GameError::NoActiveSession)
        );
        assert_eq!(engine.finish_game(), Err(GameError::NoActiveSession));
        assert_eq!(engine.revision(), 0);
    }

    #[test]
    fn test_create_session_commits_and_bumps_revision() {
        let mut engine = engine();

        engine.create_session(4, "impostor", 1).unwrap();

        assert!(engine.has_active_session());
        assert_eq!(engine.revision(), 1);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history()[0].event_type(), "session.created");
        assert_eq!(phase(&engine), GamePhase::Setup);
    }

    #[test]
    fn test_failed_create_keeps_previous_session() {
        let mut engine = engine();
        engine.create_session(4, "impostor", 1).unwrap();
        let session_id = engine.session().unwrap().id;

        let result = engine.create_session(4, "unknown", 1);

        assert!(matches!(result, Err(GameError::NotFound { kind: "game", .. })));
        assert_eq!(engine.session().unwrap().id, session_id);
        assert_eq!(engine.revision(), 1);
    }

    #[test]
    fn test_create_session_replaces_existing_session() {
        let mut engine = engine();
        engine.create_session(4, "impostor", 1).unwrap();
        engine.advance_to_names().unwrap();
        let first_id = engine.session().unwrap().id;

        engine.create_session(6, "impostor", 2).unwrap();

        let session = engine.session().unwrap();
        assert_ne!(session.id, first_id);
        assert_eq!(session.players().len(), 6);
        assert_eq!(session.phase(), GamePhase::Setup);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn test_rejected_operation_leaves_state_untouched() {
        let mut engine = engine();
        engine.create_session(4, "impostor", 1).unwrap();
        let revision = engine.revision();

        let result = engine.start_voting();

        match result.unwrap_err() {
            GameError::InvalidPhase {
                operation,
                expected,
                actual,
            } => {
                assert_eq!(operation, "start_voting");
                assert_eq!(expected, "playing");
                assert_eq!(actual, "setup");
            }
            other => panic!("expected InvalidPhase, got {other:?}"),
        }
        assert_eq!(engine.revision(), revision);
        assert_eq!(engine.history().len(), 1);
        assert!(engine.session().unwrap().uncommitted_events().is_empty());
    }

    #[test]
    fn test_assign_words_uses_injected_rng() {
        // Arrange: pair 8 (pizza/hamburguesa), impostors at seats 2 and 0.
        let mut engine = engine_with(Box::new(SequenceRng::new(vec![8, 2, 0])));
        engine.create_session(5, "impostor", 2).unwrap();
        engine.advance_to_names().unwrap();

        // Act
        engine.assign_words().unwrap();

        // Assert
        let session = engine.session().unwrap();
        let impostors: Vec<&str> = session
            .players()
            .iter()
            .filter(|p| p.role == Role::Impostor)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(impostors, vec!["player-1", "player-3"]);
        assert_eq!(session.word_pair().unwrap().civil, "pizza");
        assert_eq!(session.phase(), GamePhase::Assigning);
    }

    #[test]
    fn test_set_player_names_renames_seats() {
        let mut engine = engine();
        engine.create_session(3, "impostor", 1).unwrap();
        engine.advance_to_names().unwrap();

        engine
            .set_player_names(&["Ana".to_owned(), "Bea".to_owned()])
            .unwrap();

        let names: Vec<String> = engine
            .session()
            .unwrap()
            .players()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Ana", "Bea", "Jugador 3"]);
    }

    #[test]
    fn test_resolve_voting_round_catches_impostor() {
        let mut engine = voting_engine(4);
        for voter in ["player-2", "player-3", "player-4"] {
            engine.cast_vote(voter, "player-1").unwrap();
        }

        let resolution = engine.resolve_voting_round().unwrap();

        assert_eq!(resolution.outcome, RoundOutcome::ImpostorCaught);
        assert_eq!(phase(&engine), GamePhase::Results);
        assert_eq!(
            engine.history().last().unwrap().event_type(),
            "session.game_finished"
        );
    }

    #[test]
    fn test_invalid_vote_is_rejected_without_revision_change() {
        let mut engine = voting_engine(4);
        let revision = engine.revision();

        let result = engine.cast_vote("player-2", "player-2");

        assert!(matches!(result, Err(GameError::Validation(_))));
        assert_eq!(engine.revision(), revision);
        assert!(engine.session().unwrap().votes().is_empty());
    }

    #[test]
    fn test_noop_operations_do_not_bump_revision() {
        let mut engine = engine();
        engine.create_session(4, "impostor", 1).unwrap();
        assert!(engine.eliminate_player("player-2").unwrap());
        assert!(engine.finish_game().unwrap());
        let revision = engine.revision();

        assert!(!engine.eliminate_player("player-2").unwrap());
        assert!(!engine.finish_game().unwrap());

        assert_eq!(engine.revision(), revision);
    }

    #[test]
    fn test_reset_game_clears_session_and_history() {
        let mut engine = voting_engine(3);
        let revision = engine.revision();

        engine.reset_game();

        assert!(!engine.has_active_session());
        assert!(engine.history().is_empty());
        assert_eq!(engine.revision(), revision + 1);
    }

    #[test]
    fn test_reset_without_session_is_noop() {
        let mut engine = engine();

        engine.reset_game();

        assert_eq!(engine.revision(), 0);
    }

    #[test]
    #[allow(clippy::cast_possible_wrap)]
    fn test_history_sequence_numbers_are_contiguous() {
        let engine = voting_engine(3);

        let sequence: Vec<i64> = engine
            .history()
            .iter()
            .map(|event| event.metadata().sequence_number)
            .collect();

        let expected: Vec<i64> = (1..=sequence.len() as i64).collect();
        assert_eq!(sequence, expected);
        let version = engine.history().len() as i64;
        assert_eq!(engine.session().unwrap().version(), version);
    }
}
