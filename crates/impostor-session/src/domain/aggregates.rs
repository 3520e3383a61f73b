//! The game session aggregate.

use std::collections::BTreeMap;
use std::fmt;

use impostor_catalog::{Catalog, GameDefinition, WordPair};
use impostor_core::aggregate::AggregateRoot;
use impostor_core::clock::Clock;
use impostor_core::error::GameError;
use impostor_core::event::EventMetadata;
use impostor_core::rng::{DeterministicRng, sample_distinct_indices};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{
    FinishReason, GameFinished, NewRoundStarted, PlayerEliminated, PlayerNamesSet,
    RevealAdvanced, SessionCreated, SessionEvent, SessionEventKind, VoteCast, WordsAssigned,
};
use super::players::{Player, Role, default_name};
use super::voting::{self, RoundOutcome, RoundResolution};

/// Fewest seats a session can have.
pub const MIN_PLAYERS: usize = 3;
/// Most seats a session can have.
pub const MAX_PLAYERS: usize = 12;
/// Fewest impostors a session can have.
pub const MIN_IMPOSTORS: usize = 1;
/// Most impostors a session can have.
pub const MAX_IMPOSTORS: usize = 2;

/// Session phase state machine.
///
/// `Setup → Names → Assigning → Playing → Voting → Results`, with
/// `Voting → Voting` for each new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Counters chosen, waiting to move on to names.
    Setup,
    /// Collecting player names.
    Names,
    /// Passing the device so each player sees their word.
    Assigning,
    /// Players describe their words aloud.
    Playing,
    /// Each alive player votes.
    Voting,
    /// The game is over.
    Results,
}

impl GamePhase {
    /// Lowercase phase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Names => "names",
            Self::Assigning => "assigning",
            Self::Playing => "playing",
            Self::Voting => "voting",
            Self::Results => "results",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The aggregate root for one play-through.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    players: Vec<Player>,
    game: GameDefinition,
    word_pair: Option<WordPair>,
    number_of_impostors: usize,
    phase: GamePhase,
    current_player_index: usize,
    /// Voter id to target id for the round in progress.
    votes: BTreeMap<String, String>,
    current_round: u32,
    rounds: Vec<RoundResolution>,
    /// Uncommitted events pending commit.
    uncommitted_events: Vec<SessionEvent>,
}

impl GameSession {
    fn empty(id: Uuid, game: GameDefinition) -> Self {
        Self {
            id,
            version: 0,
            players: Vec::new(),
            game,
            word_pair: None,
            number_of_impostors: 0,
            phase: GamePhase::Setup,
            current_player_index: 0,
            votes: BTreeMap::new(),
            current_round: 1,
            rounds: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Creates a session, producing a `SessionCreated` event.
    ///
    /// Checks run in order: player count, game id, impostor count.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for a player count outside 3..=12 or
    /// outside the game's bounds, or an impostor count outside 1..=2 or not
    /// below the player count. Returns `GameError::NotFound` for an unknown
    /// game id.
    pub fn create(
        id: Uuid,
        catalog: &dyn Catalog,
        game_id: &str,
        player_count: usize,
        number_of_impostors: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(GameError::Validation(format!(
                "player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {player_count}"
            )));
        }

        let game = catalog.lookup_game(game_id)?;
        if !game.supports(player_count) {
            return Err(GameError::Validation(format!(
                "{} supports {}-{} players, got {player_count}",
                game.name, game.min_players, game.max_players
            )));
        }

        if !(MIN_IMPOSTORS..=MAX_IMPOSTORS).contains(&number_of_impostors) {
            return Err(GameError::Validation(format!(
                "impostor count must be between {MIN_IMPOSTORS} and {MAX_IMPOSTORS}, got {number_of_impostors}"
            )));
        }
        if number_of_impostors >= player_count {
            return Err(GameError::Validation(format!(
                "impostor count ({number_of_impostors}) must be lower than player count ({player_count})"
            )));
        }

        let mut session = Self::empty(id, game.clone());
        session.record(
            SessionEventKind::SessionCreated(SessionCreated {
                session_id: id,
                game,
                player_count,
                number_of_impostors,
            }),
            correlation_id,
            clock,
        );
        Ok(session)
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    fn require_phase(&self, operation: &'static str, expected: GamePhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                operation,
                expected: expected.name(),
                actual: self.phase.name(),
            })
        }
    }

    fn find_player(&self, player_id: &str) -> Result<&Player, GameError> {
        self.player(player_id)
            .ok_or_else(|| GameError::player_not_found(player_id))
    }

    // --- queries ---

    /// Players in seat order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player by id.
    #[must_use]
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    /// Players not yet eliminated, in seat order. This is the voting order.
    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| player.is_alive())
    }

    /// Number of alive players holding `role`.
    #[must_use]
    pub fn alive_count(&self, role: Role) -> usize {
        self.alive_players()
            .filter(|player| player.role == role)
            .count()
    }

    /// The selected game.
    #[must_use]
    pub fn game(&self) -> &GameDefinition {
        &self.game
    }

    /// The active word pair, once words are assigned.
    #[must_use]
    pub fn word_pair(&self) -> Option<&WordPair> {
        self.word_pair.as_ref()
    }

    /// Number of impostors fixed at creation.
    #[must_use]
    pub fn number_of_impostors(&self) -> usize {
        self.number_of_impostors
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Seat holding the device during the reveal.
    #[must_use]
    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    /// Player holding the device during the reveal.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Votes of the round in progress (or of the final round in results).
    #[must_use]
    pub fn votes(&self) -> &BTreeMap<String, String> {
        &self.votes
    }

    /// Round number, starting at 1.
    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Every round resolved so far, oldest first.
    #[must_use]
    pub fn rounds(&self) -> &[RoundResolution] {
        &self.rounds
    }

    // --- commands ---

    /// Moves from setup to name collection.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Setup`.
    pub fn start_names_collection(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), GameError> {
        self.require_phase("advance_to_names", GamePhase::Setup)?;
        self.record(SessionEventKind::NamesCollectionStarted, correlation_id, clock);
        Ok(())
    }

    /// Writes names onto seats by index.
    ///
    /// Missing, empty or whitespace-only entries fall back to the seat's
    /// default name; extra entries are ignored. Length rules are checked by
    /// [`validate_player_names`](super::players::validate_player_names)
    /// before this is called.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Names`.
    pub fn set_player_names(
        &mut self,
        names: &[String],
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), GameError> {
        self.require_phase("set_player_names", GamePhase::Names)?;

        let names = (0..self.players.len())
            .map(|index| {
                names
                    .get(index)
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map_or_else(|| default_name(index), str::to_owned)
            })
            .collect();

        self.record(
            SessionEventKind::PlayerNamesSet(PlayerNamesSet { names }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Draws a word pair and picks the impostor seats.
    ///
    /// The word pair is drawn first, then `number_of_impostors` distinct
    /// seats by rejection sampling. Allowed from any phase so a finished
    /// table can deal a rematch; the reveal pointer, votes, round counter
    /// and round history start over.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Catalog` if the corpus has no word pairs.
    pub fn assign_words(
        &mut self,
        catalog: &dyn Catalog,
        rng: &mut dyn DeterministicRng,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), GameError> {
        let word_pair = catalog.pick_random_word_pair(rng)?;
        let impostor_indices =
            sample_distinct_indices(rng, self.players.len(), self.number_of_impostors);

        self.record(
            SessionEventKind::WordsAssigned(WordsAssigned {
                word_pair,
                impostor_indices,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Passes the device to the next seat, or ends the reveal after the last.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Assigning`.
    pub fn next_player(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), GameError> {
        self.require_phase("next_player", GamePhase::Assigning)?;

        let next_index = self.current_player_index + 1;
        let kind = if next_index >= self.players.len() {
            SessionEventKind::RevealCompleted
        } else {
            SessionEventKind::RevealAdvanced(RevealAdvanced {
                player_index: next_index,
            })
        };
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Opens voting.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Playing`.
    pub fn start_voting(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), GameError> {
        self.require_phase("start_voting", GamePhase::Playing)?;
        self.record(SessionEventKind::VotingStarted, correlation_id, clock);
        Ok(())
    }

    /// Records (or overwrites) `voter_id`'s vote for `target_id`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Voting`,
    /// `GameError::NotFound` for an unknown voter or target, and
    /// `GameError::Validation` if either is eliminated or the voter targets
    /// themselves.
    pub fn cast_vote(
        &mut self,
        voter_id: &str,
        target_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), GameError> {
        self.require_phase("cast_vote", GamePhase::Voting)?;

        let voter = self.find_player(voter_id)?;
        if voter.is_eliminated {
            return Err(GameError::Validation(format!(
                "{} has been eliminated and cannot vote",
                voter.name
            )));
        }
        let target = self.find_player(target_id)?;
        if target.is_eliminated {
            return Err(GameError::Validation(format!(
                "{} has already been eliminated",
                target.name
            )));
        }
        if voter_id == target_id {
            return Err(GameError::Validation(format!(
                "{} cannot vote for themselves",
                voter.name
            )));
        }

        self.record(
            SessionEventKind::VoteCast(VoteCast {
                voter_id: voter_id.to_owned(),
                target_id: target_id.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Tallies the round and acts on it.
    ///
    /// Records the resolution, eliminates the majority target if there is
    /// one, then either finishes the game or starts the next round.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Voting`.
    pub fn resolve_voting_round(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<RoundResolution, GameError> {
        self.require_phase("resolve_voting_round", GamePhase::Voting)?;

        let resolution = voting::resolve_voting_round(self);
        let next_round = self.current_round + 1;

        self.record(
            SessionEventKind::RoundResolved(resolution.clone()),
            correlation_id,
            clock,
        );
        if let Some(player_id) = &resolution.eliminated_player_id {
            self.record(
                SessionEventKind::PlayerEliminated(PlayerEliminated {
                    player_id: player_id.clone(),
                    withdrawn_voters: Vec::new(),
                }),
                correlation_id,
                clock,
            );
        }
        let follow_up = match resolution.outcome {
            RoundOutcome::ImpostorCaught => SessionEventKind::GameFinished(GameFinished {
                reason: FinishReason::ImpostorCaught,
            }),
            RoundOutcome::ImpostorsReachedParity => SessionEventKind::GameFinished(GameFinished {
                reason: FinishReason::ImpostorsReachedParity,
            }),
            RoundOutcome::CivilEliminated | RoundOutcome::NoMajority => {
                SessionEventKind::NewRoundStarted(NewRoundStarted { round: next_round })
            }
        };
        self.record(follow_up, correlation_id, clock);

        Ok(resolution)
    }

    /// Starts the next round without tallying the current one.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPhase` unless in `Voting`.
    pub fn start_new_round(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), GameError> {
        self.require_phase("start_new_round", GamePhase::Voting)?;
        self.record(
            SessionEventKind::NewRoundStarted(NewRoundStarted {
                round: self.current_round + 1,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Marks a player as eliminated. Returns `false` if they already were.
    ///
    /// Ballots of the current round cast by or against the player are withdrawn.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotFound` for an unknown player id.
    pub fn eliminate_player(
        &mut self,
        player_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, GameError> {
        if self.find_player(player_id)?.is_eliminated {
            return Ok(false);
        }
        let withdrawn_voters = self
            .votes
            .iter()
            .filter(|(voter, target)| *voter == player_id || *target == player_id)
            .map(|(voter, _)| voter.clone())
            .collect();
        self.record(
            SessionEventKind::PlayerEliminated(PlayerEliminated {
                player_id: player_id.to_owned(),
                withdrawn_voters,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Forces the session into results. Returns `false` if it already was.
    pub fn finish_game(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.phase == GamePhase::Results {
            return false;
        }
        self.record(
            SessionEventKind::GameFinished(GameFinished {
                reason: FinishReason::Forced,
            }),
            correlation_id,
            clock,
        );
        true
    }
}

impl AggregateRoot for GameSession {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::SessionCreated(payload) => {
                self.players = (0..payload.player_count).map(Player::seated).collect();
                self.game.clone_from(&payload.game);
                self.number_of_impostors = payload.number_of_impostors;
                self.phase = GamePhase::Setup;
            }
            SessionEventKind::NamesCollectionStarted => {
                self.phase = GamePhase::Names;
            }
            SessionEventKind::PlayerNamesSet(payload) => {
                for (player, name) in self.players.iter_mut().zip(&payload.names) {
                    player.name.clone_from(name);
                }
            }
            SessionEventKind::WordsAssigned(payload) => {
                for (index, player) in self.players.iter_mut().enumerate() {
                    if payload.impostor_indices.contains(&index) {
                        player.role = Role::Impostor;
                        player.word.clone_from(&payload.word_pair.impostor);
                    } else {
                        player.role = Role::Civil;
                        player.word.clone_from(&payload.word_pair.civil);
                    }
                    player.is_eliminated = false;
                }
                self.word_pair = Some(payload.word_pair.clone());
                self.phase = GamePhase::Assigning;
                self.current_player_index = 0;
                self.votes.clear();
                self.current_round = 1;
                self.rounds.clear();
            }
            SessionEventKind::RevealAdvanced(payload) => {
                self.current_player_index = payload.player_index;
            }
            SessionEventKind::RevealCompleted => {
                self.phase = GamePhase::Playing;
            }
            SessionEventKind::VotingStarted => {
                self.phase = GamePhase::Voting;
            }
            SessionEventKind::VoteCast(payload) => {
                self.votes
                    .insert(payload.voter_id.clone(), payload.target_id.clone());
            }
            SessionEventKind::RoundResolved(payload) => {
                self.rounds.push(payload.clone());
            }
            SessionEventKind::PlayerEliminated(payload) => {
                if let Some(player) = self
                    .players
                    .iter_mut()
                    .find(|player| player.id == payload.player_id)
                {
                    player.is_eliminated = true;
                }
                for voter in &payload.withdrawn_voters {
                    self.votes.remove(voter);
                }
            }
            SessionEventKind::NewRoundStarted(payload) => {
                self.current_round = payload.round;
                self.votes.clear();
                self.phase = GamePhase::Voting;
            }
            SessionEventKind::GameFinished(_) => {
                self.phase = GamePhase::Results;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
