//! Domain events for a game session.

use impostor_catalog::{GameDefinition, WordPair};
use impostor_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::voting::RoundResolution;

/// Event type for [`SessionCreated`].
pub const SESSION_CREATED_EVENT_TYPE: &str = "session.created";
/// Event type for [`SessionEventKind::NamesCollectionStarted`].
pub const NAMES_COLLECTION_STARTED_EVENT_TYPE: &str = "session.names_collection_started";
/// Event type for [`PlayerNamesSet`].
pub const PLAYER_NAMES_SET_EVENT_TYPE: &str = "session.player_names_set";
/// Event type for [`WordsAssigned`].
pub const WORDS_ASSIGNED_EVENT_TYPE: &str = "session.words_assigned";
/// Event type for [`RevealAdvanced`].
pub const REVEAL_ADVANCED_EVENT_TYPE: &str = "session.reveal_advanced";
/// Event type for [`SessionEventKind::RevealCompleted`].
pub const REVEAL_COMPLETED_EVENT_TYPE: &str = "session.reveal_completed";
/// Event type for [`SessionEventKind::VotingStarted`].
pub const VOTING_STARTED_EVENT_TYPE: &str = "session.voting_started";
/// Event type for [`VoteCast`].
pub const VOTE_CAST_EVENT_TYPE: &str = "session.vote_cast";
/// Event type for [`SessionEventKind::RoundResolved`].
pub const ROUND_RESOLVED_EVENT_TYPE: &str = "session.round_resolved";
/// Event type for [`PlayerEliminated`].
pub const PLAYER_ELIMINATED_EVENT_TYPE: &str = "session.player_eliminated";
/// Event type for [`NewRoundStarted`].
pub const NEW_ROUND_STARTED_EVENT_TYPE: &str = "session.new_round_started";
/// Event type for [`GameFinished`].
pub const GAME_FINISHED_EVENT_TYPE: &str = "session.game_finished";

/// Emitted when a session is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    /// The session identifier.
    pub session_id: Uuid,
    /// The selected game.
    pub game: GameDefinition,
    /// Number of seats.
    pub player_count: usize,
    /// Number of impostors to assign.
    pub number_of_impostors: usize,
}

/// Emitted when names are written onto the seats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerNamesSet {
    /// One name per seat, defaults already filled in.
    pub names: Vec<String>,
}

/// Emitted when roles and words are handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordsAssigned {
    /// The drawn word pair.
    pub word_pair: WordPair,
    /// Seats that received the impostor role, in draw order.
    pub impostor_indices: Vec<usize>,
}

/// Emitted when the device passes to the next player during the reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealAdvanced {
    /// The seat now holding the device.
    pub player_index: usize,
}

/// Emitted when a vote is recorded or overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteCast {
    /// The voting player.
    pub voter_id: String,
    /// The accused player.
    pub target_id: String,
}

/// Emitted when a player is removed from play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEliminated {
    /// The eliminated player.
    pub player_id: String,
    /// Voters whose ballot was cast by or against the player and no longer counts.
    #[serde(default)]
    pub withdrawn_voters: Vec<String>,
}

/// Emitted when a fresh voting round begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoundStarted {
    /// The round number now in progress.
    pub round: u32,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// An impostor was voted out.
    ImpostorCaught,
    /// Impostors matched the remaining civils.
    ImpostorsReachedParity,
    /// The game was ended from outside the voting flow.
    Forced,
}

/// Emitted when the session enters the results phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFinished {
    /// Why the game ended.
    pub reason: FinishReason,
}

/// Event payload variants for a game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A session has been created.
    SessionCreated(SessionCreated),
    /// The table moved on to entering names.
    NamesCollectionStarted,
    /// Player names have been set.
    PlayerNamesSet(PlayerNamesSet),
    /// Roles and words have been assigned.
    WordsAssigned(WordsAssigned),
    /// The reveal pointer moved to the next seat.
    RevealAdvanced(RevealAdvanced),
    /// Every player has seen their word.
    RevealCompleted,
    /// Voting has opened.
    VotingStarted,
    /// A vote has been recorded.
    VoteCast(VoteCast),
    /// A voting round has been tallied.
    RoundResolved(RoundResolution),
    /// A player has been eliminated.
    PlayerEliminated(PlayerEliminated),
    /// A new voting round has started.
    NewRoundStarted(NewRoundStarted),
    /// The game has ended.
    GameFinished(GameFinished),
}

/// Domain event envelope for a game session.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl SessionEventKind {
    /// The event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionCreated(_) => SESSION_CREATED_EVENT_TYPE,
            Self::NamesCollectionStarted => NAMES_COLLECTION_STARTED_EVENT_TYPE,
            Self::PlayerNamesSet(_) => PLAYER_NAMES_SET_EVENT_TYPE,
            Self::WordsAssigned(_) => WORDS_ASSIGNED_EVENT_TYPE,
            Self::RevealAdvanced(_) => REVEAL_ADVANCED_EVENT_TYPE,
            Self::RevealCompleted => REVEAL_COMPLETED_EVENT_TYPE,
            Self::VotingStarted => VOTING_STARTED_EVENT_TYPE,
            Self::VoteCast(_) => VOTE_CAST_EVENT_TYPE,
            Self::RoundResolved(_) => ROUND_RESOLVED_EVENT_TYPE,
            Self::PlayerEliminated(_) => PLAYER_ELIMINATED_EVENT_TYPE,
            Self::NewRoundStarted(_) => NEW_ROUND_STARTED_EVENT_TYPE,
            Self::GameFinished(_) => GAME_FINISHED_EVENT_TYPE,
        }
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
