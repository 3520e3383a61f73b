//! Vote tallying, round resolution and winner determination.
//!
//! These functions are pure: they read a session and report what the
//! rules say should happen. [`GameSession::resolve_voting_round`] is the
//! only place that acts on the result.
//!
//! [`GameSession::resolve_voting_round`]: super::aggregates::GameSession::resolve_voting_round

use serde::{Deserialize, Serialize};

use super::aggregates::GameSession;
use super::players::{Player, Role};

/// Votes received by one player in the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    /// The player receiving the votes.
    pub player_id: String,
    /// Number of votes received.
    pub votes: usize,
}

/// What a tallied round means for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// An impostor received a strict majority. Civils win.
    ImpostorCaught,
    /// A civil was voted out and impostors now match the civils left.
    ImpostorsReachedParity,
    /// A civil was voted out and play continues.
    CivilEliminated,
    /// Nobody received a strict majority. Play continues.
    NoMajority,
}

impl RoundOutcome {
    /// Returns `true` if this outcome moves the session to results.
    #[must_use]
    pub fn ends_game(self) -> bool {
        matches!(self, Self::ImpostorCaught | Self::ImpostorsReachedParity)
    }
}

/// The tallied result of one voting round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResolution {
    /// Round number that was tallied.
    pub round: u32,
    /// Number of votes cast.
    pub total_votes: usize,
    /// Every player's count, highest first.
    pub tally: Vec<VoteCount>,
    /// Player who received a strict majority, if any.
    pub eliminated_player_id: Option<String>,
    /// Role of that player.
    pub eliminated_role: Option<Role>,
    /// Consequence for the game.
    pub outcome: RoundOutcome,
}

/// Final result shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// Civils voted out an impostor.
    Civils,
    /// Civils voted out one of their own.
    Impostors,
    /// No round was completed, or the last one had no strict majority.
    Inconclusive,
}

/// Returns `true` if `received` is strictly more than half of `total`.
#[must_use]
pub fn has_strict_majority(received: usize, total: usize) -> bool {
    received * 2 > total
}

fn votes_received(session: &GameSession, player_id: &str) -> usize {
    session
        .votes()
        .values()
        .filter(|target| target.as_str() == player_id)
        .count()
}

/// Counts the votes each player received, highest first.
///
/// Players with equal counts keep their seat order.
#[must_use]
pub fn tally_votes(session: &GameSession) -> Vec<VoteCount> {
    let mut tally: Vec<VoteCount> = session
        .players()
        .iter()
        .map(|player| VoteCount {
            player_id: player.id.clone(),
            votes: votes_received(session, &player.id),
        })
        .collect();
    tally.sort_by(|a, b| b.votes.cmp(&a.votes));
    tally
}

/// The player holding a strict majority of the votes cast, if any.
#[must_use]
pub fn majority_candidate(session: &GameSession) -> Option<&Player> {
    let total = session.votes().len();
    session
        .players()
        .iter()
        .find(|player| has_strict_majority(votes_received(session, &player.id), total))
}

/// Decides the outcome of the current voting round.
#[must_use]
pub fn resolve_voting_round(session: &GameSession) -> RoundResolution {
    let candidate = majority_candidate(session);

    let outcome = match candidate {
        None => RoundOutcome::NoMajority,
        Some(player) if player.role == Role::Impostor => RoundOutcome::ImpostorCaught,
        Some(player) => {
            let civils_after =
                session.alive_count(Role::Civil) - usize::from(player.is_alive());
            if civils_after <= session.alive_count(Role::Impostor) {
                RoundOutcome::ImpostorsReachedParity
            } else {
                RoundOutcome::CivilEliminated
            }
        }
    };

    RoundResolution {
        round: session.current_round(),
        total_votes: session.votes().len(),
        tally: tally_votes(session),
        eliminated_player_id: candidate.map(|player| player.id.clone()),
        eliminated_role: candidate.map(|player| player.role),
        outcome,
    }
}

/// Determines the winner from the last completed voting round.
///
/// Ballots of a round still in progress do not count, so a game finished
/// mid-round is judged on the round before it.
#[must_use]
pub fn determine_winner(session: &GameSession) -> Winner {
    match session.rounds().last().and_then(|round| round.eliminated_role) {
        Some(Role::Impostor) => Winner::Civils,
        Some(Role::Civil) => Winner::Impostors,
        None => Winner::Inconclusive,
    }
}
