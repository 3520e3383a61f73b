//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Input was rejected before any state changed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced game definition or player does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was being looked up (`game`, `player`).
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// An operation was invoked while the session was in the wrong phase.
    #[error("cannot {operation} during {actual} phase (expected {expected})")]
    InvalidPhase {
        /// The rejected operation.
        operation: &'static str,
        /// The phase(s) the operation requires.
        expected: &'static str,
        /// The phase the session was in.
        actual: &'static str,
    },

    /// An operation that needs a session was invoked with none active.
    #[error("no active session")]
    NoActiveSession,

    /// The word corpus could not be loaded or is unusable.
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl GameError {
    /// Shorthand for a `NotFound` error on a player id.
    #[must_use]
    pub fn player_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "player",
            id: id.to_owned(),
        }
    }
}
