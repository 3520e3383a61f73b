//! Impostor party game — session engine.
//!
//! Owns the single active game session and drives it through
//! setup, name collection, secret word assignment, the reveal loop,
//! voting rounds and final results.

pub mod application;
pub mod domain;

pub use application::engine::SessionEngine;
pub use application::query_handlers::{SessionSnapshot, SessionView, get_session, get_snapshot};
pub use domain::aggregates::{GamePhase, GameSession};
pub use domain::players::{Player, Role};
pub use domain::voting::{RoundOutcome, RoundResolution, Winner};
