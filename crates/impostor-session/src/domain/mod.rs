//! Domain model for a game session.

pub mod aggregates;
pub mod events;
pub mod players;
pub mod voting;
