//! Impostor party game — terminal front-end.
//!
//! Renders the session engine's current phase as a text screen and turns
//! typed answers into engine operations.

pub mod app;
pub mod config;
pub mod error;
