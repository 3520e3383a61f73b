//! Application layer: the engine that owns the session and read-only views.

pub mod engine;
pub mod query_handlers;
