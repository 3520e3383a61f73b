//! Impostor Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the catalog and
//! session crates depend on. It contains no presentation code.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod event;
pub mod rng;
