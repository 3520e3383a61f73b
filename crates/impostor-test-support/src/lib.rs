//! Shared test doubles for the Impostor party game.

mod clock;
mod rng;

pub use clock::{FixedClock, fixed_clock};
pub use rng::{MockRng, SequenceRng};
