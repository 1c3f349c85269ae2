//! Candidate tours and their construction.
//!
//! - [`PositionIndex`] — Interior positions of every stop
//! - [`Tour`] — Stop sequence with validated move operators
//! - [`InitialTourBuilder`] — Nearest-neighbour tour that respects precedence

mod builder;
mod moves;
mod position_index;

pub use builder::InitialTourBuilder;
pub use moves::{SwapVariant, Tour, MAX_MINOR_ATTEMPTS, MAX_SECTION_ATTEMPTS};
pub use position_index::PositionIndex;
