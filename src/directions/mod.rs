//! Turn-by-turn directions.
//!
//! - [`describe`] — Instructions for driving a segment path
//! - [`Instruction`] — One step, with a `Display` phrasing
//! - [`Heading`], [`Maneuver`], [`Side`] — Building blocks of instructions

mod describe;
mod instruction;

pub use describe::describe;
pub use instruction::{Heading, Instruction, Maneuver, Side};
