//! Pickup-before-dropoff constraints.
//!
//! - [`PrecedenceTable`] — Before/after lists per intersection and the
//!   position-based validity checks used by tour moves
//! - [`InsertionTracker`] — Topological bookkeeping for the initial tour

mod table;
mod tracker;

pub use table::{NodeConditions, PrecedenceTable};
pub use tracker::InsertionTracker;
