//! Precomputed travel times between the stops of a courier problem.
//!
//! - [`ProximityIndex`] — Sparse cost map and ranked neighbour lists built
//!   by parallel multi-target searches

mod index;

pub use index::ProximityIndex;
