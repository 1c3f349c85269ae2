//! Shortest paths over the street graph.
//!
//! - [`ShortestPathEngine`] — Turn-aware A* and multi-target Dijkstra
//! - [`SearchWorkspace`] — Reusable per-worker scratch arrays
//! - [`SearchParams`] — Turn penalty and heuristic speed

mod engine;
mod workspace;

pub use engine::{SearchParams, ShortestPathEngine};
pub use workspace::SearchWorkspace;
