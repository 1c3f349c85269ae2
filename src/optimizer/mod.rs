//! Parallel portfolio search over courier tours.
//!
//! - [`ParallelOptimizer`] — Builds initial tours, improves them on worker
//!   threads and expands the best one into street segments
//! - [`solve_courier`] — One-call entry point returning the segment route
//! - [`SolverConfig`] — Time limit, worker mix, seed and path cost model
//! - [`StrategyKind`] — Greedy, two-opt style and annealing workers

mod config;
mod solver;
mod strategy;

pub use config::{SolverConfig, StrategyKind, DEFAULT_PORTFOLIO};
pub use solver::{solve_courier, ParallelOptimizer};
pub use strategy::START_TEMPERATURE;
