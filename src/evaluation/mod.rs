//! Independent legality checks.
//!
//! - [`RouteEvaluator`] — Depot, visit and precedence checks for stop
//!   sequences and segment routes

mod evaluator;

pub use evaluator::RouteEvaluator;
