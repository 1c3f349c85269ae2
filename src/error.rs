//! Error types.

use thiserror::Error;

use crate::models::NodeId;

/// Errors returned by the courier solver.
///
/// A disconnected stop pair is not an error: the solver reports it as an
/// empty route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CourierError {
    /// No depot was supplied.
    #[error("at least one depot is required")]
    NoDepots,
    /// A request or depot refers to an intersection the map does not know.
    #[error("intersection {0} is not part of the road network")]
    UnknownNode(NodeId),
    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    /// Solver configuration is inconsistent.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Errors returned while assembling a [`StreetNetwork`](crate::network::StreetNetwork).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// A segment endpoint has no registered position.
    #[error("segment endpoint {0} has no intersection position")]
    UnknownNode(NodeId),
    /// Speed limits must be positive and finite.
    #[error("speed limit must be positive, got {0}")]
    InvalidSpeedLimit(f64),
    /// Positions must be finite coordinates.
    #[error("intersection {0} has a non-finite position")]
    InvalidPosition(NodeId),
}
