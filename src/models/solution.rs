//! Solution and violation types.

use serde::{Deserialize, Serialize};

use super::{NodeId, SegmentId};

/// A type of constraint violation in a stop sequence or segment route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A dropoff is reached before any visit to its pickup.
    PrecedenceViolated {
        /// Index of the request in the caller's request list.
        request_index: usize,
        /// Pickup intersection of that request.
        pickup: NodeId,
        /// Dropoff intersection of that request.
        dropoff: NodeId,
    },
    /// A request stop never appears on the route.
    StopNotVisited {
        /// Index of the request in the caller's request list.
        request_index: usize,
        /// The missing intersection.
        node: NodeId,
    },
    /// The route does not begin at a depot.
    StartNotDepot {
        /// Intersection the route begins at.
        node: NodeId,
    },
    /// The route does not end at a depot.
    EndNotDepot {
        /// Intersection the route ends at.
        node: NodeId,
    },
    /// Two consecutive segments do not share a traversable intersection.
    Disconnected {
        /// Position of the offending segment in the route.
        position: usize,
        /// The offending segment.
        segment: SegmentId,
    },
    /// A one-way segment is travelled against its direction.
    WrongWay {
        /// Position of the offending segment in the route.
        position: usize,
        /// The offending segment.
        segment: SegmentId,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// The outcome of a courier solve.
///
/// `stops` is the winning visiting order including both depot slots and
/// `route` is its expansion into street segments. An empty `route` with a
/// non-trivial `stops` means two consecutive stops are disconnected and no
/// solution exists.
///
/// # Examples
///
/// ```
/// use u_courier::models::CourierSolution;
///
/// let sol = CourierSolution::new(vec![0, 3, 1, 0], 6.0, vec![10, 11, 12]);
/// assert_eq!(sol.interior(), &[3, 1]);
/// assert!(sol.is_routable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourierSolution {
    stops: Vec<NodeId>,
    cost: f64,
    route: Vec<SegmentId>,
}

impl CourierSolution {
    /// Creates a solution from its stop order, estimated cost and route.
    pub fn new(stops: Vec<NodeId>, cost: f64, route: Vec<SegmentId>) -> Self {
        Self { stops, cost, route }
    }

    /// Creates the solution reported when no connected route exists.
    pub fn unroutable(stops: Vec<NodeId>) -> Self {
        Self {
            stops,
            cost: f64::INFINITY,
            route: Vec::new(),
        }
    }

    /// Visiting order including the start and end depots.
    pub fn stops(&self) -> &[NodeId] {
        &self.stops
    }

    /// Visiting order without the depot slots.
    pub fn interior(&self) -> &[NodeId] {
        if self.stops.len() < 2 {
            return &[];
        }
        &self.stops[1..self.stops.len() - 1]
    }

    /// Estimated travel time in minutes from the proximity index.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Street segments to traverse, in order.
    pub fn route(&self) -> &[SegmentId] {
        &self.route
    }

    /// Consumes the solution, returning the segment route.
    pub fn into_route(self) -> Vec<SegmentId> {
        self.route
    }

    /// Returns `true` if every consecutive stop pair was connected.
    pub fn is_routable(&self) -> bool {
        self.cost.is_finite()
    }
}
