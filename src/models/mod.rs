//! Domain model types for courier routing.
//!
//! Provides the identifiers and value types shared by every layer: node and
//! segment ids, geographic positions, street segment attributes, delivery
//! requests, and the solution returned by the optimizer.

mod delivery;
mod location;
mod segment;
mod solution;

pub use delivery::DeliveryRequest;
pub use location::{LatLon, NodeId, SegmentId, StreetId};
pub use segment::SegmentInfo;
pub use solution::{CourierSolution, Violation, ViolationType};
