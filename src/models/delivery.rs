//! Delivery request type.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A single courier order: the item must be collected at `pickup` before
/// the courier visits `dropoff`.
///
/// Node ids are not unique across requests. The same intersection may be a
/// pickup for one request, a dropoff for another, and a depot as well.
///
/// # Examples
///
/// ```
/// use u_courier::models::DeliveryRequest;
///
/// let r = DeliveryRequest::new(3, 1);
/// assert_eq!(r.pickup, 3);
/// assert_eq!(r.dropoff, 1);
/// assert_eq!(r.nodes(), [3, 1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryRequest {
    /// Intersection where the item is collected.
    pub pickup: NodeId,
    /// Intersection where the item is delivered.
    pub dropoff: NodeId,
}

impl DeliveryRequest {
    /// Creates a new delivery request.
    pub fn new(pickup: NodeId, dropoff: NodeId) -> Self {
        Self { pickup, dropoff }
    }

    /// Both stops of the request, pickup first.
    pub fn nodes(&self) -> [NodeId; 2] {
        [self.pickup, self.dropoff]
    }
}

impl From<(NodeId, NodeId)> for DeliveryRequest {
    fn from((pickup, dropoff): (NodeId, NodeId)) -> Self {
        Self::new(pickup, dropoff)
    }
}
