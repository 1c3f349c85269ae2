//! Street segment attributes.

use serde::{Deserialize, Serialize};

use super::{LatLon, NodeId, StreetId};

/// Static attributes of a street segment as supplied by the map service.
///
/// A segment joins `from` and `to`. When `one_way` is set it may only be
/// travelled from `from` towards `to`.
///
/// # Examples
///
/// ```
/// use u_courier::models::SegmentInfo;
///
/// let seg = SegmentInfo::new(0, 1, 7, 50.0).with_one_way(true);
/// assert!(seg.allows(0));
/// assert!(!seg.allows(1));
/// assert_eq!(seg.other_end(0), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    /// Start intersection.
    pub from: NodeId,
    /// End intersection.
    pub to: NodeId,
    /// Travel is only allowed from `from` to `to`.
    pub one_way: bool,
    /// Street this segment belongs to.
    pub street_id: StreetId,
    /// Speed limit in km/h.
    pub speed_limit: f64,
    /// Intermediate shape points, ordered from `from` to `to`.
    pub curve_points: Vec<LatLon>,
}

impl SegmentInfo {
    /// Creates a straight two-way segment.
    pub fn new(from: NodeId, to: NodeId, street_id: StreetId, speed_limit: f64) -> Self {
        Self {
            from,
            to,
            one_way: false,
            street_id,
            speed_limit,
            curve_points: Vec::new(),
        }
    }

    /// Sets the one-way flag.
    pub fn with_one_way(mut self, one_way: bool) -> Self {
        self.one_way = one_way;
        self
    }

    /// Sets the intermediate shape points.
    pub fn with_curve_points(mut self, curve_points: Vec<LatLon>) -> Self {
        self.curve_points = curve_points;
        self
    }

    /// Returns `true` if the segment can be entered at `node`.
    pub fn allows(&self, node: NodeId) -> bool {
        if self.one_way {
            self.from == node
        } else {
            self.from == node || self.to == node
        }
    }

    /// Returns the intersection at the opposite end from `node`.
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.to == node {
            self.from
        } else {
            self.to
        }
    }
}
