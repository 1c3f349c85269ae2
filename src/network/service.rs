//! Read-only road network interface consumed by the routing core.

use crate::models::{LatLon, NodeId, SegmentId, SegmentInfo, StreetId};

use super::geometry;

/// Road network data and spatial queries.
///
/// The routing core never owns map data. It receives an implementation of
/// this trait and only reads from it, so the same map can back many
/// concurrent searches. Ids passed to these methods are expected to be in
/// range; implementations may panic otherwise.
///
/// # Examples
///
/// ```
/// use u_courier::models::{LatLon, SegmentInfo};
/// use u_courier::network::{MapService, StreetNetwork};
///
/// let mut builder = StreetNetwork::builder();
/// let a = builder.add_node(LatLon::new(0.0, 0.0));
/// let b = builder.add_node(LatLon::new(0.0, 0.01));
/// builder.add_street("Main St");
/// builder.add_segment(SegmentInfo::new(a, b, 0, 50.0));
/// let map = builder.build().unwrap();
///
/// assert_eq!(map.node_count(), 2);
/// assert_eq!(map.segments_at(a), &[0]);
/// assert!(map.segment_travel_time(0) > 0.0);
/// ```
pub trait MapService: Send + Sync {
    /// Number of intersections. Valid node ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Position of an intersection.
    fn position_of(&self, node: NodeId) -> LatLon;

    /// Segments incident to an intersection, regardless of direction.
    fn segments_at(&self, node: NodeId) -> &[SegmentId];

    /// Attributes of a segment.
    fn segment_info(&self, segment: SegmentId) -> &SegmentInfo;

    /// Display name of a street.
    fn street_name(&self, street: StreetId) -> &str;

    /// Intersection closest to `point`, or `None` for an empty map.
    fn nearest_node(&self, point: LatLon) -> Option<NodeId>;

    /// Distance in meters between two positions.
    fn distance(&self, a: LatLon, b: LatLon) -> f64 {
        geometry::distance_between(a, b)
    }

    /// Length in meters of a segment following its curve points.
    fn segment_length(&self, segment: SegmentId) -> f64 {
        let info = self.segment_info(segment);
        let mut length = 0.0;
        let mut prev = self.position_of(info.from);
        for &point in &info.curve_points {
            length += self.distance(prev, point);
            prev = point;
        }
        length + self.distance(prev, self.position_of(info.to))
    }

    /// Minutes needed to drive a segment at its speed limit.
    fn segment_travel_time(&self, segment: SegmentId) -> f64 {
        let speed = self.segment_info(segment).speed_limit;
        geometry::minutes_at(self.segment_length(segment), speed)
    }
}
