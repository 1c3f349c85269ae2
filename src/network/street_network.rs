//! In-memory road network with an R-tree for nearest-intersection queries.

use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::NetworkError;
use crate::models::{LatLon, NodeId, SegmentId, SegmentInfo, StreetId};

use super::geometry;
use super::MapService;

/// Name reported for streets without a registered name.
pub const UNKNOWN_STREET: &str = "<unknown>";

/// The R-tree compares raw degrees, so a few candidates are re-ranked with
/// the projected distance.
const NEAREST_CANDIDATES: usize = 5;

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

/// Owned road network implementing [`MapService`].
///
/// Segment travel times are computed once at build time.
///
/// # Examples
///
/// ```
/// use u_courier::models::{LatLon, SegmentInfo};
/// use u_courier::network::{MapService, StreetNetwork};
///
/// let mut builder = StreetNetwork::builder();
/// let a = builder.add_node(LatLon::new(43.0, -79.0));
/// let b = builder.add_node(LatLon::new(43.0, -78.99));
/// let main = builder.add_street("Main St");
/// builder.add_segment(SegmentInfo::new(a, b, main, 40.0).with_one_way(true));
/// let map = builder.build().unwrap();
///
/// assert_eq!(map.nearest_node(LatLon::new(43.0001, -78.9901)), Some(b));
/// assert_eq!(map.street_name(main), "Main St");
/// ```
#[derive(Debug, Clone)]
pub struct StreetNetwork {
    positions: Vec<LatLon>,
    segments: Vec<SegmentInfo>,
    streets: Vec<String>,
    adjacency: Vec<Vec<SegmentId>>,
    travel_times: Vec<f64>,
    index: RTree<IndexedNode>,
}

impl StreetNetwork {
    /// Starts an empty network.
    pub fn builder() -> StreetNetworkBuilder {
        StreetNetworkBuilder::default()
    }

    /// Number of street segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment joining `a` and `b` in either direction, if any.
    pub fn segment_between(&self, a: NodeId, b: NodeId) -> Option<SegmentId> {
        self.adjacency.get(a)?.iter().copied().find(|&seg| {
            let info = &self.segments[seg];
            (info.from == a && info.to == b) || (info.from == b && info.to == a)
        })
    }
}

impl MapService for StreetNetwork {
    fn node_count(&self) -> usize {
        self.positions.len()
    }

    fn position_of(&self, node: NodeId) -> LatLon {
        self.positions[node]
    }

    fn segments_at(&self, node: NodeId) -> &[SegmentId] {
        &self.adjacency[node]
    }

    fn segment_info(&self, segment: SegmentId) -> &SegmentInfo {
        &self.segments[segment]
    }

    fn street_name(&self, street: StreetId) -> &str {
        self.streets
            .get(street)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_STREET)
    }

    fn nearest_node(&self, point: LatLon) -> Option<NodeId> {
        self.index
            .nearest_neighbor_iter(&[point.lon, point.lat])
            .take(NEAREST_CANDIDATES)
            .map(|entry| (entry.data, geometry::distance_between(point, self.positions[entry.data])))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }

    fn segment_travel_time(&self, segment: SegmentId) -> f64 {
        self.travel_times[segment]
    }
}

/// Incremental constructor for [`StreetNetwork`].
#[derive(Debug, Clone, Default)]
pub struct StreetNetworkBuilder {
    positions: Vec<LatLon>,
    segments: Vec<SegmentInfo>,
    streets: Vec<String>,
}

impl StreetNetworkBuilder {
    /// Registers an intersection and returns its id.
    pub fn add_node(&mut self, position: LatLon) -> NodeId {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// Registers a street name and returns its id.
    pub fn add_street(&mut self, name: impl Into<String>) -> StreetId {
        self.streets.push(name.into());
        self.streets.len() - 1
    }

    /// Registers a segment and returns its id.
    pub fn add_segment(&mut self, info: SegmentInfo) -> SegmentId {
        self.segments.push(info);
        self.segments.len() - 1
    }

    /// Validates the collected data and builds the network.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] when a position is not finite, a segment
    /// refers to an unregistered intersection, or a speed limit is not
    /// positive.
    pub fn build(self) -> Result<StreetNetwork, NetworkError> {
        if let Some(node) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(NetworkError::InvalidPosition(node));
        }

        let n = self.positions.len();
        let mut adjacency = vec![Vec::new(); n];
        for (id, seg) in self.segments.iter().enumerate() {
            for end in [seg.from, seg.to] {
                if end >= n {
                    return Err(NetworkError::UnknownNode(end));
                }
            }
            if !(seg.speed_limit.is_finite() && seg.speed_limit > 0.0) {
                return Err(NetworkError::InvalidSpeedLimit(seg.speed_limit));
            }
            adjacency[seg.from].push(id);
            if seg.to != seg.from {
                adjacency[seg.to].push(id);
            }
        }

        let entries = self
            .positions
            .iter()
            .enumerate()
            .map(|(node, p)| IndexedNode::new([p.lon, p.lat], node))
            .collect();

        let mut network = StreetNetwork {
            positions: self.positions,
            segments: self.segments,
            streets: self.streets,
            adjacency,
            travel_times: Vec::new(),
            index: RTree::bulk_load(entries),
        };
        network.travel_times = (0..network.segments.len())
            .map(|seg| {
                let speed = network.segments[seg].speed_limit;
                geometry::minutes_at(network.segment_length(seg), speed)
            })
            .collect();
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_network() -> StreetNetwork {
        let step = geometry::equator_degrees_for(1000.0);
        let mut b = StreetNetwork::builder();
        for i in 0..3 {
            b.add_node(LatLon::new(0.0, i as f64 * step));
        }
        let street = b.add_street("King St");
        b.add_segment(SegmentInfo::new(0, 1, street, 60.0));
        b.add_segment(SegmentInfo::new(1, 2, street, 30.0).with_one_way(true));
        b.build().expect("valid network")
    }

    #[test]
    fn test_adjacency() {
        let map = line_network();
        assert_eq!(map.segments_at(0), &[0]);
        assert_eq!(map.segments_at(1), &[0, 1]);
        assert_eq!(map.segments_at(2), &[1]);
        assert_eq!(map.segment_count(), 2);
    }

    #[test]
    fn test_travel_time_cache() {
        let map = line_network();
        assert!((map.segment_travel_time(0) - 1.0).abs() < 1e-9);
        assert!((map.segment_travel_time(1) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_curved_segment_is_longer() {
        let step = geometry::equator_degrees_for(1000.0);
        let mut b = StreetNetwork::builder();
        let a = b.add_node(LatLon::new(0.0, 0.0));
        let c = b.add_node(LatLon::new(0.0, step));
        b.add_segment(
            SegmentInfo::new(a, c, 0, 60.0).with_curve_points(vec![LatLon::new(step, step / 2.0)]),
        );
        let map = b.build().expect("valid network");
        assert!(map.segment_length(0) > 1000.0);
        assert!(map.segment_travel_time(0) > 1.0);
    }

    #[test]
    fn test_nearest_node() {
        let map = line_network();
        let step = geometry::equator_degrees_for(1000.0);
        assert_eq!(map.nearest_node(LatLon::new(0.0, 1.1 * step)), Some(1));
        assert_eq!(map.nearest_node(LatLon::new(0.0, -5.0)), Some(0));
    }

    #[test]
    fn test_nearest_node_empty() {
        let map = StreetNetwork::builder().build().expect("empty network");
        assert_eq!(map.nearest_node(LatLon::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_segment_between() {
        let map = line_network();
        assert_eq!(map.segment_between(1, 0), Some(0));
        assert_eq!(map.segment_between(2, 1), Some(1));
        assert_eq!(map.segment_between(0, 2), None);
    }

    #[test]
    fn test_unknown_street_name() {
        let map = line_network();
        assert_eq!(map.street_name(0), "King St");
        assert_eq!(map.street_name(42), UNKNOWN_STREET);
    }

    #[test]
    fn test_rejects_unknown_endpoint() {
        let mut b = StreetNetwork::builder();
        b.add_node(LatLon::new(0.0, 0.0));
        b.add_segment(SegmentInfo::new(0, 3, 0, 50.0));
        assert_eq!(b.build().unwrap_err(), NetworkError::UnknownNode(3));
    }

    #[test]
    fn test_rejects_bad_speed() {
        let mut b = StreetNetwork::builder();
        b.add_node(LatLon::new(0.0, 0.0));
        b.add_node(LatLon::new(0.0, 0.1));
        b.add_segment(SegmentInfo::new(0, 1, 0, 0.0));
        assert_eq!(b.build().unwrap_err(), NetworkError::InvalidSpeedLimit(0.0));
    }

    #[test]
    fn test_rejects_nan_position() {
        let mut b = StreetNetwork::builder();
        b.add_node(LatLon::new(f64::NAN, 0.0));
        assert_eq!(b.build().unwrap_err(), NetworkError::InvalidPosition(0));
    }
}
