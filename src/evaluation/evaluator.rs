//! Legality checks for stop sequences and segment routes.

use std::collections::HashMap;

use crate::models::{DeliveryRequest, NodeId, SegmentId, Violation, ViolationType};
use crate::network::MapService;

/// Checks courier routes against the requests and depots of one problem,
/// independently of how the route was produced.
///
/// A request is served when some visit to its pickup comes strictly before
/// some visit to its dropoff. A request whose pickup and dropoff coincide is
/// served by a single visit.
///
/// # Examples
///
/// ```
/// use u_courier::models::{DeliveryRequest, LatLon, SegmentInfo};
/// use u_courier::network::StreetNetwork;
/// use u_courier::evaluation::RouteEvaluator;
///
/// let mut b = StreetNetwork::builder();
/// for i in 0..3 {
///     b.add_node(LatLon::new(0.0, i as f64 * 0.01));
/// }
/// b.add_segment(SegmentInfo::new(0, 1, 0, 50.0));
/// b.add_segment(SegmentInfo::new(1, 2, 0, 50.0));
/// let map = b.build().unwrap();
///
/// let requests = [DeliveryRequest::new(1, 2)];
/// let evaluator = RouteEvaluator::new(&map, &requests, &[0]);
/// assert!(evaluator.check_stops(&[0, 1, 2, 0]).is_empty());
/// assert!(evaluator.check_route(0, &[0, 1, 1, 0]).is_empty());
/// assert_eq!(evaluator.check_stops(&[0, 2, 1, 0]).len(), 1);
/// ```
pub struct RouteEvaluator<'a, M: MapService + ?Sized> {
    map: &'a M,
    requests: &'a [DeliveryRequest],
    depots: &'a [NodeId],
}

impl<'a, M: MapService + ?Sized> RouteEvaluator<'a, M> {
    /// Creates a new evaluator for the given problem data.
    pub fn new(map: &'a M, requests: &'a [DeliveryRequest], depots: &'a [NodeId]) -> Self {
        Self { map, requests, depots }
    }

    /// Checks a visiting order that includes its depot slots.
    pub fn check_stops(&self, stops: &[NodeId]) -> Vec<Violation> {
        let mut violations = self.endpoint_violations(stops.first(), stops.last());
        violations.extend(self.request_violations(stops));
        violations
    }

    /// Checks a segment route driven from `start`.
    ///
    /// Driving stops at the first segment that does not touch the current
    /// intersection; requests are judged on the intersections reached until
    /// then.
    pub fn check_route(&self, start: NodeId, route: &[SegmentId]) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut visited = vec![start];
        let mut node = start;

        for (position, &segment) in route.iter().enumerate() {
            let info = self.map.segment_info(segment);
            let next = if info.from == node {
                info.to
            } else if info.to == node {
                if info.one_way {
                    violations.push(Violation::new(ViolationType::WrongWay { position, segment }));
                }
                info.from
            } else {
                violations.push(Violation::new(ViolationType::Disconnected { position, segment }));
                break;
            };
            visited.push(next);
            node = next;
        }

        let mut all = self.endpoint_violations(Some(&start), visited.last());
        all.append(&mut violations);
        all.extend(self.request_violations(&visited));
        all
    }

    fn endpoint_violations(&self, first: Option<&NodeId>, last: Option<&NodeId>) -> Vec<Violation> {
        let mut violations = Vec::new();
        if let Some(&node) = first {
            if !self.depots.contains(&node) {
                violations.push(Violation::new(ViolationType::StartNotDepot { node }));
            }
        }
        if let Some(&node) = last {
            if !self.depots.contains(&node) {
                violations.push(Violation::new(ViolationType::EndNotDepot { node }));
            }
        }
        violations
    }

    fn request_violations(&self, sequence: &[NodeId]) -> Vec<Violation> {
        let mut first: HashMap<NodeId, usize> = HashMap::new();
        let mut last: HashMap<NodeId, usize> = HashMap::new();
        for (pos, &node) in sequence.iter().enumerate() {
            first.entry(node).or_insert(pos);
            last.insert(node, pos);
        }

        let mut violations = Vec::new();
        for (request_index, req) in self.requests.iter().enumerate() {
            let mut missing = false;
            for (i, node) in req.nodes().into_iter().enumerate() {
                let repeated = i == 1 && req.pickup == req.dropoff;
                if !repeated && !first.contains_key(&node) {
                    violations.push(Violation::new(ViolationType::StopNotVisited { request_index, node }));
                    missing = true;
                }
            }
            if missing || req.pickup == req.dropoff {
                continue;
            }
            if first[&req.pickup] >= last[&req.dropoff] {
                violations.push(Violation::new(ViolationType::PrecedenceViolated {
                    request_index,
                    pickup: req.pickup,
                    dropoff: req.dropoff,
                }));
            }
        }
        violations
    }
}
