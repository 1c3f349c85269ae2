//! Nearest-neighbour construction of a precedence-feasible tour.
//!
//! # Algorithm
//!
//! Starting from a pickup, repeatedly append the closest stop (by the ranked
//! lists of the [`ProximityIndex`]) that still has to be visited and whose
//! predecessors are all in the tour. When no such stop is reachable from the
//! current tail, the closest stop that was never appended is taken instead,
//! which breaks precedence cycles at the cost of a later revisit. Depots are
//! chosen last: the one cheapest to leave for the first stop and the one
//! closest to the final stop.
//!
//! # Complexity
//!
//! O(N · S) for N appended stops and S stops per ranked list.
//!
//! # Reference
//!
//! Rosenkrantz, Stearns & Lewis (1977). "An Analysis of Several Heuristics
//! for the Traveling Salesman Problem", *SIAM J. Computing* 6(3).

use log::debug;

use crate::error::CourierError;
use crate::models::NodeId;
use crate::precedence::{InsertionTracker, PrecedenceTable};
use crate::proximity::ProximityIndex;

use super::Tour;

/// Builds the first tour of a search from a chosen pickup.
///
/// # Examples
///
/// ```
/// use u_courier::models::{DeliveryRequest, LatLon, SegmentInfo};
/// use u_courier::network::StreetNetwork;
/// use u_courier::pathfinding::ShortestPathEngine;
/// use u_courier::precedence::PrecedenceTable;
/// use u_courier::proximity::ProximityIndex;
/// use u_courier::tour::InitialTourBuilder;
///
/// let mut b = StreetNetwork::builder();
/// for i in 0..4 {
///     b.add_node(LatLon::new(0.0, i as f64 * 0.01));
/// }
/// for i in 0..3 {
///     b.add_segment(SegmentInfo::new(i, i + 1, 0, 50.0));
/// }
/// let map = b.build().unwrap();
///
/// let requests = [DeliveryRequest::new(3, 1)];
/// let engine = ShortestPathEngine::new(&map);
/// let proximity = ProximityIndex::build(&engine, &requests, &[0], 1).unwrap();
/// let table = PrecedenceTable::from_requests(&requests);
///
/// let tour = InitialTourBuilder::new(&table, &proximity).build(3).unwrap();
/// assert_eq!(tour.stops(), &[0, 3, 1, 0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InitialTourBuilder<'a> {
    table: &'a PrecedenceTable,
    proximity: &'a ProximityIndex,
}

impl<'a> InitialTourBuilder<'a> {
    /// Creates a builder over one problem's constraints and travel times.
    pub fn new(table: &'a PrecedenceTable, proximity: &'a ProximityIndex) -> Self {
        Self { table, proximity }
    }

    /// Builds a tour whose first interior stop is `start`, normally a
    /// pickup.
    ///
    /// Without requests the tour is `[depot, depot]` on the first depot.
    ///
    /// # Errors
    ///
    /// [`CourierError::NoDepots`] when the index holds no depot.
    pub fn build(&self, start: NodeId) -> Result<Tour<'a>, CourierError> {
        let fallback_depot = *self.proximity.depots().first().ok_or(CourierError::NoDepots)?;
        if self.table.is_empty() {
            return Ok(Tour::new(vec![fallback_depot, fallback_depot], self.table, self.proximity));
        }

        let start_depot = self.proximity.depot_before(start).unwrap_or(fallback_depot);
        let mut stops = vec![start_depot, start];
        let mut tracker = InsertionTracker::new(self.table);
        tracker.record_insert(start);

        let mut current = start;
        while !tracker.is_done() {
            let Some(next) = self.pick_next(&tracker, current) else {
                break;
            };
            stops.push(next);
            tracker.record_insert(next);
            current = next;
        }

        let end_depot = self.proximity.depot_after(current).unwrap_or(fallback_depot);
        stops.push(end_depot);

        let tour = Tour::new(stops, self.table, self.proximity);
        debug!(
            "initial tour from {}: {} stops, cost {:.2}",
            start,
            tour.len(),
            tour.cost()
        );
        Ok(tour)
    }

    fn pick_next(&self, tracker: &InsertionTracker<'_>, current: NodeId) -> Option<NodeId> {
        let ranked = (0..self.proximity.count_of_closest(current))
            .filter_map(|rank| self.proximity.closest_delivery(current, rank));

        let mut fresh = None;
        for node in ranked {
            if !tracker.needs_insertion(node) {
                continue;
            }
            if tracker.can_insert_once(node) {
                return Some(node);
            }
            if fresh.is_none() && !tracker.was_inserted(node) {
                fresh = Some(node);
            }
        }
        if fresh.is_some() {
            return fresh;
        }

        // Nothing pending is reachable in the ranked list.
        tracker
            .pending()
            .filter(|&node| tracker.can_insert_once(node) || !tracker.was_inserted(node))
            .min_by(|&a, &b| {
                let key = |node| (!tracker.can_insert_once(node), self.proximity.cost_between(current, node));
                let (once_a, cost_a) = key(a);
                let (once_b, cost_b) = key(b);
                once_a.cmp(&once_b).then(cost_a.total_cmp(&cost_b)).then(a.cmp(&b))
            })
    }
}
