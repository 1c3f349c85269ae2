//! Sparse travel times between the stops of one courier problem.
//!
//! # Algorithm
//!
//! Every distinct pickup, dropoff and depot intersection is a source. Sources
//! are dealt round-robin to a fixed pool of workers; each worker runs one
//! multi-target Dijkstra per source with its own [`SearchWorkspace`] and
//! fills private maps. A source search stops as soon as it has reached every
//! other stop, so on a large map only the neighbourhood spanned by the stops
//! is explored. The private maps cover disjoint sources and are merged after
//! the pool joins.
//!
//! Dijkstra finalizes targets cheapest first, so the neighbour lists come out
//! ranked without a separate sort.
//!
//! # Complexity
//!
//! O(S · (V + E) log V) worst case for S stops, split across the workers.
//!
//! [`SearchWorkspace`]: crate::pathfinding::SearchWorkspace

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use log::debug;

use crate::error::CourierError;
use crate::models::{DeliveryRequest, NodeId};
use crate::network::{geometry, MapService};
use crate::parallel;
use crate::pathfinding::ShortestPathEngine;

/// Travel times from one source.
type CostRow = HashMap<NodeId, f64>;

#[derive(Debug, Default)]
struct PartialIndex {
    costs: HashMap<NodeId, CostRow>,
    closest_deliveries: HashMap<NodeId, Vec<NodeId>>,
    closest_depots: HashMap<NodeId, Vec<NodeId>>,
}

/// Which stop roles each intersection plays.
struct StopRoles {
    delivery: Vec<bool>,
    depot: Vec<bool>,
    sources: Vec<NodeId>,
    depots: Vec<NodeId>,
}

impl StopRoles {
    fn classify<M: MapService + ?Sized>(
        map: &M,
        requests: &[DeliveryRequest],
        depots: &[NodeId],
    ) -> Result<Self, CourierError> {
        let n = map.node_count();
        let mut delivery = vec![false; n];
        let mut depot = vec![false; n];
        let mut sources = BTreeSet::new();
        let mut depot_list = Vec::new();

        for node in requests.iter().flat_map(|r| r.nodes()) {
            if node >= n {
                return Err(CourierError::UnknownNode(node));
            }
            delivery[node] = true;
            sources.insert(node);
        }
        for &node in depots {
            if node >= n {
                return Err(CourierError::UnknownNode(node));
            }
            if !depot[node] {
                depot_list.push(node);
            }
            depot[node] = true;
            sources.insert(node);
        }

        Ok(Self {
            delivery,
            depot,
            sources: sources.into_iter().collect(),
            depots: depot_list,
        })
    }

    fn is_stop(&self, node: NodeId) -> bool {
        self.delivery[node] || self.depot[node]
    }
}

/// Pairwise travel times and ranked neighbour lists among the stops.
///
/// Only pickup, dropoff and depot intersections are indexed. Lookups for any
/// other pair report `f64::INFINITY`.
///
/// # Examples
///
/// ```
/// use u_courier::models::{DeliveryRequest, LatLon, SegmentInfo};
/// use u_courier::network::StreetNetwork;
/// use u_courier::pathfinding::ShortestPathEngine;
/// use u_courier::proximity::ProximityIndex;
///
/// let mut b = StreetNetwork::builder();
/// for i in 0..3 {
///     b.add_node(LatLon::new(0.0, i as f64 * 0.01));
/// }
/// b.add_segment(SegmentInfo::new(0, 1, 0, 50.0));
/// b.add_segment(SegmentInfo::new(1, 2, 0, 50.0));
/// let map = b.build().unwrap();
///
/// let engine = ShortestPathEngine::new(&map);
/// let requests = [DeliveryRequest::new(1, 2)];
/// let index = ProximityIndex::build(&engine, &requests, &[0], 2).unwrap();
///
/// assert!(index.cost_between(0, 2) > index.cost_between(0, 1));
/// assert_eq!(index.closest_delivery(0, 0), Some(1));
/// assert_eq!(index.closest_depot(2, 0), Some(0));
/// assert_eq!(index.count_of_closest(0), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProximityIndex {
    costs: HashMap<NodeId, CostRow>,
    closest_deliveries: HashMap<NodeId, Vec<NodeId>>,
    closest_depots: HashMap<NodeId, Vec<NodeId>>,
    depots: Vec<NodeId>,
}

impl ProximityIndex {
    /// Computes road travel times between all stops on `num_threads` workers.
    ///
    /// # Errors
    ///
    /// [`CourierError::UnknownNode`] when a stop is outside the map and
    /// [`CourierError::ThreadPool`] when the worker pool cannot start.
    pub fn build<M: MapService + ?Sized>(
        engine: &ShortestPathEngine<'_, M>,
        requests: &[DeliveryRequest],
        depots: &[NodeId],
        num_threads: usize,
    ) -> Result<Self, CourierError> {
        let started = Instant::now();
        let roles = StopRoles::classify(engine.map(), requests, depots)?;
        let wanted = roles.sources.len().saturating_sub(1);
        let partitions = parallel::round_robin(roles.sources.iter().copied(), num_threads);

        let partials = parallel::run_jobs(num_threads, partitions, |_, sources| {
            let mut ws = engine.workspace();
            let mut part = PartialIndex::default();
            for source in sources {
                let found = engine.multi_target_costs(&mut ws, source, |n| roles.is_stop(n), wanted);
                let row = part.costs.entry(source).or_default();
                let near_deliveries = part.closest_deliveries.entry(source).or_default();
                let near_depots = part.closest_depots.entry(source).or_default();
                for (node, cost) in found {
                    row.insert(node, cost);
                    if roles.delivery[node] {
                        near_deliveries.push(node);
                    }
                    if roles.depot[node] {
                        near_depots.push(node);
                    }
                }
            }
            part
        })?;

        let mut index = Self {
            depots: roles.depots,
            ..Self::default()
        };
        for part in partials {
            index.costs.extend(part.costs);
            index.closest_deliveries.extend(part.closest_deliveries);
            index.closest_depots.extend(part.closest_depots);
        }

        debug!(
            "proximity index: {} stops on {} workers in {:?}",
            roles.sources.len(),
            num_threads,
            started.elapsed()
        );
        Ok(index)
    }

    /// Fills the index with straight-line travel times at the engine's
    /// heuristic speed instead of road searches.
    ///
    /// Every pair is connected, which makes this a cheap lower bound for
    /// quick estimates on maps where road searches are too costly.
    ///
    /// # Errors
    ///
    /// [`CourierError::UnknownNode`] when a stop is outside the map.
    pub fn straight_line<M: MapService + ?Sized>(
        engine: &ShortestPathEngine<'_, M>,
        requests: &[DeliveryRequest],
        depots: &[NodeId],
    ) -> Result<Self, CourierError> {
        let map = engine.map();
        let speed = engine.params().max_speed_kmh;
        let roles = StopRoles::classify(map, requests, depots)?;
        let mut index = Self::default();

        for &source in &roles.sources {
            let from = map.position_of(source);
            let mut found: Vec<(NodeId, f64)> = roles
                .sources
                .iter()
                .filter(|&&node| node != source)
                .map(|&node| {
                    let meters = map.distance(from, map.position_of(node));
                    (node, geometry::minutes_at(meters, speed))
                })
                .collect();
            found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

            index.costs.insert(source, found.iter().copied().collect());
            index.closest_deliveries.insert(
                source,
                found.iter().filter(|(n, _)| roles.delivery[*n]).map(|&(n, _)| n).collect(),
            );
            index.closest_depots.insert(
                source,
                found.iter().filter(|(n, _)| roles.depot[*n]).map(|&(n, _)| n).collect(),
            );
        }
        index.depots = roles.depots;
        Ok(index)
    }

    /// Travel time in minutes from `from` to `to`.
    ///
    /// Zero when both are the same intersection, `f64::INFINITY` when `to`
    /// is unreachable from `from` or either is not a stop.
    pub fn cost_between(&self, from: NodeId, to: NodeId) -> f64 {
        if from == to {
            return 0.0;
        }
        self.costs
            .get(&from)
            .and_then(|row| row.get(&to))
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// The `rank`-th closest pickup or dropoff reachable from `node`.
    pub fn closest_delivery(&self, node: NodeId, rank: usize) -> Option<NodeId> {
        self.closest_deliveries.get(&node)?.get(rank).copied()
    }

    /// The `rank`-th closest depot reachable from `node`.
    pub fn closest_depot(&self, node: NodeId, rank: usize) -> Option<NodeId> {
        self.closest_depots.get(&node)?.get(rank).copied()
    }

    /// Number of pickups and dropoffs reachable from `node`.
    pub fn count_of_closest(&self, node: NodeId) -> usize {
        self.closest_deliveries.get(&node).map_or(0, Vec::len)
    }

    /// Distinct depots in the order they were supplied.
    pub fn depots(&self) -> &[NodeId] {
        &self.depots
    }

    /// Depot to finish at after `node`: `node` itself when it is a depot,
    /// otherwise the closest depot reachable from it.
    pub fn depot_after(&self, node: NodeId) -> Option<NodeId> {
        if self.depots.contains(&node) {
            return Some(node);
        }
        self.closest_depot(node, 0)
    }

    /// Depot to start from before `node`: the depot with the cheapest trip
    /// to `node`, ties going to the earlier depot.
    pub fn depot_before(&self, node: NodeId) -> Option<NodeId> {
        self.depots
            .iter()
            .map(|&d| (d, self.cost_between(d, node)))
            .filter(|(_, c)| c.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(d, _)| d)
    }
}
