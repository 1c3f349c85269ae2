//! Portfolio optimizer for one courier problem.
//!
//! # Algorithm
//!
//! 1. Precompute travel times between all stops ([`ProximityIndex`]).
//! 2. Build one initial tour per worker, starting from the worker's own
//!    pickup where there are enough requests.
//! 3. Run every worker's improvement loop in parallel until the shared
//!    search budget runs out.
//! 4. Keep the tour with the fewest disconnected legs, cheapest first, and
//!    expand each consecutive stop pair into street segments with A*.
//!
//! Workers share nothing but read-only problem data; each owns its tour and
//! a random generator seeded from `seed + worker index`.

use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::CourierError;
use crate::models::{CourierSolution, DeliveryRequest, NodeId, SegmentId};
use crate::network::MapService;
use crate::parallel;
use crate::pathfinding::ShortestPathEngine;
use crate::precedence::PrecedenceTable;
use crate::proximity::ProximityIndex;
use crate::tour::{InitialTourBuilder, Tour};

use super::strategy::{self, SearchClock};
use super::SolverConfig;

/// Parallel portfolio search for the cheapest precedence-feasible route.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_courier::models::{DeliveryRequest, LatLon, SegmentInfo};
/// use u_courier::network::StreetNetwork;
/// use u_courier::optimizer::{ParallelOptimizer, SolverConfig};
///
/// let mut b = StreetNetwork::builder();
/// for i in 0..4 {
///     b.add_node(LatLon::new(0.0, i as f64 * 0.01));
/// }
/// let street = b.add_street("Main St");
/// for i in 0..3 {
///     b.add_segment(SegmentInfo::new(i, i + 1, street, 50.0));
/// }
/// let map = b.build().unwrap();
///
/// let config = SolverConfig::default().with_time_limit(Duration::from_millis(100));
/// let optimizer = ParallelOptimizer::new(&map, config);
/// let solution = optimizer.solve(&[DeliveryRequest::new(3, 1)], &[0]).unwrap();
///
/// assert_eq!(solution.stops(), &[0, 3, 1, 0]);
/// assert_eq!(solution.route(), &[0, 1, 2, 2, 1, 0]);
/// ```
pub struct ParallelOptimizer<'a, M: MapService + ?Sized> {
    map: &'a M,
    config: SolverConfig,
}

impl<'a, M: MapService + ?Sized> ParallelOptimizer<'a, M> {
    /// Creates an optimizer over `map`.
    pub fn new(map: &'a M, config: SolverConfig) -> Self {
        Self { map, config }
    }

    /// Current configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Finds a route serving every request, starting and ending at depots.
    ///
    /// Without requests the solution is the first depot on its own. When
    /// some stop cannot be reached from the previous one the solution has
    /// an infinite cost and an empty route.
    ///
    /// # Errors
    ///
    /// - [`CourierError::InvalidConfig`] when the configuration is rejected
    /// - [`CourierError::NoDepots`] when `depots` is empty
    /// - [`CourierError::UnknownNode`] when a stop is outside the map
    /// - [`CourierError::ThreadPool`] when a worker pool cannot start
    pub fn solve(&self, deliveries: &[DeliveryRequest], depots: &[NodeId]) -> Result<CourierSolution, CourierError> {
        let started = Instant::now();
        self.config.validate()?;
        let &first_depot = depots.first().ok_or(CourierError::NoDepots)?;
        self.check_nodes(deliveries, depots)?;

        let Some(first_request) = deliveries.first() else {
            return Ok(CourierSolution::new(vec![first_depot, first_depot], 0.0, Vec::new()));
        };

        let engine = ShortestPathEngine::new(self.map).with_params(self.config.search);
        let proximity = ProximityIndex::build(&engine, deliveries, depots, self.config.num_threads)?;
        let table = PrecedenceTable::from_requests(deliveries);

        let builder = InitialTourBuilder::new(&table, &proximity);
        let jobs = self
            .config
            .portfolio
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let start = deliveries.get(i).unwrap_or(first_request).pickup;
                builder.build(start).map(|tour| (kind, tour))
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "{} initial tours ready after {:?}",
            jobs.len(),
            started.elapsed()
        );

        let clock = SearchClock::new(started, self.config.search_budget());
        let seed = self.config.seed;
        let tours = parallel::run_jobs(jobs.len(), jobs, |i, (kind, tour)| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let tour = strategy::improve(kind, tour, &clock, &mut rng);
            debug!(
                "worker {i} {kind:?}: cost {:.3}, {} disconnected legs",
                tour.travel_time(),
                tour.disconnected_legs()
            );
            tour
        })?;

        let best = select_best(tours).ok_or(CourierError::InvalidConfig("portfolio must not be empty"))?;
        let stops = best.stops().to_vec();
        if !best.is_routable() {
            warn!(
                "no connected route through {} stops ({} disconnected legs)",
                stops.len(),
                best.disconnected_legs()
            );
            return Ok(CourierSolution::unroutable(stops));
        }

        let route = expand(&engine, &stops);
        info!(
            "courier route: {} stops, {} segments, {:.3} min in {:?}",
            stops.len(),
            route.len(),
            best.cost(),
            started.elapsed()
        );
        Ok(CourierSolution::new(stops, best.cost(), route))
    }

    fn check_nodes(&self, deliveries: &[DeliveryRequest], depots: &[NodeId]) -> Result<(), CourierError> {
        let n = self.map.node_count();
        deliveries
            .iter()
            .flat_map(|r| r.nodes())
            .chain(depots.iter().copied())
            .find(|&node| node >= n)
            .map_or(Ok(()), |node| Err(CourierError::UnknownNode(node)))
    }
}

/// Best tour by [`Tour::is_better_than`]; ties go to the earliest worker.
fn select_best(tours: Vec<Tour<'_>>) -> Option<Tour<'_>> {
    tours
        .into_iter()
        .reduce(|best, tour| if tour.is_better_than(&best) { tour } else { best })
}

/// Concatenates the fastest paths between consecutive stops.
fn expand<M: MapService + ?Sized>(engine: &ShortestPathEngine<'_, M>, stops: &[NodeId]) -> Vec<SegmentId> {
    let mut ws = engine.workspace();
    let mut route = Vec::new();
    for pair in stops.windows(2) {
        route.extend(engine.find_path_with(&mut ws, pair[0], pair[1]));
    }
    route
}

/// Solves a courier problem and returns the route as street segments.
///
/// Shorthand for [`ParallelOptimizer::solve`] followed by
/// [`CourierSolution::into_route`]. The route is empty when there are no
/// requests or no connected route exists.
///
/// # Errors
///
/// As for [`ParallelOptimizer::solve`].
pub fn solve_courier<M: MapService + ?Sized>(
    map: &M,
    deliveries: &[DeliveryRequest],
    depots: &[NodeId],
    config: &SolverConfig,
) -> Result<Vec<SegmentId>, CourierError> {
    ParallelOptimizer::new(map, config.clone())
        .solve(deliveries, depots)
        .map(CourierSolution::into_route)
}
