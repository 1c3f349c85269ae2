//! Improvement loops run by the optimizer workers.
//!
//! Every loop works on copies of a [`Tour`] and runs until the shared
//! [`SearchClock`] expires, always finishing at least one iteration. Tours
//! are compared with [`Tour::is_better_than`]: fewer disconnected legs
//! first, then lower travel time.
//!
//! - **Greedy**: swap two random windows of a fixed size, keep the copy if
//!   it is cheaper.
//! - **Two-opt**: [`perturb`] with a strength that shrinks with the time
//!   left, keep the copy if it is cheaper.
//! - **Annealing**: [`perturb`] with a strength that shrinks with the
//!   temperature; worse copies are accepted with probability
//!   `exp(-Δ / T)`, where `T` falls linearly from [`START_TEMPERATURE`] to
//!   zero over the budget.
//!
//! # Reference
//!
//! Kirkpatrick, S., Gelatt, C.D. & Vecchi, M.P. (1983). "Optimization by
//! Simulated Annealing", *Science* 220(4598), 671-680.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::tour::Tour;

use super::StrategyKind;

/// Annealing temperature when the search starts.
pub const START_TEMPERATURE: f64 = 10.0;

/// Perturbation strengths up to this value reverse a short window instead
/// of moving whole sections.
const LOCAL_MOVE: usize = 3;

/// Wall-clock budget shared by the workers of one solve.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchClock {
    started: Instant,
    budget: Duration,
}

impl SearchClock {
    pub(crate) fn new(started: Instant, budget: Duration) -> Self {
        Self { started, budget }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    /// Share of the budget still available, in `[0, 1]`.
    pub(crate) fn ratio_left(&self) -> f64 {
        if self.budget.is_zero() {
            return 0.0;
        }
        let used = self.started.elapsed().as_secs_f64() / self.budget.as_secs_f64();
        (1.0 - used).clamp(0.0, 1.0)
    }
}

/// Runs the loop selected by `kind` on `tour` and returns the best tour it
/// saw.
pub(crate) fn improve<'a, R: Rng + ?Sized>(
    kind: StrategyKind,
    tour: Tour<'a>,
    clock: &SearchClock,
    rng: &mut R,
) -> Tour<'a> {
    match kind {
        StrategyKind::Greedy(strength) => greedy(tour, strength, clock, rng),
        StrategyKind::TwoOpt(strength) => two_opt(tour, strength, clock, rng),
        StrategyKind::Annealing(strength) => annealing(tour, strength, clock, rng),
    }
}

fn greedy<'a, R: Rng + ?Sized>(mut best: Tour<'a>, strength: usize, clock: &SearchClock, rng: &mut R) -> Tour<'a> {
    loop {
        let mut candidate = best.clone();
        candidate.section_change(strength, rng);
        if candidate.is_better_than(&best) {
            best = candidate;
        }
        if clock.is_expired() {
            return best;
        }
    }
}

fn two_opt<'a, R: Rng + ?Sized>(mut best: Tour<'a>, strength: usize, clock: &SearchClock, rng: &mut R) -> Tour<'a> {
    let mut ratio = 1.0;
    loop {
        let mut candidate = best.clone();
        perturb(&mut candidate, ratio, strength, rng);
        if candidate.is_better_than(&best) {
            best = candidate;
        }
        if clock.is_expired() {
            return best;
        }
        ratio = clock.ratio_left();
    }
}

fn annealing<'a, R: Rng + ?Sized>(mut best: Tour<'a>, strength: usize, clock: &SearchClock, rng: &mut R) -> Tour<'a> {
    let mut current = best.clone();
    let mut temperature = START_TEMPERATURE;
    loop {
        let mut candidate = current.clone();
        perturb(&mut candidate, temperature / START_TEMPERATURE, strength, rng);
        let delta = cost_delta(&candidate, &current);

        if delta < 0.0 {
            current = candidate;
            if current.is_better_than(&best) {
                best = current.clone();
            }
        } else if accepts_worse(delta, temperature, rng) {
            current = candidate;
        }

        if clock.is_expired() {
            return best;
        }
        temperature = clock.ratio_left() * START_TEMPERATURE;
    }
}

/// Travel time change from `current` to `candidate`; infinite when the
/// number of disconnected legs changes.
fn cost_delta(candidate: &Tour<'_>, current: &Tour<'_>) -> f64 {
    match candidate.disconnected_legs().cmp(&current.disconnected_legs()) {
        Ordering::Less => f64::NEG_INFINITY,
        Ordering::Greater => f64::INFINITY,
        Ordering::Equal => candidate.travel_time() - current.travel_time(),
    }
}

/// Metropolis test for a non-improving move.
fn accepts_worse<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if !delta.is_finite() || temperature <= 0.0 {
        return false;
    }
    rng.random::<f64>() < (-delta / temperature).exp()
}

/// Applies one random move whose size scales with `ratio` in `[0, 1]`.
///
/// The base strength is `ratio * max_strength + 1`, randomly shifted up or
/// down by less than itself. Small strengths reverse a window of 2 to 5
/// stops; larger ones swap two windows of that size, or trade the windows
/// around a pivot.
pub(crate) fn perturb<R: Rng + ?Sized>(tour: &mut Tour<'_>, ratio: f64, max_strength: usize, rng: &mut R) -> bool {
    let base = (ratio.clamp(0.0, 1.0) * max_strength as f64) as usize + 1;
    let shift = rng.random_range(0..base);
    let strength = if rng.random_bool(0.5) { base - shift } else { base + shift };

    if strength <= LOCAL_MOVE {
        let k = rng.random_range(2..=5);
        tour.reverse_section(k, rng)
    } else if rng.random_bool(0.5) {
        tour.section_change(strength, rng)
    } else {
        tour.swap_reverse_section(strength, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryRequest;
    use crate::pathfinding::ShortestPathEngine;
    use crate::precedence::PrecedenceTable;
    use crate::proximity::ProximityIndex;
    use crate::test_support::{line_network, line_network_with_isolated, one_way_network};
    use crate::tour::{InitialTourBuilder, PositionIndex};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem() -> (PrecedenceTable, ProximityIndex) {
        let map = line_network(12);
        let requests = [
            DeliveryRequest::new(9, 2),
            DeliveryRequest::new(3, 11),
            DeliveryRequest::new(7, 1),
            DeliveryRequest::new(4, 8),
            DeliveryRequest::new(10, 5),
            DeliveryRequest::new(6, 3),
        ];
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0], 2).expect("build");
        (PrecedenceTable::from_requests(&requests), proximity)
    }

    fn clock(millis: u64) -> SearchClock {
        SearchClock::new(Instant::now(), Duration::from_millis(millis))
    }

    #[test]
    fn test_clock() {
        let expired = clock(0);
        assert!(expired.is_expired());
        assert_eq!(expired.ratio_left(), 0.0);

        let fresh = SearchClock::new(Instant::now(), Duration::from_secs(3600));
        assert!(!fresh.is_expired());
        assert!(fresh.ratio_left() > 0.99);
    }

    #[test]
    fn test_accepts_worse() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!accepts_worse(1.0, 0.0, &mut rng));
        assert!(!accepts_worse(f64::INFINITY, 10.0, &mut rng));
        assert!(!accepts_worse(f64::NAN, 10.0, &mut rng));
        // exp(-1e-9 / 10) is within a hair of one.
        let accepted = (0..100).filter(|_| accepts_worse(1e-9, 10.0, &mut rng)).count();
        assert!(accepted > 95);
        let accepted = (0..100).filter(|_| accepts_worse(1e6, 0.1, &mut rng)).count();
        assert_eq!(accepted, 0);
    }

    #[test]
    fn test_cost_delta_ranks_connectivity_first() {
        let map = line_network_with_isolated(4, 1);
        let requests = [DeliveryRequest::new(1, 3), DeliveryRequest::new(4, 4)];
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0], 1).expect("build");
        let table = PrecedenceTable::from_requests(&requests);

        let broken = Tour::new(vec![0, 1, 4, 3, 0], &table, &proximity);
        let longer_broken = Tour::new(vec![0, 4, 1, 3, 0], &table, &proximity);
        let connected = Tour::new(vec![0, 1, 3, 0], &table, &proximity);

        assert_eq!(cost_delta(&connected, &broken), f64::NEG_INFINITY);
        assert_eq!(cost_delta(&broken, &connected), f64::INFINITY);
        // Same number of broken legs: compare the connected travel time.
        let delta = cost_delta(&longer_broken, &broken);
        assert!((delta - (longer_broken.travel_time() - broken.travel_time())).abs() < 1e-9);
        assert!(delta.is_finite());
    }

    #[test]
    fn test_annealing_leaves_broken_tour() {
        let map = one_way_network();
        let requests = [DeliveryRequest::new(1, 5), DeliveryRequest::new(2, 3)];
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0, 4], 1).expect("build");
        let table = PrecedenceTable::from_requests(&requests);

        let initial = InitialTourBuilder::new(&table, &proximity).build(1).expect("tour");
        assert_eq!(initial.stops(), &[0, 1, 5, 2, 3, 4]);
        assert!(!initial.is_routable());

        let mut rng = StdRng::seed_from_u64(8);
        let result = improve(StrategyKind::Annealing(5), initial, &clock(200), &mut rng);
        assert!(result.is_routable());
        assert_eq!(result.stops(), &[0, 1, 2, 3, 5, 4]);
        assert!((result.cost() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_perturb_keeps_invariants() {
        let (table, proximity) = problem();
        let mut tour = InitialTourBuilder::new(&table, &proximity).build(9).expect("tour");
        let mut rng = StdRng::seed_from_u64(11);
        for step in 0..300 {
            let ratio = 1.0 - step as f64 / 300.0;
            perturb(&mut tour, ratio, 6, &mut rng);
            assert!(tour.satisfies_precedence());
            assert_eq!(tour.position_index(), &PositionIndex::from_stops(tour.stops()));
        }
    }

    #[test]
    fn test_strategies_never_get_worse() {
        let (table, proximity) = problem();
        let initial = InitialTourBuilder::new(&table, &proximity).build(9).expect("tour");
        let kinds = [
            StrategyKind::Greedy(1),
            StrategyKind::Greedy(4),
            StrategyKind::TwoOpt(5),
            StrategyKind::Annealing(6),
        ];
        for (i, kind) in kinds.into_iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(i as u64);
            let result = improve(kind, initial.clone(), &clock(40), &mut rng);
            assert!(result.cost() <= initial.cost(), "{kind:?}");
            assert!(result.satisfies_precedence(), "{kind:?}");
            let mut fresh = result.clone();
            fresh.recompute_cost();
            assert!((fresh.cost() - result.cost()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_expired_clock_runs_once() {
        let (table, proximity) = problem();
        let initial = InitialTourBuilder::new(&table, &proximity).build(9).expect("tour");
        let mut rng = StdRng::seed_from_u64(5);
        let result = improve(StrategyKind::Annealing(5), initial.clone(), &clock(0), &mut rng);
        assert!(result.cost() <= initial.cost());
    }
}
