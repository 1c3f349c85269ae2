//! Visiting order with validated in-place moves.
//!
//! # Moves
//!
//! Every move is a permutation of interior positions, expressed as a list of
//! `(from, to)` position pairs, and runs through one transactional step:
//!
//! 1. move the affected ids in the [`PositionIndex`] to their tentative
//!    positions (all removals first, then all insertions, so duplicate ids
//!    never clobber each other);
//! 2. check every moved id against the [`PrecedenceTable`];
//! 3. on success write the ids into the stop sequence, re-pick the start or
//!    end depot when the first or last interior slot changed, and recompute
//!    the cost; on failure undo step 1 and leave the stops untouched.
//!
//! The random operators retry with fresh positions up to a fixed number of
//! attempts and report whether any attempt was accepted.
//!
//! # Cost
//!
//! A tour is scored by the number of stop pairs with no road between them,
//! then by the travel time of the connected pairs. Keeping both parts finite
//! lets search move a tour with a broken leg towards a connected one.

use std::cmp::Ordering;

use rand::Rng;

use crate::models::NodeId;
use crate::precedence::PrecedenceTable;
use crate::proximity::ProximityIndex;

use super::PositionIndex;

/// Attempts made by [`Tour::minor_change_adjacent`].
pub const MAX_MINOR_ATTEMPTS: usize = 30;

/// Attempts made by the window-based operators.
pub const MAX_SECTION_ATTEMPTS: usize = 30;

/// How [`Tour::swap_reverse_section_at`] rearranges the two windows around
/// its pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapVariant {
    /// The left window moves right, reversed; the right window moves left.
    ReverseLeft,
    /// The left window moves right; the right window moves left, reversed.
    ReverseRight,
    /// The windows trade places unchanged.
    Plain,
}

/// A candidate route `[start_depot, stops.., end_depot]` with its position
/// index and estimated travel time.
///
/// # Examples
///
/// ```
/// use u_courier::models::{DeliveryRequest, LatLon, SegmentInfo};
/// use u_courier::network::StreetNetwork;
/// use u_courier::pathfinding::ShortestPathEngine;
/// use u_courier::precedence::PrecedenceTable;
/// use u_courier::proximity::ProximityIndex;
/// use u_courier::tour::Tour;
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
/// let requests = [DeliveryRequest::new(1, 2), DeliveryRequest::new(3, 2)];
/// let engine = ShortestPathEngine::new(&map);
/// let proximity = ProximityIndex::build(&engine, &requests, &[0], 2).unwrap();
/// let table = PrecedenceTable::from_requests(&requests);
///
/// let mut tour = Tour::new(vec![0, 1, 3, 2, 0], &table, &proximity);
/// // 2 must stay after both 1 and 3.
/// assert!(!tour.swap_adjacent_at(2));
/// assert!(tour.swap_adjacent_at(1));
/// assert_eq!(tour.stops(), &[0, 3, 1, 2, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Tour<'a> {
    stops: Vec<NodeId>,
    index: PositionIndex,
    travel_time: f64,
    disconnected: usize,
    table: &'a PrecedenceTable,
    proximity: &'a ProximityIndex,
}

impl<'a> Tour<'a> {
    /// Wraps a stop sequence that already includes both depot slots.
    pub fn new(stops: Vec<NodeId>, table: &'a PrecedenceTable, proximity: &'a ProximityIndex) -> Self {
        let index = PositionIndex::from_stops(&stops);
        let mut tour = Self {
            stops,
            index,
            travel_time: 0.0,
            disconnected: 0,
            table,
            proximity,
        };
        tour.recompute_cost();
        tour
    }

    /// Full visiting order including the depot slots.
    pub fn stops(&self) -> &[NodeId] {
        &self.stops
    }

    /// Visiting order without the depot slots.
    pub fn interior(&self) -> &[NodeId] {
        if self.stops.len() < 2 {
            return &[];
        }
        &self.stops[1..self.stops.len() - 1]
    }

    /// Estimated travel time in minutes, or infinity when some consecutive
    /// stops are not connected.
    pub fn cost(&self) -> f64 {
        if self.disconnected == 0 {
            self.travel_time
        } else {
            f64::INFINITY
        }
    }

    /// Travel time over the connected consecutive stop pairs only.
    pub fn travel_time(&self) -> f64 {
        self.travel_time
    }

    /// Number of consecutive stop pairs with no road between them.
    pub fn disconnected_legs(&self) -> usize {
        self.disconnected
    }

    /// Orders tours by disconnected legs, then by travel time.
    pub fn compare(&self, other: &Tour<'_>) -> Ordering {
        self.disconnected
            .cmp(&other.disconnected)
            .then_with(|| self.travel_time.total_cmp(&other.travel_time))
    }

    /// Returns `true` if this tour is strictly better than `other`.
    pub fn is_better_than(&self, other: &Tour<'_>) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Interior positions of every stop.
    pub fn position_index(&self) -> &PositionIndex {
        &self.index
    }

    /// Number of slots including the depots.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if there are no slots at all.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Returns `true` if every consecutive stop pair is connected.
    pub fn is_routable(&self) -> bool {
        self.disconnected == 0
    }

    /// Strict precedence check of the whole sequence.
    pub fn satisfies_precedence(&self) -> bool {
        self.table.satisfied_by(&self.stops)
    }

    /// Recomputes the cost from scratch over consecutive stop pairs.
    pub fn recompute_cost(&mut self) {
        let mut travel_time = 0.0;
        let mut disconnected = 0;
        for w in self.stops.windows(2) {
            let leg = self.proximity.cost_between(w[0], w[1]);
            if leg.is_finite() {
                travel_time += leg;
            } else {
                disconnected += 1;
            }
        }
        self.travel_time = travel_time;
        self.disconnected = disconnected;
    }

    fn interior_len(&self) -> usize {
        self.stops.len().saturating_sub(2)
    }

    /// Last interior position.
    fn last_interior(&self) -> usize {
        self.stops.len().saturating_sub(2)
    }

    /// Returns `true` if `[pos, pos + k)` lies inside the interior.
    fn window_fits(&self, pos: usize, k: usize) -> bool {
        k > 0 && pos >= 1 && pos + k - 1 <= self.last_interior()
    }

    /// Applies the permutation `moves` if every moved id stays valid.
    fn apply(&mut self, moves: &[(usize, usize)]) -> bool {
        let ids: Vec<NodeId> = moves.iter().map(|&(from, _)| self.stops[from]).collect();

        for (&(from, _), &id) in moves.iter().zip(&ids) {
            self.index.remove(id, from);
        }
        for (&(_, to), &id) in moves.iter().zip(&ids) {
            self.index.insert(id, to);
        }

        let mut touched = ids.clone();
        touched.sort_unstable();
        touched.dedup();
        if !self.table.all_valid(&touched, &self.index) {
            for (&(_, to), &id) in moves.iter().zip(&ids) {
                self.index.remove(id, to);
            }
            for (&(from, _), &id) in moves.iter().zip(&ids) {
                self.index.insert(id, from);
            }
            return false;
        }

        for (&(_, to), &id) in moves.iter().zip(&ids) {
            self.stops[to] = id;
        }
        let last = self.last_interior();
        if moves.iter().any(|&(_, to)| to == 1) {
            self.refresh_start_depot();
        }
        if moves.iter().any(|&(_, to)| to == last) {
            self.refresh_end_depot();
        }
        self.recompute_cost();
        true
    }

    fn refresh_start_depot(&mut self) {
        if let Some(depot) = self.proximity.depot_before(self.stops[1]) {
            self.stops[0] = depot;
        }
    }

    fn refresh_end_depot(&mut self) {
        let last = self.last_interior();
        if let Some(depot) = self.proximity.depot_after(self.stops[last]) {
            self.stops[last + 1] = depot;
        }
    }

    /// Swaps the interior stops at `pos` and `pos + 1`.
    pub fn swap_adjacent_at(&mut self, pos: usize) -> bool {
        if !self.window_fits(pos, 2) {
            return false;
        }
        self.apply(&[(pos, pos + 1), (pos + 1, pos)])
    }

    /// Swaps the length-`k` windows starting at `pos1` and `pos2`.
    pub fn section_swap_at(&mut self, pos1: usize, pos2: usize, k: usize) -> bool {
        if !self.window_fits(pos1, k) || !self.window_fits(pos2, k) || pos1.abs_diff(pos2) < k {
            return false;
        }
        let moves: Vec<_> = (0..k)
            .flat_map(|i| [(pos1 + i, pos2 + i), (pos2 + i, pos1 + i)])
            .collect();
        self.apply(&moves)
    }

    /// Reverses the length-`k` window starting at `pos`.
    pub fn reverse_section_at(&mut self, pos: usize, k: usize) -> bool {
        if k < 2 || !self.window_fits(pos, k) {
            return false;
        }
        let moves: Vec<_> = (0..k)
            .filter(|&i| 2 * i + 1 != k)
            .map(|i| (pos + i, pos + k - 1 - i))
            .collect();
        self.apply(&moves)
    }

    /// Trades the length-`k` windows on either side of `pivot`, which
    /// itself stays in place.
    pub fn swap_reverse_section_at(&mut self, pivot: usize, k: usize, variant: SwapVariant) -> bool {
        if k == 0 || pivot < k || !self.window_fits(pivot - k, k) || !self.window_fits(pivot + 1, k) {
            return false;
        }
        let moves: Vec<_> = (0..k)
            .flat_map(|i| {
                let left = pivot - k + i;
                let right = pivot + 1 + i;
                match variant {
                    SwapVariant::ReverseLeft => [(left, pivot + k - i), (right, left)],
                    SwapVariant::ReverseRight => [(left, right), (right, pivot - 1 - i)],
                    SwapVariant::Plain => [(left, right), (right, left)],
                }
            })
            .collect();
        self.apply(&moves)
    }

    /// Swaps two random adjacent interior stops.
    pub fn minor_change_adjacent<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.interior_len() < 2 {
            return false;
        }
        let upper = self.last_interior();
        (0..MAX_MINOR_ATTEMPTS).any(|_| {
            let pos = rng.random_range(1..upper);
            self.swap_adjacent_at(pos)
        })
    }

    /// Swaps two random non-overlapping length-`k` windows.
    pub fn section_change<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> bool {
        if k == 0 || self.interior_len() < 2 * k {
            return false;
        }
        let upper = self.stops.len() - k;
        (0..MAX_SECTION_ATTEMPTS).any(|_| {
            let (pos1, pos2) = loop {
                let a = rng.random_range(1..upper);
                let b = rng.random_range(1..upper);
                if a.abs_diff(b) >= k {
                    break (a, b);
                }
            };
            self.section_swap_at(pos1, pos2, k)
        })
    }

    /// Reverses a random length-`k` window.
    pub fn reverse_section<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> bool {
        if k < 2 || self.interior_len() < k {
            return false;
        }
        let upper = self.stops.len() - k;
        (0..MAX_SECTION_ATTEMPTS).any(|_| {
            let pos = rng.random_range(1..upper);
            self.reverse_section_at(pos, k)
        })
    }

    /// Trades the two length-`k` windows around a random pivot, reversing
    /// one of them half of the time.
    pub fn swap_reverse_section<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> bool {
        if k == 0 || self.interior_len() < 2 * k + 1 {
            return false;
        }
        let upper = self.stops.len() - k - 1;
        (0..MAX_SECTION_ATTEMPTS).any(|_| {
            let pivot = rng.random_range(k + 1..upper);
            let variant = match rng.random_range(0..4) {
                0 => SwapVariant::ReverseLeft,
                1 => SwapVariant::ReverseRight,
                _ => SwapVariant::Plain,
            };
            self.swap_reverse_section_at(pivot, k, variant)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryRequest;
    use crate::pathfinding::ShortestPathEngine;
    use crate::test_support::{line_network, line_network_with_isolated};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    struct Fixture {
        table: PrecedenceTable,
        proximity: ProximityIndex,
    }

    /// Ten stops on the line graph with depot 0 and a mix of shared nodes.
    fn fixture() -> Fixture {
        let map = line_network(10);
        let requests = [
            DeliveryRequest::new(1, 2),
            DeliveryRequest::new(4, 5),
            DeliveryRequest::new(3, 9),
            DeliveryRequest::new(7, 6),
            DeliveryRequest::new(8, 4),
        ];
        let engine = ShortestPathEngine::new(&map);
        Fixture {
            table: PrecedenceTable::from_requests(&requests),
            proximity: ProximityIndex::build(&engine, &requests, &[0], 2).expect("build"),
        }
    }

    fn check_invariants(tour: &Tour<'_>) {
        assert!(tour.satisfies_precedence());
        assert_eq!(tour.position_index(), &PositionIndex::from_stops(tour.stops()));
        let mut fresh = tour.clone();
        fresh.recompute_cost();
        assert!((fresh.cost() - tour.cost()).abs() < 1e-9);
    }

    #[test]
    fn test_new_computes_cost() {
        let f = fixture();
        let tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
        let expected = 1.0 + 1.0 + 6.0 + 4.0 + 1.0 + 2.0 + 6.0 + 2.0 + 1.0 + 6.0;
        assert!((tour.cost() - expected).abs() < 1e-6);
        assert_eq!(tour.interior().len(), 9);
        check_invariants(&tour);
    }

    #[test]
    fn test_disconnected_legs_are_counted() {
        // 4 and 5 have no segments.
        let map = line_network_with_isolated(4, 2);
        let requests = [
            DeliveryRequest::new(1, 4),
            DeliveryRequest::new(2, 3),
            DeliveryRequest::new(5, 5),
        ];
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0], 2).expect("build");
        let table = PrecedenceTable::from_requests(&requests);

        let one = Tour::new(vec![0, 1, 4, 2, 3, 0], &table, &proximity);
        assert_eq!(one.disconnected_legs(), 2);
        assert!(!one.is_routable());
        assert_eq!(one.cost(), f64::INFINITY);
        assert!((one.travel_time() - (1.0 + 1.0 + 3.0)).abs() < 1e-6);

        let two = Tour::new(vec![0, 4, 1, 2, 3, 5, 0], &table, &proximity);
        assert_eq!(two.disconnected_legs(), 4);
        assert!(one.is_better_than(&two));
        assert!(!two.is_better_than(&one));

        let connected = Tour::new(vec![0, 1, 2, 3, 0], &table, &proximity);
        assert!(connected.is_routable());
        assert!(connected.is_better_than(&one));
        assert_eq!(connected.compare(&connected.clone()), Ordering::Equal);
    }

    #[test]
    fn test_depot_only() {
        let f = fixture();
        let mut tour = Tour::new(vec![0, 0], &f.table, &f.proximity);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(tour.cost(), 0.0);
        assert!(tour.interior().is_empty());
        assert!(!tour.minor_change_adjacent(&mut rng));
        assert!(!tour.section_change(1, &mut rng));
        assert!(!tour.reverse_section(2, &mut rng));
        assert!(!tour.swap_reverse_section(1, &mut rng));
    }

    #[test]
    fn test_rejected_move_rolls_back() {
        let f = fixture();
        let mut tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
        let before = tour.clone();
        // 1 before 2 would break.
        assert!(!tour.swap_adjacent_at(1));
        assert_eq!(tour.stops(), before.stops());
        assert_eq!(tour.position_index(), before.position_index());
        assert_eq!(tour.cost(), before.cost());
    }

    #[test]
    fn test_out_of_range_positions() {
        let f = fixture();
        let mut tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
        assert!(!tour.swap_adjacent_at(0));
        assert!(!tour.swap_adjacent_at(9));
        assert!(!tour.reverse_section_at(8, 3));
        assert!(!tour.section_swap_at(1, 2, 2));
        assert!(!tour.swap_reverse_section_at(1, 1, SwapVariant::Plain));
        assert!(!tour.swap_reverse_section_at(9, 1, SwapVariant::Plain));
    }

    #[test]
    fn test_section_swap() {
        let f = fixture();
        let mut tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
        // [1, 2] and [3, 9] trade places.
        assert!(tour.section_swap_at(1, 6, 2));
        assert_eq!(tour.stops(), &[0, 3, 9, 8, 4, 5, 1, 2, 7, 6, 0]);
        check_invariants(&tour);
    }

    #[test]
    fn test_reverse_twice_restores() {
        let f = fixture();
        let mut tour = Tour::new(vec![0, 1, 2, 8, 3, 4, 5, 9, 7, 6, 0], &f.table, &f.proximity);
        let before = tour.clone();
        // [1, 2, 8] reversed breaks 1 -> 2, [3, 4, 5] reversed breaks 4 -> 5.
        assert!(!tour.reverse_section_at(1, 3));
        assert!(tour.reverse_section_at(2, 3));
        assert_eq!(tour.stops(), &[0, 1, 3, 8, 2, 4, 5, 9, 7, 6, 0]);
        assert!(tour.reverse_section_at(2, 3));
        assert_eq!(tour.stops(), before.stops());
        assert_eq!(tour.position_index(), before.position_index());
        assert!((tour.cost() - before.cost()).abs() < 1e-9);
    }

    #[test]
    fn test_swap_reverse_variants() {
        let map = line_network(8);
        let requests: Vec<_> = (1..=5).map(|p| DeliveryRequest::new(p, 6)).collect();
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0], 2).expect("build");
        let table = PrecedenceTable::from_requests(&requests);
        // Windows [1, 2] and [4, 5] around pivot 3.
        let base = Tour::new(vec![0, 1, 2, 3, 4, 5, 6, 0], &table, &proximity);

        let mut tour = base.clone();
        assert!(tour.swap_reverse_section_at(3, 2, SwapVariant::Plain));
        assert_eq!(tour.stops(), &[0, 4, 5, 3, 1, 2, 6, 0]);

        let mut tour = base.clone();
        assert!(tour.swap_reverse_section_at(3, 2, SwapVariant::ReverseLeft));
        assert_eq!(tour.stops(), &[0, 4, 5, 3, 2, 1, 6, 0]);

        let mut tour = base.clone();
        assert!(tour.swap_reverse_section_at(3, 2, SwapVariant::ReverseRight));
        assert_eq!(tour.stops(), &[0, 5, 4, 3, 1, 2, 6, 0]);
        check_invariants(&tour);
    }

    #[test]
    fn test_duplicate_ids_keep_index_consistent() {
        let map = line_network(6);
        let requests = [DeliveryRequest::new(1, 2), DeliveryRequest::new(2, 1), DeliveryRequest::new(3, 4)];
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0], 2).expect("build");
        let table = PrecedenceTable::from_requests(&requests);
        let mut tour = Tour::new(vec![0, 1, 2, 1, 3, 4, 0], &table, &proximity);

        assert!(tour.swap_adjacent_at(3));
        assert_eq!(tour.stops(), &[0, 1, 2, 3, 1, 4, 0]);
        assert_eq!(tour.position_index().positions(1).map(|s| s.len()), Some(2));
        assert_eq!(tour.position_index(), &PositionIndex::from_stops(tour.stops()));

        // No 1 would be left in front of the 2.
        let before = tour.position_index().clone();
        assert!(!tour.swap_adjacent_at(1));
        assert_eq!(tour.position_index(), &before);

        assert!(tour.swap_adjacent_at(3));
        assert_eq!(tour.stops(), &[0, 1, 2, 1, 3, 4, 0]);
    }

    #[test]
    fn test_end_depot_refreshed() {
        let map = line_network(8);
        let requests = [DeliveryRequest::new(1, 2), DeliveryRequest::new(6, 5)];
        let engine = ShortestPathEngine::new(&map);
        let proximity = ProximityIndex::build(&engine, &requests, &[0, 7], 2).expect("build");
        let table = PrecedenceTable::from_requests(&requests);
        let mut tour = Tour::new(vec![0, 6, 5, 1, 2, 0], &table, &proximity);

        assert!(tour.section_swap_at(1, 3, 2));
        assert_eq!(tour.stops(), &[0, 1, 2, 6, 5, 7]);
        assert!((tour.cost() - (1.0 + 1.0 + 4.0 + 1.0 + 2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_random_moves_keep_invariants() {
        let f = fixture();
        let mut tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
        let mut rng = StdRng::seed_from_u64(7);
        let mut accepted = 0;
        for step in 0..400 {
            let k = 1 + step % 3;
            let ok = match step % 4 {
                0 => tour.minor_change_adjacent(&mut rng),
                1 => tour.section_change(k, &mut rng),
                2 => tour.reverse_section(k + 1, &mut rng),
                _ => tour.swap_reverse_section(k, &mut rng),
            };
            if ok {
                accepted += 1;
            }
            check_invariants(&tour);
        }
        assert!(accepted > 0);
    }

    proptest! {
        #[test]
        fn prop_moves_preserve_precedence_and_cost(seed in any::<u64>(), steps in 1usize..60) {
            let f = fixture();
            let mut tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..steps {
                let k = rng.random_range(1..4);
                match rng.random_range(0..4) {
                    0 => tour.minor_change_adjacent(&mut rng),
                    1 => tour.section_change(k, &mut rng),
                    2 => tour.reverse_section(k + 1, &mut rng),
                    _ => tour.swap_reverse_section(k, &mut rng),
                };
            }
            prop_assert!(tour.satisfies_precedence());
            let mut fresh = tour.clone();
            fresh.recompute_cost();
            prop_assert!((fresh.cost() - tour.cost()).abs() < 1e-9);
            prop_assert_eq!(tour.position_index(), &PositionIndex::from_stops(tour.stops()));
        }

        #[test]
        fn prop_reverse_round_trip(pos in 1usize..9, k in 2usize..6) {
            let f = fixture();
            let mut tour = Tour::new(vec![0, 1, 2, 8, 4, 5, 3, 9, 7, 6, 0], &f.table, &f.proximity);
            let before = tour.clone();
            if tour.reverse_section_at(pos, k) {
                prop_assert!(tour.reverse_section_at(pos, k));
            }
            prop_assert_eq!(tour.stops(), before.stops());
            prop_assert_eq!(tour.position_index(), before.position_index());
            prop_assert!((tour.cost() - before.cost()).abs() < 1e-9);
        }
    }
}
