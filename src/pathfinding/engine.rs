//! Turn-aware shortest paths over the street graph.
//!
//! # Algorithm
//!
//! Label-setting search over intersections. Moving along a segment costs its
//! travel time plus a fixed turn penalty whenever the segment belongs to a
//! different street than the one used to reach the current intersection.
//!
//! Point-to-point queries run A*. The label of an intersection is the cost
//! so far plus the ideal time to the target at `max_speed_kmh`; relaxing a
//! segment adds the heuristic of the next intersection and removes the one
//! of the current. The heuristic is consistent as long as no segment is
//! faster than `max_speed_kmh`.
//!
//! Multi-target queries run the same loop without a heuristic (Dijkstra)
//! and report targets in the order they are finalized.
//!
//! The frontier is a binary heap with lazy deletion: stale entries for
//! already finalized intersections are skipped on pop. Finalized
//! intersections are never relaxed again, which also keeps a path from
//! stepping straight back along the segment it just used.
//!
//! # Complexity
//!
//! O((V + E) log V) per search.
//!
//! # Reference
//!
//! Hart, P.E., Nilsson, N.J. & Raphael, B. (1968). "A Formal Basis for the
//! Heuristic Determination of Minimum Cost Paths", *IEEE Transactions on
//! Systems Science and Cybernetics* 4(2), 100-107.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::models::{NodeId, SegmentId};
use crate::network::{geometry, MapService};

use super::SearchWorkspace;

/// Cost model parameters for path searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Minutes added whenever consecutive segments change street.
    pub turn_penalty: f64,
    /// Speed in km/h used by the A* heuristic. Must not be below any
    /// segment speed limit for A* to stay exact.
    pub max_speed_kmh: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            turn_penalty: 0.25,
            max_speed_kmh: 120.0,
        }
    }
}

impl SearchParams {
    /// Sets the turn penalty in minutes.
    pub fn with_turn_penalty(mut self, minutes: f64) -> Self {
        self.turn_penalty = minutes;
        self
    }

    /// Sets the heuristic speed in km/h.
    pub fn with_max_speed(mut self, kmh: f64) -> Self {
        self.max_speed_kmh = kmh;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed so `BinaryHeap` pops the cheapest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest-path queries against a borrowed road network.
///
/// The engine itself is immutable and cheap to share; all mutable search
/// state lives in a [`SearchWorkspace`]. The `*_with` methods take a
/// caller-owned workspace so hot loops can reuse one; the plain methods
/// allocate a fresh one per call.
///
/// # Examples
///
/// ```
/// use u_courier::models::{LatLon, SegmentInfo};
/// use u_courier::network::{MapService, StreetNetwork};
/// use u_courier::pathfinding::ShortestPathEngine;
///
/// let mut b = StreetNetwork::builder();
/// let a = b.add_node(LatLon::new(0.0, 0.0));
/// let c = b.add_node(LatLon::new(0.0, 0.01));
/// let d = b.add_node(LatLon::new(0.0, 0.02));
/// let king = b.add_street("King St");
/// let queen = b.add_street("Queen St");
/// b.add_segment(SegmentInfo::new(a, c, king, 50.0));
/// b.add_segment(SegmentInfo::new(c, d, queen, 50.0));
/// let map = b.build().unwrap();
///
/// let engine = ShortestPathEngine::new(&map);
/// let path = engine.find_path(a, d);
/// assert_eq!(path, vec![0, 1]);
/// // Two segments plus one street change.
/// let expected = map.segment_travel_time(0) + map.segment_travel_time(1) + 0.25;
/// assert!((engine.travel_time(&path) - expected).abs() < 1e-10);
/// ```
pub struct ShortestPathEngine<'a, M: MapService + ?Sized> {
    map: &'a M,
    params: SearchParams,
}

impl<M: MapService + ?Sized> Clone for ShortestPathEngine<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: MapService + ?Sized> Copy for ShortestPathEngine<'_, M> {}

impl<'a, M: MapService + ?Sized> ShortestPathEngine<'a, M> {
    /// Creates an engine with default [`SearchParams`].
    pub fn new(map: &'a M) -> Self {
        Self {
            map,
            params: SearchParams::default(),
        }
    }

    /// Replaces the search parameters.
    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// The road network being searched.
    pub fn map(&self) -> &'a M {
        self.map
    }

    /// Current search parameters.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Allocates a workspace sized for this map.
    pub fn workspace(&self) -> SearchWorkspace {
        SearchWorkspace::new(self.map.node_count())
    }

    /// Fastest path from `start` to `end` as segment ids.
    ///
    /// Empty when `start == end`, when `end` is unreachable, or when either
    /// id is outside the map.
    pub fn find_path(&self, start: NodeId, end: NodeId) -> Vec<SegmentId> {
        self.find_path_with(&mut self.workspace(), start, end)
    }

    /// [`find_path`](Self::find_path) using a caller-owned workspace.
    pub fn find_path_with(
        &self,
        ws: &mut SearchWorkspace,
        start: NodeId,
        end: NodeId,
    ) -> Vec<SegmentId> {
        let n = self.map.node_count();
        if start == end || start >= n || end >= n {
            return Vec::new();
        }

        let mut reached = false;
        self.search(ws, start, Some(end), |node, _| {
            if node == end {
                reached = true;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        if reached {
            ws.trace_back(self.map, end)
        } else {
            Vec::new()
        }
    }

    /// Travel time of a path in minutes, including turn penalties.
    ///
    /// The path is assumed to be connected; no check is made.
    pub fn travel_time(&self, path: &[SegmentId]) -> f64 {
        let mut total = 0.0;
        let mut prev_street = None;
        for &seg in path {
            total += self.map.segment_travel_time(seg);
            let street = self.map.segment_info(seg).street_id;
            if prev_street.is_some_and(|s| s != street) {
                total += self.params.turn_penalty;
            }
            prev_street = Some(street);
        }
        total
    }

    /// Fastest path from `start` to whichever of `targets` is reached first.
    ///
    /// Returns the chosen target and the path to it, `None` when no target is
    /// reachable. A single distinct target is answered by A*.
    pub fn find_path_to_nearest(
        &self,
        start: NodeId,
        targets: &[NodeId],
    ) -> Option<(NodeId, Vec<SegmentId>)> {
        self.find_path_to_nearest_with(&mut self.workspace(), start, targets)
    }

    /// [`find_path_to_nearest`](Self::find_path_to_nearest) using a
    /// caller-owned workspace.
    pub fn find_path_to_nearest_with(
        &self,
        ws: &mut SearchWorkspace,
        start: NodeId,
        targets: &[NodeId],
    ) -> Option<(NodeId, Vec<SegmentId>)> {
        let n = self.map.node_count();
        let mut targets: Vec<NodeId> = targets.iter().copied().filter(|&t| t < n).collect();
        targets.sort_unstable();
        targets.dedup();

        if start >= n || targets.is_empty() {
            return None;
        }
        if targets.binary_search(&start).is_ok() {
            return Some((start, Vec::new()));
        }
        if let [single] = targets[..] {
            let path = self.find_path_with(ws, start, single);
            return if path.is_empty() { None } else { Some((single, path)) };
        }

        let mut found = None;
        self.search(ws, start, None, |node, _| {
            if targets.binary_search(&node).is_ok() {
                found = Some(node);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found.map(|node| (node, ws.trace_back(self.map, node)))
    }

    /// Dijkstra from `source`, reporting every target other than `source`
    /// with its travel time, cheapest first.
    ///
    /// Stops once `wanted` targets have been reported or the reachable graph
    /// is exhausted.
    pub fn multi_target_costs<F>(
        &self,
        ws: &mut SearchWorkspace,
        source: NodeId,
        is_target: F,
        wanted: usize,
    ) -> Vec<(NodeId, f64)>
    where
        F: Fn(NodeId) -> bool,
    {
        let mut found = Vec::new();
        if wanted == 0 || source >= self.map.node_count() {
            return found;
        }
        self.search(ws, source, None, |node, cost| {
            if node != source && is_target(node) {
                found.push((node, cost));
                if found.len() >= wanted {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        });
        found
    }

    /// Ideal travel time in minutes between two intersections at the
    /// heuristic speed.
    fn ideal_time(&self, from: NodeId, to: NodeId) -> f64 {
        let meters = self
            .map
            .distance(self.map.position_of(from), self.map.position_of(to));
        geometry::minutes_at(meters, self.params.max_speed_kmh)
    }

    fn turn_penalty(&self, ws: &SearchWorkspace, node: NodeId, seg: SegmentId) -> f64 {
        match ws.previous(node) {
            Some(prev)
                if self.map.segment_info(prev).street_id
                    != self.map.segment_info(seg).street_id =>
            {
                self.params.turn_penalty
            }
            _ => 0.0,
        }
    }

    /// Shared label-setting loop. A* when `target` is given, Dijkstra
    /// otherwise. `on_finalize` sees each intersection once, with its cost
    /// from `source` excluding the heuristic, and may stop the search.
    fn search<F>(&self, ws: &mut SearchWorkspace, source: NodeId, target: Option<NodeId>, mut on_finalize: F)
    where
        F: FnMut(NodeId, f64) -> ControlFlow<()>,
    {
        ws.prepare(self.map.node_count());
        let h = |node: NodeId| match target {
            Some(t) => self.ideal_time(node, t),
            None => 0.0,
        };

        let seed = h(source);
        ws.relax(source, seed, None);
        let mut frontier = BinaryHeap::new();
        frontier.push(QueueEntry {
            cost: seed,
            node: source,
        });

        while let Some(QueueEntry { node: current, .. }) = frontier.pop() {
            if ws.is_visited(current) {
                continue;
            }
            ws.visit(current);

            let h_current = h(current);
            if on_finalize(current, ws.distance(current) - h_current).is_break() {
                return;
            }

            for &seg in self.map.segments_at(current) {
                let info = self.map.segment_info(seg);
                if !info.allows(current) {
                    continue;
                }
                let next = info.other_end(current);
                if ws.is_visited(next) {
                    continue;
                }

                let cost = ws.distance(current)
                    + self.map.segment_travel_time(seg)
                    + (h(next) - h_current)
                    + self.turn_penalty(ws, current, seg);
                if cost >= ws.distance(next) {
                    continue;
                }
                ws.relax(next, cost, Some(seg));
                frontier.push(QueueEntry { cost, node: next });
            }
        }
    }
}
