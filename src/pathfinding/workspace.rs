//! Reusable per-intersection scratch state for graph searches.

use crate::models::{NodeId, SegmentId};
use crate::network::MapService;

/// Distance, finalization and back-pointer arrays for one search at a time.
///
/// Each worker owns one workspace and reuses it across searches. Only the
/// intersections touched by the previous search are cleared on reset, so a
/// short search on a large map stays cheap.
#[derive(Debug, Clone)]
pub struct SearchWorkspace {
    dist: Vec<f64>,
    visited: Vec<bool>,
    previous: Vec<Option<SegmentId>>,
    touched: Vec<NodeId>,
}

impl SearchWorkspace {
    /// Creates a workspace for a map with `node_count` intersections.
    pub fn new(node_count: usize) -> Self {
        Self {
            dist: vec![f64::INFINITY; node_count],
            visited: vec![false; node_count],
            previous: vec![None; node_count],
            touched: Vec::new(),
        }
    }

    /// Number of intersections this workspace covers.
    pub fn node_count(&self) -> usize {
        self.dist.len()
    }

    /// Clears the previous search and grows to `node_count` if needed.
    pub(crate) fn prepare(&mut self, node_count: usize) {
        for &node in &self.touched {
            self.dist[node] = f64::INFINITY;
            self.visited[node] = false;
            self.previous[node] = None;
        }
        self.touched.clear();
        if node_count > self.dist.len() {
            self.dist.resize(node_count, f64::INFINITY);
            self.visited.resize(node_count, false);
            self.previous.resize(node_count, None);
        }
    }

    /// Best known cost label of `node`.
    pub(crate) fn distance(&self, node: NodeId) -> f64 {
        self.dist[node]
    }

    pub(crate) fn is_visited(&self, node: NodeId) -> bool {
        self.visited[node]
    }

    pub(crate) fn visit(&mut self, node: NodeId) {
        self.visited[node] = true;
    }

    /// Segment used to reach `node` on the current best path.
    pub(crate) fn previous(&self, node: NodeId) -> Option<SegmentId> {
        self.previous[node]
    }

    /// Records a better label for `node`.
    pub(crate) fn relax(&mut self, node: NodeId, cost: f64, via: Option<SegmentId>) {
        if self.dist[node] == f64::INFINITY {
            self.touched.push(node);
        }
        self.dist[node] = cost;
        self.previous[node] = via;
    }

    /// Follows back-pointers from `end` and returns the segments in travel
    /// order. Empty when `end` was never reached or is the search origin.
    pub(crate) fn trace_back<M: MapService + ?Sized>(&self, map: &M, end: NodeId) -> Vec<SegmentId> {
        let mut path = Vec::new();
        let mut node = end;
        while let Some(seg) = self.previous[node] {
            path.push(seg);
            node = map.segment_info(seg).other_end(node);
        }
        path.reverse();
        path
    }
}
