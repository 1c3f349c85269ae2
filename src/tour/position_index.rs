//! Positions occupied by each intersection inside a tour.

use std::collections::{BTreeSet, HashMap};

use crate::models::NodeId;

/// Map from intersection to the ordered set of interior tour positions it
/// occupies.
///
/// The same intersection may appear several times in a tour (as the pickup
/// of one request and the dropoff of another, or when revisited), so every
/// id maps to a set. Depot slots are not indexed. An id whose last position
/// is removed disappears from the index.
///
/// # Examples
///
/// ```
/// use u_courier::tour::PositionIndex;
///
/// let index = PositionIndex::from_stops(&[0, 4, 2, 4, 0]);
/// assert_eq!(index.first(4), Some(1));
/// assert_eq!(index.last(4), Some(3));
/// assert_eq!(index.first(0), None); // depot slots are skipped
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    positions: HashMap<NodeId, BTreeSet<usize>>,
}

impl PositionIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the interior of `[start_depot, stops.., end_depot]`.
    pub fn from_stops(stops: &[NodeId]) -> Self {
        let mut index = Self::new();
        if stops.len() > 2 {
            for (pos, &node) in stops.iter().enumerate().take(stops.len() - 1).skip(1) {
                index.insert(node, pos);
            }
        }
        index
    }

    /// Records that `node` occupies `pos`.
    pub fn insert(&mut self, node: NodeId, pos: usize) {
        self.positions.entry(node).or_default().insert(pos);
    }

    /// Forgets that `node` occupies `pos`. Returns whether it did.
    pub fn remove(&mut self, node: NodeId, pos: usize) -> bool {
        let Some(set) = self.positions.get_mut(&node) else {
            return false;
        };
        let removed = set.remove(&pos);
        if set.is_empty() {
            self.positions.remove(&node);
        }
        removed
    }

    /// All positions of `node`, ascending.
    pub fn positions(&self, node: NodeId) -> Option<&BTreeSet<usize>> {
        self.positions.get(&node)
    }

    /// Smallest position of `node`.
    pub fn first(&self, node: NodeId) -> Option<usize> {
        self.positions.get(&node)?.first().copied()
    }

    /// Largest position of `node`.
    pub fn last(&self, node: NodeId) -> Option<usize> {
        self.positions.get(&node)?.last().copied()
    }

    /// Returns `true` if `node` occupies at least one position.
    pub fn contains(&self, node: NodeId) -> bool {
        self.positions.contains_key(&node)
    }

    /// Number of distinct intersections indexed.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total number of indexed positions.
    pub fn occupied(&self) -> usize {
        self.positions.values().map(BTreeSet::len).sum()
    }
}
