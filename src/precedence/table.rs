//! Before/after relations derived from delivery requests.
//!
//! Every request `(pickup, dropoff)` adds `pickup` to the *before* list of
//! `dropoff` and `dropoff` to the *after* list of `pickup`. Tour moves are
//! screened against these lists using only the extreme positions of each
//! intersection, which makes every check O(degree · log n).

use std::collections::HashMap;

use crate::models::{DeliveryRequest, NodeId};
use crate::tour::PositionIndex;

/// Required neighbours of one intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConditions {
    before: Vec<NodeId>,
    after: Vec<NodeId>,
}

impl NodeConditions {
    /// Intersections that must be visited before this one.
    pub fn before(&self) -> &[NodeId] {
        &self.before
    }

    /// Intersections that must be visited after this one.
    pub fn after(&self) -> &[NodeId] {
        &self.after
    }
}

/// Precedence relations for every pickup and dropoff intersection.
///
/// # Examples
///
/// ```
/// use u_courier::models::DeliveryRequest;
/// use u_courier::precedence::PrecedenceTable;
/// use u_courier::tour::PositionIndex;
///
/// let table = PrecedenceTable::from_requests(&[DeliveryRequest::new(3, 1)]);
/// let good = PositionIndex::from_stops(&[0, 3, 1, 0]);
/// let bad = PositionIndex::from_stops(&[0, 1, 3, 0]);
///
/// assert!(table.is_valid(1, &good));
/// assert!(!table.is_valid(1, &bad));
/// assert!(table.satisfied_by(&[0, 3, 1, 0]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrecedenceTable {
    conditions: HashMap<NodeId, NodeConditions>,
}

impl PrecedenceTable {
    /// Collects the relations of all requests.
    pub fn from_requests(requests: &[DeliveryRequest]) -> Self {
        let mut conditions: HashMap<NodeId, NodeConditions> = HashMap::new();
        for req in requests {
            conditions.entry(req.pickup).or_default().after.push(req.dropoff);
            conditions.entry(req.dropoff).or_default().before.push(req.pickup);
        }
        Self { conditions }
    }

    /// Number of constrained intersections.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` if there are no requests.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Relations of `node`, if it is a pickup or dropoff.
    pub fn conditions(&self, node: NodeId) -> Option<&NodeConditions> {
        self.conditions.get(&node)
    }

    /// Constrained intersections in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.conditions.keys().copied()
    }

    /// Intersections that must be visited before `node`.
    pub fn before(&self, node: NodeId) -> &[NodeId] {
        self.conditions.get(&node).map_or(&[], |c| c.before.as_slice())
    }

    /// Intersections that must be visited after `node`.
    pub fn after(&self, node: NodeId) -> &[NodeId] {
        self.conditions.get(&node).map_or(&[], |c| c.after.as_slice())
    }

    /// Returns `true` if `other` must be visited before `node`.
    pub fn is_before(&self, node: NodeId, other: NodeId) -> bool {
        self.before(node).contains(&other)
    }

    /// Returns `true` if `other` must be visited after `node`.
    pub fn is_after(&self, node: NodeId, other: NodeId) -> bool {
        self.after(node).contains(&other)
    }

    /// Checks `node` against the current positions.
    ///
    /// Fails when some required predecessor has its earliest occurrence
    /// after the latest occurrence of `node`, or some required successor has
    /// its latest occurrence before the earliest occurrence of `node`.
    /// Intersections missing from the index or the table are unconstrained.
    ///
    /// With one occurrence per intersection this is exact. With duplicates
    /// it only asks that *some* occurrence of each neighbour can be ordered
    /// correctly, not that the occurrence serving a given request is.
    pub fn is_valid(&self, node: NodeId, index: &PositionIndex) -> bool {
        let Some(cond) = self.conditions.get(&node) else {
            return true;
        };
        let (Some(min_pos), Some(max_pos)) = (index.first(node), index.last(node)) else {
            return true;
        };

        let before_ok = cond
            .before
            .iter()
            .all(|&b| index.first(b).map_or(true, |p| p <= max_pos));
        before_ok
            && cond
                .after
                .iter()
                .all(|&a| index.last(a).map_or(true, |p| p >= min_pos))
    }

    /// Checks every id in `ids`.
    pub fn all_valid(&self, ids: &[NodeId], index: &PositionIndex) -> bool {
        ids.iter().all(|&id| self.is_valid(id, index))
    }

    /// Checks both ends of a single swap.
    pub fn is_valid_swap(&self, a: NodeId, b: NodeId, index: &PositionIndex) -> bool {
        self.is_valid(a, index) && self.is_valid(b, index)
    }

    /// Checks every id of two swapped windows.
    pub fn is_valid_section_swap(&self, ids1: &[NodeId], ids2: &[NodeId], index: &PositionIndex) -> bool {
        self.all_valid(ids1, index) && self.all_valid(ids2, index)
    }

    /// Checks every id of a reversed window.
    pub fn is_valid_section_reverse(&self, ids: &[NodeId], index: &PositionIndex) -> bool {
        self.all_valid(ids, index)
    }

    /// Returns `true` if for every relation some occurrence of the
    /// predecessor comes strictly before some occurrence of the successor in
    /// `stops`, and every constrained intersection appears.
    ///
    /// A request whose pickup and dropoff coincide is met by a single visit.
    pub fn satisfied_by(&self, stops: &[NodeId]) -> bool {
        let mut first: HashMap<NodeId, usize> = HashMap::new();
        let mut last: HashMap<NodeId, usize> = HashMap::new();
        for (pos, &node) in stops.iter().enumerate() {
            first.entry(node).or_insert(pos);
            last.insert(node, pos);
        }

        self.conditions.iter().all(|(&node, cond)| {
            let Some(&node_last) = last.get(&node) else {
                return false;
            };
            cond.before
                .iter()
                .filter(|&&b| b != node)
                .all(|b| first.get(b).is_some_and(|&p| p < node_last))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PrecedenceTable {
        PrecedenceTable::from_requests(&[
            DeliveryRequest::new(1, 2),
            DeliveryRequest::new(4, 5),
            DeliveryRequest::new(1, 5),
        ])
    }

    #[test]
    fn test_relations() {
        let t = table();
        assert_eq!(t.before(5), &[4, 1]);
        assert_eq!(t.after(1), &[2, 5]);
        assert!(t.before(1).is_empty());
        assert!(t.is_before(2, 1));
        assert!(t.is_after(4, 5));
        assert!(!t.is_after(5, 4));
        assert_eq!(t.len(), 4);
        assert!(t.before(99).is_empty());
    }

    #[test]
    fn test_is_valid_single_occurrence() {
        let t = table();
        let index = PositionIndex::from_stops(&[0, 1, 4, 2, 5, 0]);
        for node in [1, 2, 4, 5] {
            assert!(t.is_valid(node, &index));
        }
        let index = PositionIndex::from_stops(&[0, 5, 1, 2, 4, 0]);
        assert!(!t.is_valid(5, &index));
        assert!(!t.is_valid(1, &index));
        assert!(!t.is_valid(4, &index));
        assert!(t.is_valid(2, &index));
    }

    #[test]
    fn test_unconstrained_nodes() {
        let t = table();
        let index = PositionIndex::from_stops(&[0, 9, 0]);
        assert!(t.is_valid(9, &index));
        // 2 is constrained but absent from the index.
        assert!(t.is_valid(2, &index));
    }

    #[test]
    fn test_duplicates_are_permissive() {
        // 3 serves both requests; its second visit lets 7 precede a 3.
        let t = PrecedenceTable::from_requests(&[DeliveryRequest::new(3, 7), DeliveryRequest::new(7, 3)]);
        let index = PositionIndex::from_stops(&[0, 3, 7, 3, 0]);
        assert!(t.is_valid(3, &index));
        assert!(t.is_valid(7, &index));
        assert!(t.satisfied_by(&[0, 3, 7, 3, 0]));
        assert!(!t.satisfied_by(&[0, 3, 7, 0]));
    }

    #[test]
    fn test_batch_variants() {
        let t = table();
        let index = PositionIndex::from_stops(&[0, 2, 1, 4, 5, 0]);
        assert!(!t.is_valid_swap(1, 2, &index));
        assert!(t.is_valid_swap(4, 5, &index));
        assert!(!t.is_valid_section_swap(&[4], &[2], &index));
        assert!(t.is_valid_section_reverse(&[4, 5], &index));
    }

    #[test]
    fn test_satisfied_by() {
        let t = table();
        assert!(t.satisfied_by(&[0, 1, 2, 4, 5, 0]));
        assert!(t.satisfied_by(&[0, 4, 1, 5, 2, 0]));
        assert!(!t.satisfied_by(&[0, 2, 1, 4, 5, 0]));
        assert!(!t.satisfied_by(&[0, 1, 2, 4, 0]));
    }

    #[test]
    fn test_self_request() {
        let t = PrecedenceTable::from_requests(&[DeliveryRequest::new(6, 6)]);
        assert!(t.satisfied_by(&[0, 6, 0]));
        assert!(t.is_valid(6, &PositionIndex::from_stops(&[0, 6, 0])));
    }
}
