//! Topological bookkeeping for building a tour one stop at a time.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::NodeId;

use super::PrecedenceTable;

/// Tracks which constrained intersections still have to be appended.
///
/// An intersection is *done* once it has been appended while none of its
/// predecessors was outstanding. Appending it earlier is allowed (the tour
/// must start somewhere, and cyclic requests leave no other choice) but it
/// then remains pending and will be appended again later.
///
/// # Examples
///
/// ```
/// use u_courier::models::DeliveryRequest;
/// use u_courier::precedence::{InsertionTracker, PrecedenceTable};
///
/// let table = PrecedenceTable::from_requests(&[DeliveryRequest::new(1, 2)]);
/// let mut tracker = InsertionTracker::new(&table);
/// assert!(tracker.can_insert_once(1));
/// assert!(!tracker.can_insert_once(2));
///
/// tracker.record_insert(1);
/// assert!(tracker.can_insert_once(2));
/// tracker.record_insert(2);
/// assert!(tracker.is_done());
/// ```
#[derive(Debug, Clone)]
pub struct InsertionTracker<'a> {
    table: &'a PrecedenceTable,
    outstanding: BTreeMap<NodeId, BTreeSet<NodeId>>,
    pending: BTreeSet<NodeId>,
    inserted: BTreeSet<NodeId>,
}

impl<'a> InsertionTracker<'a> {
    /// Starts with every constrained intersection pending.
    pub fn new(table: &'a PrecedenceTable) -> Self {
        let mut outstanding = BTreeMap::new();
        let mut pending = BTreeSet::new();
        for node in table.nodes() {
            let preds: BTreeSet<NodeId> = table
                .before(node)
                .iter()
                .copied()
                .filter(|&b| b != node)
                .collect();
            outstanding.insert(node, preds);
            pending.insert(node);
        }
        Self {
            table,
            outstanding,
            pending,
            inserted: BTreeSet::new(),
        }
    }

    /// Returns `true` when every intersection is done.
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` if `node` still has to be appended.
    pub fn needs_insertion(&self, node: NodeId) -> bool {
        self.pending.contains(&node)
    }

    /// Returns `true` if appending `node` now would finish it, i.e. none of
    /// its predecessors is outstanding.
    pub fn can_insert_once(&self, node: NodeId) -> bool {
        self.outstanding.get(&node).is_some_and(BTreeSet::is_empty)
    }

    /// Returns `true` if `node` has been appended at least once.
    pub fn was_inserted(&self, node: NodeId) -> bool {
        self.inserted.contains(&node)
    }

    /// Pending intersections in ascending id order.
    pub fn pending(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pending.iter().copied()
    }

    /// Records that `node` was appended to the tour.
    pub fn record_insert(&mut self, node: NodeId) {
        if self.can_insert_once(node) {
            self.pending.remove(&node);
        }
        self.inserted.insert(node);
        for &succ in self.table.after(node) {
            if let Some(preds) = self.outstanding.get_mut(&succ) {
                preds.remove(&node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryRequest;

    #[test]
    fn test_chain() {
        let table = PrecedenceTable::from_requests(&[
            DeliveryRequest::new(1, 2),
            DeliveryRequest::new(2, 3),
        ]);
        let mut tracker = InsertionTracker::new(&table);
        assert_eq!(tracker.pending().collect::<Vec<_>>(), vec![1, 2, 3]);

        tracker.record_insert(1);
        assert!(!tracker.needs_insertion(1));
        assert!(tracker.can_insert_once(2));
        assert!(!tracker.can_insert_once(3));

        tracker.record_insert(2);
        tracker.record_insert(3);
        assert!(tracker.is_done());
    }

    #[test]
    fn test_early_insert_stays_pending() {
        let table = PrecedenceTable::from_requests(&[DeliveryRequest::new(1, 2)]);
        let mut tracker = InsertionTracker::new(&table);
        tracker.record_insert(2);
        assert!(tracker.needs_insertion(2));
        assert!(tracker.was_inserted(2));
        tracker.record_insert(1);
        assert!(tracker.can_insert_once(2));
        tracker.record_insert(2);
        assert!(tracker.is_done());
    }

    #[test]
    fn test_cycle() {
        let table = PrecedenceTable::from_requests(&[
            DeliveryRequest::new(1, 2),
            DeliveryRequest::new(2, 1),
        ]);
        let mut tracker = InsertionTracker::new(&table);
        assert!(!tracker.can_insert_once(1));
        tracker.record_insert(1);
        assert!(tracker.needs_insertion(1));
        assert!(tracker.can_insert_once(2));
        tracker.record_insert(2);
        assert!(tracker.can_insert_once(1));
        tracker.record_insert(1);
        assert!(tracker.is_done());
    }

    #[test]
    fn test_self_request_done_in_one_visit() {
        let table = PrecedenceTable::from_requests(&[DeliveryRequest::new(4, 4)]);
        let mut tracker = InsertionTracker::new(&table);
        assert!(tracker.can_insert_once(4));
        tracker.record_insert(4);
        assert!(tracker.is_done());
    }

    #[test]
    fn test_empty() {
        let table = PrecedenceTable::default();
        assert!(InsertionTracker::new(&table).is_done());
    }
}
