//! Road networks shared by unit tests.

use crate::models::{LatLon, SegmentInfo};
use crate::network::{geometry, StreetNetwork};

/// Complete graph on intersections `0..n` laid out 1 km apart on the
/// equator, one street, 60 km/h: travelling from `i` to `j` costs `|i - j|`
/// minutes whichever way it is routed.
pub(crate) fn line_network(n: usize) -> StreetNetwork {
    line_network_with_isolated(n, 0)
}

/// [`line_network`] plus `isolated` intersections with no segments,
/// numbered `n..n + isolated`.
pub(crate) fn line_network_with_isolated(n: usize, isolated: usize) -> StreetNetwork {
    let step = geometry::equator_degrees_for(1000.0);
    let mut b = StreetNetwork::builder();
    for i in 0..n + isolated {
        b.add_node(LatLon::new(0.0, i as f64 * step));
    }
    let street = b.add_street("Front St");
    for i in 0..n {
        for j in i + 1..n {
            b.add_segment(SegmentInfo::new(i, j, street, 60.0));
        }
    }
    b.build().expect("line network is valid")
}

/// Intersections `0..n` 1 km apart joined only to their neighbours; each
/// segment `i -> i + 1` is its own street so every intersection is a turn.
pub(crate) fn chain_network(n: usize) -> StreetNetwork {
    let step = geometry::equator_degrees_for(1000.0);
    let mut b = StreetNetwork::builder();
    for i in 0..n {
        b.add_node(LatLon::new(0.0, i as f64 * step));
    }
    for i in 0..n.saturating_sub(1) {
        let street = b.add_street(format!("Street {i}"));
        b.add_segment(SegmentInfo::new(i, i + 1, street, 60.0));
    }
    b.build().expect("chain network is valid")
}

/// One-way network where the nearest-neighbour order strands the courier:
///
/// ```text
/// 0 -> 1 -> 5 -> 4
///      |    ^
///      v    |
///      2 -> 3
/// ```
///
/// `1 -> 5` takes 2 minutes and `1 -> 2` takes 3; every other segment takes
/// 1 minute. Nothing leads back to 0, 1 or 2 once left, so the only
/// connected route through `1, 2, 3, 5` is `0 1 2 3 5 4` at 7 minutes.
pub(crate) fn one_way_network() -> StreetNetwork {
    let step = geometry::equator_degrees_for(1000.0);
    let mut b = StreetNetwork::builder();
    for km in [0.0, 1.0, 2.0, 3.0, 5.0, 4.0] {
        b.add_node(LatLon::new(0.0, km * step));
    }
    let street = b.add_street("Mill Ln");
    for (from, to, kmh) in [(0, 1, 60.0), (1, 5, 90.0), (1, 2, 20.0), (2, 3, 60.0), (3, 5, 60.0), (5, 4, 60.0)] {
        b.add_segment(SegmentInfo::new(from, to, street, kmh).with_one_way(true));
    }
    b.build().expect("one-way network is valid")
}
