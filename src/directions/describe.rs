//! Turn-by-turn directions for a segment path.
//!
//! # Algorithm
//!
//! Walk the path segment by segment. At each intersection the turn angle is
//! measured between the shape point of the incoming segment nearest the
//! intersection, the intersection, and the shape point of the outgoing
//! segment nearest it. Driving on is silent when the intersection only joins
//! the two segments, or when the street keeps its name and either the street
//! does not fork here or the turn is shallower than 90°. Otherwise the
//! distance driven so far is reported, followed by the maneuver.
//!
//! A maneuver is ambiguous when other exits leave on the same side. Exits on
//! the same street, and one-way segments that cannot be entered from this
//! intersection, do not count. An ambiguous turn is reported as the `n`-th
//! street counted from the outermost exit on that side.

use crate::models::{LatLon, NodeId, SegmentId};
use crate::network::{geometry, MapService, UNKNOWN_STREET};

use super::{Heading, Instruction, Maneuver, Side};

/// Angles under this many degrees are never reported as ambiguous.
const SHALLOW_TURN_DEG: f64 = 10.0;

/// Produces directions for driving `path` from `start`.
///
/// An empty path yields no instructions. Otherwise the list opens with
/// [`Instruction::Depart`] and closes with [`Instruction::Arrive`].
///
/// # Examples
///
/// ```
/// use u_courier::directions::{describe, Instruction};
/// use u_courier::models::{LatLon, SegmentInfo};
/// use u_courier::network::StreetNetwork;
///
/// let mut b = StreetNetwork::builder();
/// let a = b.add_node(LatLon::new(0.0, 0.0));
/// let c = b.add_node(LatLon::new(0.01, 0.0));
/// let main = b.add_street("Main St");
/// b.add_segment(SegmentInfo::new(a, c, main, 50.0));
/// let map = b.build().unwrap();
///
/// let steps = describe(&map, a, &[0]);
/// assert_eq!(steps[0].to_string(), "Head north down Main St");
/// assert_eq!(steps.last(), Some(&Instruction::Arrive));
/// ```
pub fn describe<M: MapService + ?Sized>(map: &M, start: NodeId, path: &[SegmentId]) -> Vec<Instruction> {
    let Some((&first, rest)) = path.split_first() else {
        return Vec::new();
    };

    let towards = point_next_to(map, first, start);
    let mut steps = vec![Instruction::Depart {
        heading: Heading::from_degrees(geometry::heading(map.position_of(start), towards)),
        street: street_of(map, first),
    }];

    let mut node = map.segment_info(first).other_end(start);
    let mut meters = map.segment_length(first);
    let mut prev = first;

    for &seg in rest {
        if seg == prev {
            push_distance(&mut steps, &mut meters);
            steps.push(Instruction::UTurn {
                street: street_of(map, seg),
            });
        } else {
            let angle = turn_angle(map, prev, seg, node);
            if !continues_without_turn(map, prev, seg, node, angle) {
                push_distance(&mut steps, &mut meters);
                steps.push(maneuver_at(map, prev, seg, node, angle));
            }
        }
        meters += map.segment_length(seg);
        node = map.segment_info(seg).other_end(node);
        prev = seg;
    }

    push_distance(&mut steps, &mut meters);
    steps.push(Instruction::Arrive);
    steps
}

fn push_distance(steps: &mut Vec<Instruction>, meters: &mut f64) {
    if *meters > 0.0 {
        steps.push(Instruction::Continue { meters: *meters });
    }
    *meters = 0.0;
}

fn name_of<M: MapService + ?Sized>(map: &M, seg: SegmentId) -> &str {
    map.street_name(map.segment_info(seg).street_id)
}

fn street_of<M: MapService + ?Sized>(map: &M, seg: SegmentId) -> Option<String> {
    let name = name_of(map, seg);
    (name != UNKNOWN_STREET).then(|| name.to_string())
}

/// Shape point of `seg` adjacent to its end at `node`.
fn point_next_to<M: MapService + ?Sized>(map: &M, seg: SegmentId, node: NodeId) -> LatLon {
    let info = map.segment_info(seg);
    if info.from == node {
        info.curve_points
            .first()
            .copied()
            .unwrap_or_else(|| map.position_of(info.to))
    } else {
        info.curve_points
            .last()
            .copied()
            .unwrap_or_else(|| map.position_of(info.from))
    }
}

/// Signed turn from `into` onto `out` at `node`, in `[-180, 180]`; positive
/// turns right.
fn turn_angle<M: MapService + ?Sized>(map: &M, into: SegmentId, out: SegmentId, node: NodeId) -> f64 {
    let start = point_next_to(map, into, node);
    let middle = map.position_of(node);
    let end = point_next_to(map, out, node);
    if start == middle || middle == end {
        return 0.0;
    }

    let mut angle = geometry::heading(start, middle) - geometry::heading(middle, end);
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle < -180.0 {
        angle += 360.0;
    }
    angle
}

fn continues_without_turn<M: MapService + ?Sized>(
    map: &M,
    into: SegmentId,
    out: SegmentId,
    node: NodeId,
    angle: f64,
) -> bool {
    let connected = map.segments_at(node);
    if connected.len() == 2 {
        return true;
    }
    let name = name_of(map, into);
    if name == UNKNOWN_STREET && name_of(map, out) == UNKNOWN_STREET {
        return false;
    }
    if name != name_of(map, out) {
        return false;
    }
    let same_street = connected.iter().filter(|&&s| name_of(map, s) == name).count();
    same_street <= 2 || angle.abs() < 90.0
}

fn maneuver_at<M: MapService + ?Sized>(
    map: &M,
    into: SegmentId,
    out: SegmentId,
    node: NodeId,
    angle: f64,
) -> Instruction {
    let street = street_of(map, out);
    let name = name_of(map, into);
    if name != UNKNOWN_STREET && name == name_of(map, out) {
        return Instruction::UTurn { street };
    }

    let n = rank_on_side(map, into, out, node, angle);
    if n == 0 || angle.abs() < SHALLOW_TURN_DEG {
        return Instruction::Turn {
            maneuver: Maneuver::from_angle(angle),
            street,
        };
    }
    let side = if angle > 0.0 { Side::Right } else { Side::Left };
    if n == 1 {
        let maneuver = match side {
            Side::Left => Maneuver::KeepLeft,
            Side::Right => Maneuver::KeepRight,
        };
        return Instruction::Turn { maneuver, street };
    }
    Instruction::NthStreet { side, n, street }
}

/// Position of `out` among the exits on its side, counted from the sharpest
/// one, or zero when no other exit leaves on that side.
fn rank_on_side<M: MapService + ?Sized>(
    map: &M,
    into: SegmentId,
    out: SegmentId,
    node: NodeId,
    angle: f64,
) -> usize {
    let name = name_of(map, into);
    let mut rank = 0;
    for &seg in map.segments_at(node) {
        if seg == into || seg == out || name_of(map, seg) == name || !map.segment_info(seg).allows(node) {
            continue;
        }
        let other = turn_angle(map, into, seg, node);
        let same_side = if angle > 0.0 { other >= 0.0 } else { other <= 0.0 };
        if !same_side {
            continue;
        }
        rank = rank.max(1);
        let sharper = if angle > 0.0 { other > angle } else { other < angle };
        if sharper {
            rank += 1;
        }
    }
    rank
}
