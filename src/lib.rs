//! # u-courier
//!
//! Single-courier pickup-and-delivery routing over a road network. Given
//! delivery requests (pickup and dropoff intersections) and candidate depots,
//! finds a fast route that starts and ends at a depot and visits every pickup
//! before its dropoff, expressed as a sequence of street segments.
//!
//! ## Modules
//!
//! - [`models`] — Identifiers, positions, segments, requests and solutions
//! - [`network`] — Road network interface and an in-memory implementation
//! - [`pathfinding`] — Turn-aware A* and multi-target Dijkstra
//! - [`proximity`] — Parallel precomputation of stop-to-stop travel times
//! - [`precedence`] — Pickup-before-dropoff bookkeeping
//! - [`tour`] — Stop sequences, initial construction and local moves
//! - [`optimizer`] — Parallel portfolio of improvement heuristics
//! - [`evaluation`] — Independent legality checks for stops and routes
//! - [`directions`] — Turn-by-turn instructions for a segment path
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use u_courier::models::{DeliveryRequest, LatLon, SegmentInfo};
//! use u_courier::network::StreetNetwork;
//! use u_courier::optimizer::SolverConfig;
//!
//! let mut b = StreetNetwork::builder();
//! for i in 0..5 {
//!     b.add_node(LatLon::new(0.0, i as f64 * 0.01));
//! }
//! let street = b.add_street("Harbour Rd");
//! for i in 0..4 {
//!     b.add_segment(SegmentInfo::new(i, i + 1, street, 40.0));
//! }
//! let map = b.build().unwrap();
//!
//! let requests = [DeliveryRequest::new(1, 3), DeliveryRequest::new(2, 4)];
//! let config = SolverConfig::default().with_time_limit(Duration::from_millis(100));
//! let route = u_courier::solve_courier(&map, &requests, &[0], &config).unwrap();
//! assert_eq!(route, vec![0, 1, 2, 3, 3, 2, 1, 0]);
//! ```

pub mod directions;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod network;
pub mod optimizer;
pub mod pathfinding;
pub mod precedence;
pub mod proximity;
pub mod tour;

mod parallel;
#[cfg(test)]
mod test_support;

pub use error::{CourierError, NetworkError};
pub use optimizer::solve_courier;
