//! Road network access.
//!
//! - [`MapService`] — Read-only interface the routing core consumes
//! - [`StreetNetwork`] — In-memory implementation with an R-tree node index
//! - [`geometry`] — Equirectangular distance and heading helpers

pub mod geometry;
mod service;
mod street_network;

pub use service::MapService;
pub use street_network::{StreetNetwork, StreetNetworkBuilder, UNKNOWN_STREET};
