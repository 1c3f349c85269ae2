//! Identifier aliases and geographic positions.

use serde::{Deserialize, Serialize};

/// Identity of a road-network intersection.
pub type NodeId = usize;

/// Identity of a street segment joining two intersections.
pub type SegmentId = usize;

/// Identity of a named street. Consecutive segments on different streets
/// imply a turn.
pub type StreetId = usize;

/// A geographic position in decimal degrees.
///
/// # Examples
///
/// ```
/// use u_courier::models::LatLon;
///
/// let p = LatLon::new(43.66, -79.39);
/// assert_eq!(p.lat, 43.66);
/// assert!(p.is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// Creates a position from latitude and longitude in degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}
