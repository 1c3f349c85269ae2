//! Planar approximations of geographic distance and heading.
//!
//! Distances use Pythagoras on an equirectangular projection around the mean
//! latitude of the two points, which is accurate to well under a percent at
//! city scale.

use crate::models::LatLon;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_372_797.560856;

/// Converts meters travelled at `speed_kmh` into minutes.
///
/// # Examples
///
/// ```
/// use u_courier::network::geometry::minutes_at;
///
/// assert!((minutes_at(1000.0, 60.0) - 1.0).abs() < 1e-12);
/// ```
pub fn minutes_at(meters: f64, speed_kmh: f64) -> f64 {
    meters / 1000.0 / speed_kmh * 60.0
}

/// Distance in meters between two positions.
///
/// # Examples
///
/// ```
/// use u_courier::models::LatLon;
/// use u_courier::network::geometry::distance_between;
///
/// let a = LatLon::new(0.0, 0.0);
/// let b = LatLon::new(0.0, 1.0);
/// // One degree of longitude on the equator is roughly 111 km.
/// assert!((distance_between(a, b) - 111_226.0).abs() < 100.0);
/// ```
pub fn distance_between(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let lon1 = a.lon.to_radians();
    let lon2 = b.lon.to_radians();

    let avg_lat = (lat1 + lat2) / 2.0;
    let x = (lon2 - lon1) * avg_lat.cos();
    let y = lat2 - lat1;
    EARTH_RADIUS_M * (x * x + y * y).sqrt()
}

/// Length in meters of a polyline.
pub fn polyline_length(points: &[LatLon]) -> f64 {
    points
        .windows(2)
        .map(|w| distance_between(w[0], w[1]))
        .sum()
}

/// Heading from `a` to `b` in degrees, counter-clockwise from east, in
/// `[0, 360)`. Uses raw coordinate deltas.
pub fn heading(a: LatLon, b: LatLon) -> f64 {
    let angle = (b.lat - a.lat).atan2(b.lon - a.lon).to_degrees();
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Longitude offset in degrees that spans `meters` along the equator.
///
/// Handy for laying out test networks where distance must be exact.
pub fn equator_degrees_for(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}
