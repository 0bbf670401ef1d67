//! Great-circle distances and window centroids.

use super::fix::Fix;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two coordinates in radians.
///
/// Inputs must already be converted from degrees.
pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let sdlat = ((lat2 - lat1) / 2.0).sin();
    let sdlng = ((lng2 - lng1) / 2.0).sin();

    let q = sdlat * sdlat + lat1.cos() * lat2.cos() * sdlng * sdlng;

    // Rounding can push antipodal points marginally past 1.
    2.0 * EARTH_RADIUS_KM * q.sqrt().min(1.0).asin()
}

/// A coordinate in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another position, in metres.
    pub fn distance_m(&self, other: &Position) -> f64 {
        let km = haversine(
            self.latitude.to_radians(),
            self.longitude.to_radians(),
            other.latitude.to_radians(),
            other.longitude.to_radians(),
        );

        km * 1000.0
    }
}

/// Mean latitude and longitude of a set of fixes.
///
/// Returns `None` for an empty set.
pub fn centroid(fixes: &[Fix]) -> Option<Position> {
    if fixes.is_empty() {
        return None;
    }

    let n = fixes.len() as f64;
    let (lat, lng) = fixes
        .iter()
        .fold((0.0, 0.0), |(lat, lng), f| (lat + f.latitude, lng + f.longitude));

    Some(Position::new(lat / n, lng / n))
}
