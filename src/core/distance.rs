use crate::models::Location;
use geo::{GeodesicDistance, Point};

const METERS_PER_KM: f64 = 1000.0;

/// Calculate the geodesic distance between two points in kilometers
///
/// Uses Karney's algorithm on the WGS-84 ellipsoid rather than a spherical
/// approximation. Identical coordinates yield exactly 0.
///
/// # Arguments
/// * `from` - Origin, usually the requesting user
/// * `to` - Destination, usually a product's location
///
/// # Returns
/// Distance in kilometers, never negative
#[inline]
pub fn geodesic_distance_km(from: Location, to: Location) -> f64 {
    if from == to {
        return 0.0;
    }

    // geo points are (x = longitude, y = latitude)
    let origin = Point::new(from.longitude, from.latitude);
    let destination = Point::new(to.longitude, to.latitude);

    (origin.geodesic_distance(&destination) / METERS_PER_KM).max(0.0)
}
