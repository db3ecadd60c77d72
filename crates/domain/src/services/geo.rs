//! Geospatial primitives.
//!
//! Great-circle math only. Planar Euclidean distance diverges materially
//! from real surface distance at any non-trivial radius, so containment
//! is always computed with the haversine formula.

use geo::{point, HaversineDistance};

use crate::models::Geofence;

/// Great-circle distance in meters between two (latitude, longitude)
/// pairs, in decimal degrees.
pub fn distance_meters(a: (f64, f64), b: (f64, f64)) -> f64 {
    let pa = point!(x: a.1, y: a.0);
    let pb = point!(x: b.1, y: b.0);
    pa.haversine_distance(&pb)
}

/// Whether the probe point lies within the fence radius of its center.
///
/// Pure and total: inputs are validated upstream, no validation here.
pub fn fence_contains(fence: &Geofence, latitude: f64, longitude: f64) -> bool {
    distance_meters((fence.latitude, fence.longitude), (latitude, longitude))
        <= fence.radius_meters
}
