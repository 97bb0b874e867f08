//! Great-circle distances between coordinates.

use relief_types::GeoPoint;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Find the candidate closest to `point`.
///
/// Ties keep the first candidate in iteration order. Returns `None` when
/// there are no candidates.
pub fn nearest<K, I>(point: GeoPoint, candidates: I) -> Option<(K, f64)>
where
    I: IntoIterator<Item = (K, GeoPoint)>,
{
    let mut best: Option<(K, f64)> = None;
    for (key, location) in candidates {
        let distance = distance_km(point, location);
        let closer = best.as_ref().is_none_or(|(_, current)| distance < *current);
        if closer {
            best = Some((key, distance));
        }
    }
    best
}
