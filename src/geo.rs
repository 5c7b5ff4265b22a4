use crate::providers::overpass::{LatLon, OsmElement};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean of the points. Good enough for building-sized ways.
pub fn centroid(points: &[LatLon]) -> Option<LatLon> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    Some(LatLon {
        lat: lat / n,
        lon: lon / n,
    })
}

/// Representative coordinate of an element: its own point for nodes, the
/// server-computed center for ways, else the centroid of its geometry.
pub fn element_position(element: &OsmElement) -> Option<LatLon> {
    if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
        return Some(LatLon { lat, lon });
    }
    element
        .center
        .or_else(|| element.geometry.as_deref().and_then(centroid))
}
