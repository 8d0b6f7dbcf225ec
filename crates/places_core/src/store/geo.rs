//! Spherical geometry for `$near` evaluation.

use serde_json::Value;

/// Sphere radius used for distance computations, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

/// Great-circle distance in meters between two `(longitude, latitude)` pairs.
pub fn haversine_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lon1, lat1) = (from.0.to_radians(), from.1.to_radians());
    let (lon2, lat2) = (to.0.to_radians(), to.1.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
}

/// Reads `(longitude, latitude)` from a GeoJSON `Point` value or the legacy
/// `{lat, lng}` shape.
///
/// Returns `None` for anything that is not a well-formed point.
pub fn point_coordinates(value: &Value) -> Option<(f64, f64)> {
    let object = value.as_object()?;
    if let (Some(lat), Some(lng)) = (object.get("lat"), object.get("lng")) {
        return Some((lng.as_f64()?, lat.as_f64()?));
    }
    if object.get("type").and_then(Value::as_str) != Some("Point") {
        return None;
    }
    match object.get("coordinates")?.as_array()?.as_slice() {
        [lon, lat] => Some((lon.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}
