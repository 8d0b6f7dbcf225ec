#![allow(dead_code)]

use places_core::Document;
use serde_json::{json, Value};

pub const BALTIMORE: (f64, f64) = (-76.6122, 39.2904);
pub const WASHINGTON: (f64, f64) = (-77.0369, 38.9072);
pub const TORONTO: (f64, f64) = (-79.3832, 43.6532);
pub const PARIS: (f64, f64) = (2.3522, 48.8566);

pub fn doc(value: Value) -> Document {
    value
        .as_object()
        .cloned()
        .expect("fixture must be a JSON object")
}

fn component(long_name: &str, short_name: &str, types: &[&str]) -> Value {
    json!({"long_name": long_name, "short_name": short_name, "types": types})
}

pub fn place_doc(address: &str, (lng, lat): (f64, f64), components: Vec<Value>) -> Document {
    doc(json!({
        "formatted_address": address,
        "geometry": {"geolocation": {"type": "Point", "coordinates": [lng, lat]}},
        "address_components": components,
    }))
}

pub fn baltimore() -> Document {
    place_doc(
        "Baltimore, MD, USA",
        BALTIMORE,
        vec![
            component("Baltimore", "Baltimore", &["locality", "political"]),
            component("Maryland", "MD", &["administrative_area_level_1", "political"]),
            component("United States", "US", &["country", "political"]),
        ],
    )
}

pub fn washington() -> Document {
    place_doc(
        "Washington, DC, USA",
        WASHINGTON,
        vec![
            component("Washington", "Washington", &["locality", "political"]),
            component("District of Columbia", "DC", &["administrative_area_level_1", "political"]),
            component("United States", "US", &["country", "political"]),
        ],
    )
}

pub fn toronto() -> Document {
    place_doc(
        "Toronto, ON, Canada",
        TORONTO,
        vec![
            component("Toronto", "Toronto", &["locality", "political"]),
            component("Ontario", "ON", &["administrative_area_level_1", "political"]),
            component("Canada", "CA", &["country", "political"]),
        ],
    )
}

pub fn paris() -> Document {
    place_doc(
        "Paris, France",
        PARIS,
        vec![
            component("Paris", "Paris", &["locality", "political"]),
            component("France", "FR", &["country", "political"]),
        ],
    )
}

/// Place in the original bulk export format with no address components.
pub fn bare_place(address: &str, location: (f64, f64)) -> Document {
    let mut place = place_doc(address, location, Vec::new());
    place.remove("address_components");
    place
}

pub fn all_cities() -> Vec<Document> {
    vec![baltimore(), washington(), toronto(), paris()]
}
