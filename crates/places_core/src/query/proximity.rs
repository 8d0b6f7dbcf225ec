//! Geospatial nearness filter.
//!
//! Results of a `$near` find come back ordered by ascending distance from
//! the query point. An unset bound queries an unbounded radius. The
//! 2dsphere index on `geometry.geolocation` must already exist; it is
//! never created on demand.

use crate::model::place::GEOLOCATION_FIELD;
use crate::model::point::Point;
use crate::store::{Filter, NearQuery};

/// Places within `max_meters` of `point`, nearest first.
pub fn near_filter(point: &Point, max_meters: Option<f64>) -> Filter {
    Filter::Near(NearQuery {
        path: GEOLOCATION_FIELD.to_string(),
        longitude: point.longitude,
        latitude: point.latitude,
        max_distance: max_meters,
    })
}
