//! Geographic point and its GeoJSON wire form.

use super::{ModelError, ModelResult};
use serde_json::{json, Value};

/// Longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Parses `{type: "Point", coordinates: [lng, lat]}`.
    ///
    /// The older `{lat, lng}` shape found in some exports is accepted too.
    pub fn from_document(value: &Value) -> ModelResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ModelError::InvalidGeometry(format!("expected an object, got {value}"))
        })?;

        if let (Some(lat), Some(lng)) = (object.get("lat"), object.get("lng")) {
            return Ok(Self::new(coordinate(lng)?, coordinate(lat)?));
        }

        match object.get("type").and_then(Value::as_str) {
            Some("Point") => {}
            other => {
                return Err(ModelError::InvalidGeometry(format!(
                    "expected type `Point`, got {other:?}"
                )));
            }
        }

        let coordinates = object
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(|| ModelError::InvalidGeometry("missing coordinates".to_string()))?;
        match coordinates.as_slice() {
            [lng, lat] => Ok(Self::new(coordinate(lng)?, coordinate(lat)?)),
            other => Err(ModelError::InvalidGeometry(format!(
                "expected 2 coordinates, got {}",
                other.len()
            ))),
        }
    }

    pub fn to_document(&self) -> Value {
        json!({
            "type": "Point",
            "coordinates": [self.longitude, self.latitude],
        })
    }
}

fn coordinate(value: &Value) -> ModelResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| ModelError::InvalidGeometry(format!("non-numeric coordinate {value}")))
}
