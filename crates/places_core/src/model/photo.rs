//! Photo read model.
//!
//! Photos live in their own collection; this crate only resolves them by
//! the place they reference.

use super::id::PlaceId;
use super::point::Point;
use super::{ModelError, ModelResult};
use crate::store::{Document, ID_FIELD};
use serde_json::Value;

/// Path of the place reference inside a photo document.
pub const PHOTO_PLACE_FIELD: &str = "metadata.place";

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: Option<String>,
    /// Weak reference; the place may no longer exist.
    pub place_id: Option<PlaceId>,
    pub location: Option<Point>,
    /// Untouched source document for fields this crate does not model.
    pub raw: Document,
}

impl Photo {
    pub fn from_document(doc: Document) -> ModelResult<Self> {
        let metadata = doc.get("metadata").and_then(Value::as_object);

        let place_id = metadata
            .and_then(|metadata| metadata.get("place"))
            .and_then(Value::as_str)
            .map(PlaceId::parse)
            .transpose()
            .map_err(ModelError::from)?;
        let location = metadata
            .and_then(|metadata| metadata.get("location"))
            .map(Point::from_document)
            .transpose()?;

        Ok(Self {
            id: doc.get(ID_FIELD).and_then(Value::as_str).map(str::to_string),
            place_id,
            location,
            raw: doc,
        })
    }
}
