//! Place entity and its raw-document mapping.
//!
//! # Invariants
//! - Missing `geometry.geolocation` is a construction error.
//! - Missing `address_components` yields `None`, not an empty list.

use super::address_component::AddressComponent;
use super::id::PlaceId;
use super::point::Point;
use super::{ModelError, ModelResult};
use crate::store::document::get_path;
use crate::store::{Document, ID_FIELD};
use serde_json::Value;

/// Path of the indexed location field.
pub const GEOLOCATION_FIELD: &str = "geometry.geolocation";
pub const ADDRESS_COMPONENTS_FIELD: &str = "address_components";
pub const FORMATTED_ADDRESS_FIELD: &str = "formatted_address";

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Absent until the store has assigned one.
    pub id: Option<PlaceId>,
    pub formatted_address: Option<String>,
    pub location: Point,
    pub address_components: Option<Vec<AddressComponent>>,
}

impl Place {
    pub fn new(formatted_address: impl Into<String>, location: Point) -> Self {
        Self {
            id: None,
            formatted_address: Some(formatted_address.into()),
            location,
            address_components: None,
        }
    }

    /// Maps one raw document to an entity.
    pub fn from_document(doc: &Document) -> ModelResult<Self> {
        let location = get_path(doc, GEOLOCATION_FIELD)
            .filter(|value| !value.is_null())
            .ok_or(ModelError::MissingGeometry)
            .and_then(Point::from_document)?;

        let id = match doc.get(ID_FIELD) {
            Some(Value::String(text)) => Some(PlaceId::parse(text)?),
            _ => None,
        };

        let address_components = match doc.get(ADDRESS_COMPONENTS_FIELD) {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value::<Vec<AddressComponent>>(value.clone())
                    .map_err(|err| ModelError::InvalidAddressComponents(err.to_string()))?,
            ),
        };

        Ok(Self {
            id,
            formatted_address: doc
                .get(FORMATTED_ADDRESS_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            location,
            address_components,
        })
    }

    /// Store wire form; `_id` is only written when assigned.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        if let Some(id) = self.id {
            doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        }
        if let Some(address) = &self.formatted_address {
            doc.insert(
                FORMATTED_ADDRESS_FIELD.to_string(),
                Value::String(address.clone()),
            );
        }
        let mut geometry = Document::new();
        geometry.insert("geolocation".to_string(), self.location.to_document());
        doc.insert("geometry".to_string(), Value::Object(geometry));
        if let Some(components) = &self.address_components {
            doc.insert(
                ADDRESS_COMPONENTS_FIELD.to_string(),
                Value::Array(components.iter().map(AddressComponent::to_value).collect()),
            );
        }
        doc
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Iterates address components; empty when the document had none.
    pub fn components(&self) -> impl Iterator<Item = &AddressComponent> {
        self.address_components.iter().flatten()
    }

    /// Long name of the first component tagged `country`.
    pub fn country(&self) -> Option<&str> {
        self.components()
            .find(|component| component.has_type("country"))
            .map(|component| component.long_name.as_str())
    }
}
