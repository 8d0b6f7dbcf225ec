//! Place repository over an injected document collection.
//!
//! # Responsibility
//! - Bulk ingestion, id lookup, listing and deletion of places.
//! - Run the derived-view pipelines and the proximity query.
//! - Manage the 2dsphere index on `geometry.geolocation`.
//!
//! # Invariants
//! - Identifiers are parsed before any store call is issued.
//! - Offset and limit are pushed into the store query.
//! - A document that fails to map only fails its own cursor item.

use super::{RepoError, RepoResult};
use crate::model::id::PlaceId;
use crate::model::place::{Place, GEOLOCATION_FIELD};
use crate::model::point::Point;
use crate::query::aggregation::{
    country_names_pipeline, flattened_components_pipeline, ids_by_country_code_pipeline,
    ComponentsQuery,
};
use crate::query::proximity::near_filter;
use crate::store::{Cursor, Document, DocumentCollection, Filter, FindOptions, IndexSpec, ID_FIELD};
use log::{info, warn};
use serde_json::Value;
use std::io::Read;
use std::time::Instant;

const SHORT_NAME_FIELD: &str = "address_components.short_name";

/// Lazy sequence of places mapped from a store cursor.
///
/// Finite and not restartable; each item fails independently.
pub struct PlaceCursor<'a> {
    inner: Cursor<'a>,
}

impl Iterator for PlaceCursor<'_> {
    type Item = RepoResult<Place>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = match self.inner.next()? {
            Ok(doc) => doc,
            Err(err) => return Some(Err(err.into())),
        };
        Some(Place::from_document(&doc).map_err(|err| {
            warn!(
                "event=place_map module=repo status=error id={} error={err}",
                doc.get(ID_FIELD).and_then(Value::as_str).unwrap_or("-")
            );
            RepoError::from(err)
        }))
    }
}

/// Wraps a raw cursor so it yields places.
pub fn to_places(cursor: Cursor<'_>) -> PlaceCursor<'_> {
    PlaceCursor { inner: cursor }
}

pub struct PlaceRepository<C> {
    collection: C,
}

impl<C: DocumentCollection> PlaceRepository<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Inserts raw documents unchanged; the batch succeeds or fails whole.
    pub fn insert_all(&self, documents: Vec<Document>) -> RepoResult<usize> {
        let ids = self.collection.insert_many(documents)?;
        Ok(ids.len())
    }

    /// Reads a JSON array of documents from `reader` and inserts them.
    ///
    /// Nothing is inserted if the input is not an array of objects.
    pub fn load_all(&self, reader: impl Read) -> RepoResult<usize> {
        let started_at = Instant::now();
        let parsed: Value = serde_json::from_reader(reader)?;
        let Value::Array(items) = parsed else {
            return Err(RepoError::InvalidLoad(
                "expected a top-level JSON array".to_string(),
            ));
        };

        let documents = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| match item {
                Value::Object(doc) => Ok(doc),
                other => Err(RepoError::InvalidLoad(format!(
                    "element {position} is not an object: {other}"
                ))),
            })
            .collect::<RepoResult<Vec<_>>>()?;

        let inserted = self.insert_all(documents)?;
        info!(
            "event=load_all module=repo status=ok collection={} count={} duration_ms={}",
            self.collection.name(),
            inserted,
            started_at.elapsed().as_millis()
        );
        Ok(inserted)
    }

    /// Looks up one place; `Ok(None)` when no document has this id.
    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Place>> {
        let id = PlaceId::parse(id)?;
        let mut cursor = self
            .collection
            .find(&Filter::by_id(id.to_string()), &FindOptions::default().limit(1))?;
        match cursor.next() {
            Some(doc) => Ok(Some(Place::from_document(&doc?)?)),
            None => Ok(None),
        }
    }

    /// All places in store-native order, skipping `offset`, capped at `limit`.
    pub fn find_all(&self, offset: u64, limit: Option<u64>) -> RepoResult<PlaceCursor<'_>> {
        let cursor = self
            .collection
            .find(&Filter::All, &FindOptions::window(offset, limit))?;
        Ok(to_places(cursor))
    }

    /// Raw documents where any component's short name equals `short_name`
    /// exactly.
    pub fn find_by_short_name(&self, short_name: &str) -> RepoResult<Cursor<'_>> {
        let filter = Filter::eq(SHORT_NAME_FIELD, short_name);
        Ok(self.collection.find(&filter, &FindOptions::default())?)
    }

    /// Removes the place's document. Absent documents are not an error.
    pub fn delete(&self, place: &Place) -> RepoResult<()> {
        let Some(id) = place.id else {
            return Ok(());
        };
        let removed = self.collection.delete_one(&Filter::by_id(id.to_string()))?;
        info!("event=place_delete module=repo status=ok id={id} removed={removed}");
        Ok(())
    }

    pub fn create_geo_index(&self) -> RepoResult<String> {
        Ok(self
            .collection
            .create_index(&IndexSpec::geo_2dsphere(GEOLOCATION_FIELD))?)
    }

    pub fn drop_geo_index(&self) -> RepoResult<()> {
        let name = IndexSpec::geo_2dsphere(GEOLOCATION_FIELD).name();
        Ok(self.collection.drop_index(&name)?)
    }

    /// Flattened components view; one raw row per address component.
    pub fn address_components(&self, query: &ComponentsQuery) -> RepoResult<Cursor<'_>> {
        Ok(self
            .collection
            .aggregate(&flattened_components_pipeline(query))?)
    }

    /// Distinct long names of country components.
    pub fn country_names(&self) -> RepoResult<Vec<String>> {
        let mut names = Vec::new();
        for row in self.collection.aggregate(&country_names_pipeline())? {
            if let Some(name) = row?.get(ID_FIELD).and_then(Value::as_str) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    pub fn find_ids_by_country_code(&self, country_code: &str) -> RepoResult<Vec<PlaceId>> {
        self.collection
            .aggregate(&ids_by_country_code_pipeline(country_code))?
            .map(|row| -> RepoResult<PlaceId> {
                let row = row?;
                let id = row.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default();
                Ok(PlaceId::parse(id)?)
            })
            .collect()
    }

    /// Raw documents nearest `point` first, within `max_meters` when set.
    ///
    /// Both the GeoJSON and the legacy `{lat, lng}` point shapes are
    /// matched. Fails with the store's index error when the geo index is
    /// missing.
    pub fn near(&self, point: &Point, max_meters: Option<f64>) -> RepoResult<Cursor<'_>> {
        Ok(self
            .collection
            .find(&near_filter(point, max_meters), &FindOptions::default())?)
    }

    /// Places nearest to `place`'s own location. The place itself is
    /// included when stored, at distance zero.
    pub fn near_place(
        &self,
        place: &Place,
        max_meters: Option<f64>,
    ) -> RepoResult<PlaceCursor<'_>> {
        Ok(to_places(self.near(&place.location, max_meters)?))
    }
}
