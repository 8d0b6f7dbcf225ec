//! Photo lookup by referenced place.
//!
//! # Invariants
//! - The place reference is weak: photos of deleted places still resolve.
//! - An unpersisted place has no photos.

use super::{RepoError, RepoResult};
use crate::model::id::PlaceId;
use crate::model::photo::{Photo, PHOTO_PLACE_FIELD};
use crate::model::place::Place;
use crate::store::{Cursor, Document, DocumentCollection, Filter, FindOptions};

/// Lazy sequence of photos; each item fails independently.
pub struct PhotoCursor<'a> {
    inner: Cursor<'a>,
}

impl Iterator for PhotoCursor<'_> {
    type Item = RepoResult<Photo>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.inner.next()?;
        Some(
            doc.map_err(RepoError::from)
                .and_then(|doc| Ok(Photo::from_document(doc)?)),
        )
    }
}

pub struct PhotoRepository<C> {
    collection: C,
}

impl<C: DocumentCollection> PhotoRepository<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn insert_all(&self, documents: Vec<Document>) -> RepoResult<usize> {
        Ok(self.collection.insert_many(documents)?.len())
    }

    /// Raw photo documents referencing `place_id`, in store-native order.
    pub fn find_by_place_id(
        &self,
        place_id: &PlaceId,
        offset: u64,
        limit: Option<u64>,
    ) -> RepoResult<Cursor<'_>> {
        let filter = Filter::eq(PHOTO_PLACE_FIELD, place_id.to_string());
        Ok(self
            .collection
            .find(&filter, &FindOptions::window(offset, limit))?)
    }

    pub fn photos_for_place(
        &self,
        place: &Place,
        offset: u64,
        limit: Option<u64>,
    ) -> RepoResult<PhotoCursor<'_>> {
        let inner = match place.id {
            Some(id) => self.find_by_place_id(&id, offset, limit)?,
            None => Cursor::from_documents(Vec::new()),
        };
        Ok(PhotoCursor { inner })
    }
}
