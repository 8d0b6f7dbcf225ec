//! Lazy result cursors.

use super::document::Document;
use super::StoreResult;

/// Lazy, finite, non-restartable sequence of documents.
///
/// Iteration may hit the store at page boundaries; each page failure is
/// yielded as an `Err` item and ends the cursor.
pub struct Cursor<'a> {
    inner: Box<dyn Iterator<Item = StoreResult<Document>> + 'a>,
}

impl<'a> Cursor<'a> {
    pub fn new(inner: impl Iterator<Item = StoreResult<Document>> + 'a) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Cursor over already materialized documents.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self::new(documents.into_iter().map(Ok))
    }

    /// Drains the cursor, stopping at the first error.
    pub fn try_collect(self) -> StoreResult<Vec<Document>> {
        self.collect()
    }
}

impl Iterator for Cursor<'_> {
    type Item = StoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}
