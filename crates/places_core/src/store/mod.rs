//! Document store seam and its SQLite-backed implementation.
//!
//! # Responsibility
//! - Define the collection-scoped contract repositories depend on.
//! - Keep filter, pipeline and index semantics independent of SQLite.
//!
//! # Invariants
//! - Store failures surface as `StoreError` and are never retried here.
//! - Bulk inserts are all-or-nothing.

pub mod cursor;
pub mod document;
pub mod filter;
pub mod geo;
pub mod index;
pub mod pipeline;
mod sqlite;

use crate::db::DbError;
use thiserror::Error;

pub use cursor::Cursor;
pub use document::{Document, ID_FIELD};
pub use filter::{Filter, NearQuery};
pub use index::{IndexKind, IndexSpec};
pub use pipeline::{SortOrder, SortSpec, Stage};
pub use sqlite::{SqliteCollection, DEFAULT_PAGE_SIZE};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("document encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("duplicate document id `{0}`")]
    DuplicateId(String),
    #[error("index `{name}` not found on collection `{collection}`")]
    IndexNotFound { collection: String, name: String },
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Skip/limit applied by the store before results are materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    /// `None` and `Some(0)` both mean unbounded.
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn skip(mut self, count: u64) -> Self {
        self.skip = count;
        self
    }

    /// Caps the result count. A zero cap lifts the limit.
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count).filter(|&n| n > 0);
        self
    }

    /// Builds options from an offset and an optional cap.
    pub fn window(offset: u64, limit: Option<u64>) -> Self {
        Self {
            skip: offset,
            limit: limit.filter(|&n| n > 0),
        }
    }

    /// Maximum number of results, `usize::MAX` when unbounded.
    pub fn cap(&self) -> usize {
        match self.limit {
            None | Some(0) => usize::MAX,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FindOptions;

    #[test]
    fn zero_limit_means_unbounded() {
        assert_eq!(FindOptions::window(3, Some(0)).limit, None);
        assert_eq!(FindOptions::default().limit(0).limit, None);
        assert_eq!(FindOptions::default().limit(0).cap(), usize::MAX);

        let literal = FindOptions {
            skip: 0,
            limit: Some(0),
        };
        assert_eq!(literal.cap(), usize::MAX);
        assert_eq!(FindOptions::window(0, Some(2)).cap(), 2);
    }
}

/// Collection-scoped document store operations.
pub trait DocumentCollection {
    /// Collection name used in diagnostics.
    fn name(&self) -> &str;

    /// Inserts documents unchanged apart from `_id` assignment and returns
    /// their identifiers in input order.
    fn insert_many(&self, documents: Vec<Document>) -> StoreResult<Vec<String>>;

    /// Finds documents matching `filter` in store-native order, or by
    /// ascending distance when the filter holds a `Near` clause.
    fn find(&self, filter: &Filter, options: &FindOptions) -> StoreResult<Cursor<'_>>;

    /// Runs an ordered pipeline over the whole collection.
    fn aggregate(&self, stages: &[Stage]) -> StoreResult<Cursor<'_>>;

    /// Deletes the first matching document; returns the number removed.
    fn delete_one(&self, filter: &Filter) -> StoreResult<u64>;

    /// Creates an index and returns its derived name. Re-creating an
    /// identical index is a no-op.
    fn create_index(&self, spec: &IndexSpec) -> StoreResult<String>;

    fn drop_index(&self, name: &str) -> StoreResult<()>;

    fn count_documents(&self, filter: &Filter) -> StoreResult<u64> {
        self.find(filter, &FindOptions::default())?
            .try_fold(0u64, |count, item| item.map(|_| count + 1))
    }
}

impl<T: DocumentCollection + ?Sized> DocumentCollection for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn insert_many(&self, documents: Vec<Document>) -> StoreResult<Vec<String>> {
        (**self).insert_many(documents)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> StoreResult<Cursor<'_>> {
        (**self).find(filter, options)
    }

    fn aggregate(&self, stages: &[Stage]) -> StoreResult<Cursor<'_>> {
        (**self).aggregate(stages)
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        (**self).delete_one(filter)
    }

    fn create_index(&self, spec: &IndexSpec) -> StoreResult<String> {
        (**self).create_index(spec)
    }

    fn drop_index(&self, name: &str) -> StoreResult<()> {
        (**self).drop_index(name)
    }
}
