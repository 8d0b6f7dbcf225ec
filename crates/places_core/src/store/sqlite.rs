//! SQLite-backed document collection.
//!
//! # Responsibility
//! - Persist JSON documents per named collection in the `documents` table.
//! - Record secondary index descriptors in `collection_indexes`.
//! - Evaluate filters and pipelines in process over stored documents.
//!
//! # Invariants
//! - Store-native order is insertion order (`documents.seq`).
//! - `_id` values are UUID strings, unique per collection.
//! - `$near` queries require a 2dsphere index on the queried path.

use super::cursor::Cursor;
use super::document::{Document, ID_FIELD};
use super::filter::{Filter, NearQuery};
use super::index::{IndexKind, IndexSpec};
use super::pipeline::{pipeline_to_document, run_pipeline, validate_pipeline, Stage};
use super::{DocumentCollection, FindOptions, StoreError, StoreResult};
use log::{debug, error, info};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Instant;
use uuid::Uuid;

/// Rows fetched per round trip while iterating a plain find.
pub const DEFAULT_PAGE_SIZE: usize = 101;

const INSERT_DOCUMENT_SQL: &str =
    "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3);";

const PAGE_SQL: &str = "SELECT seq, body
FROM documents
WHERE collection = ?1 AND seq > ?2
ORDER BY seq ASC
LIMIT ?3 OFFSET ?4;";

/// One named collection inside a SQLite document store.
pub struct SqliteCollection<'conn> {
    conn: &'conn Connection,
    name: String,
    page_size: usize,
}

impl<'conn> SqliteCollection<'conn> {
    pub fn new(conn: &'conn Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the page size used by lazy scans. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns whether an index of `kind` exists on `path`.
    pub fn has_index(&self, path: &str, kind: IndexKind) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM collection_indexes
                WHERE collection = ?1 AND path = ?2 AND kind = ?3
            );",
            params![self.name, path, kind.as_db_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Lists index names and specs on this collection, sorted by name.
    pub fn list_indexes(&self) -> StoreResult<Vec<(String, IndexSpec)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, path, kind FROM collection_indexes
             WHERE collection = ?1
             ORDER BY name ASC;",
        )?;
        let rows = stmt.query_map([self.name.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut indexes = Vec::new();
        for row in rows {
            let (name, path, kind_text) = row?;
            let kind = IndexKind::parse(&kind_text).ok_or_else(|| {
                StoreError::InvalidDocument(format!(
                    "invalid index kind `{kind_text}` in collection_indexes.kind"
                ))
            })?;
            indexes.push((name, IndexSpec::new(path, kind)));
        }
        Ok(indexes)
    }

    fn scan(&self, skip: u64) -> PagedScan<'conn> {
        PagedScan {
            conn: self.conn,
            collection: self.name.clone(),
            page_size: self.page_size,
            last_seq: 0,
            pending_offset: skip,
            buffer: VecDeque::new(),
            failure: None,
            exhausted: false,
        }
    }

    fn find_by_doc_id(&self, id: &str) -> StoreResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                params![self.name, id],
                |row| row.get(0),
            )
            .optional()?;
        body.as_deref().map(parse_body).transpose()
    }

    fn find_near(
        &self,
        filter: &Filter,
        near: &NearQuery,
        options: &FindOptions,
    ) -> StoreResult<Cursor<'_>> {
        if !self.has_index(&near.path, IndexKind::TwoDSphere)? {
            return Err(StoreError::IndexNotFound {
                collection: self.name.clone(),
                name: IndexSpec::geo_2dsphere(near.path.as_str()).name(),
            });
        }
        if let Some(max) = near.max_distance {
            if !max.is_finite() || max < 0.0 {
                return Err(StoreError::InvalidQuery(format!(
                    "$maxDistance must be a non-negative number, got {max}"
                )));
            }
        }

        let mut hits = Vec::new();
        for item in self.scan(0) {
            let doc = item?;
            if !filter.matches(&doc) {
                continue;
            }
            if let Some(distance) = near.distance_to(&doc) {
                hits.push((distance, doc));
            }
        }
        hits.sort_by(|left, right| left.0.total_cmp(&right.0));

        let documents = hits
            .into_iter()
            .map(|(_, doc)| doc)
            .skip(to_usize(options.skip))
            .take(options.cap())
            .collect();
        Ok(Cursor::from_documents(documents))
    }
}

impl DocumentCollection for SqliteCollection<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_many(&self, documents: Vec<Document>) -> StoreResult<Vec<String>> {
        let started_at = Instant::now();
        let count = documents.len();
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(count);
        {
            let mut stmt = tx.prepare(INSERT_DOCUMENT_SQL)?;
            for mut doc in documents {
                let id = assign_id(&mut doc)?;
                let body = serde_json::to_string(&doc)?;
                stmt.execute(params![self.name, id, body])
                    .map_err(|err| duplicate_or_db(err, &id))?;
                ids.push(id);
            }
        }
        tx.commit()?;

        info!(
            "event=insert_many module=store status=ok collection={} count={} duration_ms={}",
            self.name,
            count,
            started_at.elapsed().as_millis()
        );
        Ok(ids)
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> StoreResult<Cursor<'_>> {
        debug!(
            "event=find module=store collection={} filter={} skip={} limit={:?}",
            self.name,
            filter.to_document(),
            options.skip,
            options.limit
        );

        if let Some(near) = filter.near_query() {
            return self.find_near(filter, near, options);
        }

        if let Some(id) = filter.id_lookup() {
            let documents: Vec<Document> = self
                .find_by_doc_id(id)?
                .into_iter()
                .skip(to_usize(options.skip))
                .take(options.cap())
                .collect();
            return Ok(Cursor::from_documents(documents));
        }

        let limit = options.cap();
        if matches!(filter, Filter::All) {
            return Ok(Cursor::new(self.scan(options.skip).take(limit)));
        }

        // Errors are never counted against the skip.
        let filter = filter.clone();
        let mut to_skip = options.skip;
        let matching = self.scan(0).filter(move |item| match item {
            Ok(doc) if filter.matches(doc) => {
                if to_skip == 0 {
                    return true;
                }
                to_skip -= 1;
                false
            }
            Ok(_) => false,
            Err(_) => true,
        });
        Ok(Cursor::new(matching.take(limit)))
    }

    fn aggregate(&self, stages: &[Stage]) -> StoreResult<Cursor<'_>> {
        let started_at = Instant::now();
        validate_pipeline(stages)?;
        debug!(
            "event=aggregate module=store status=start collection={} pipeline={}",
            self.name,
            pipeline_to_document(stages)
        );

        let documents = self.scan(0).collect::<StoreResult<Vec<_>>>()?;
        let output = run_pipeline(documents, stages)?;

        debug!(
            "event=aggregate module=store status=ok collection={} stages={} rows={} duration_ms={}",
            self.name,
            stages.len(),
            output.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Cursor::from_documents(output))
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        let target = match filter.id_lookup() {
            Some(id) => Some(id.to_string()),
            None => {
                let mut found = None;
                for item in self.find(filter, &FindOptions::default().limit(1))? {
                    found = item?
                        .get(ID_FIELD)
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                found
            }
        };

        let Some(id) = target else {
            return Ok(0);
        };
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![self.name, id],
        )?;
        info!(
            "event=delete_one module=store status=ok collection={} removed={}",
            self.name, removed
        );
        Ok(removed as u64)
    }

    fn create_index(&self, spec: &IndexSpec) -> StoreResult<String> {
        let name = spec.name();
        self.conn.execute(
            "INSERT INTO collection_indexes (collection, name, path, kind)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, name) DO NOTHING;",
            params![self.name, name, spec.path, spec.kind.as_db_str()],
        )?;
        info!(
            "event=create_index module=store status=ok collection={} index={}",
            self.name, name
        );
        Ok(name)
    }

    fn drop_index(&self, name: &str) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM collection_indexes WHERE collection = ?1 AND name = ?2;",
            params![self.name, name],
        )?;
        if removed == 0 {
            error!(
                "event=drop_index module=store status=error collection={} index={} error_code=index_not_found",
                self.name, name
            );
            return Err(StoreError::IndexNotFound {
                collection: self.name.clone(),
                name: name.to_string(),
            });
        }
        info!(
            "event=drop_index module=store status=ok collection={} index={}",
            self.name, name
        );
        Ok(())
    }
}

/// Lazy insertion-order scan that fetches one page per round trip.
struct PagedScan<'conn> {
    conn: &'conn Connection,
    collection: String,
    page_size: usize,
    last_seq: i64,
    /// Offset applied to the first page only.
    pending_offset: u64,
    buffer: VecDeque<Document>,
    /// Raised after the rows preceding it in the same page are yielded.
    failure: Option<StoreError>,
    exhausted: bool,
}

impl PagedScan<'_> {
    fn fetch_page(&mut self) -> StoreResult<()> {
        let mut stmt = self.conn.prepare_cached(PAGE_SQL)?;
        let rows = stmt.query_map(
            params![
                self.collection,
                self.last_seq,
                i64::try_from(self.page_size).unwrap_or(i64::MAX),
                i64::try_from(self.pending_offset).unwrap_or(i64::MAX),
            ],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )?;

        let mut page = Vec::with_capacity(self.page_size);
        let mut failure = None;
        for row in rows {
            match row
                .map_err(StoreError::from)
                .and_then(|(seq, body)| Ok((seq, parse_body(&body)?)))
            {
                Ok((seq, doc)) => {
                    self.last_seq = seq;
                    page.push(doc);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.pending_offset = 0;
        if failure.is_some() || page.len() < self.page_size {
            self.exhausted = true;
        }
        self.buffer.extend(page);
        self.failure = failure;
        Ok(())
    }
}

impl Iterator for PagedScan<'_> {
    type Item = StoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(doc) = self.buffer.pop_front() {
                return Some(Ok(doc));
            }
            if let Some(err) = self.failure.take() {
                return Some(Err(err));
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}

fn assign_id(doc: &mut Document) -> StoreResult<String> {
    let id = match doc.get(ID_FIELD) {
        None | Some(Value::Null) => Uuid::new_v4(),
        Some(Value::String(text)) => Uuid::parse_str(text).map_err(|_| {
            StoreError::InvalidDocument(format!("`_id` must be a UUID string, got `{text}`"))
        })?,
        Some(other) => {
            return Err(StoreError::InvalidDocument(format!(
                "`_id` must be a UUID string, got `{other}`"
            )));
        }
    };
    let id = id.to_string();
    doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    Ok(id)
}

fn parse_body(body: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::InvalidDocument(format!(
            "stored body is not an object: {other}"
        ))),
    }
}

fn duplicate_or_db(err: rusqlite::Error, id: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateId(id.to_string())
        }
        other => other.into(),
    }
}

fn to_usize(count: u64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}
