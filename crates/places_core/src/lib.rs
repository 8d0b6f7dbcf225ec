//! Core domain logic for geographic places backed by a document store.
//!
//! Repositories take an injected `DocumentCollection`; the bundled
//! implementation stores documents in SQLite and evaluates filters and
//! aggregation pipelines in process.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod store;

pub use config::{ConfigError, LoggingConfig, PlacesConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::address_component::AddressComponent;
pub use model::id::PlaceId;
pub use model::photo::Photo;
pub use model::place::Place;
pub use model::point::Point;
pub use model::{InvalidIdentifier, ModelError};
pub use query::aggregation::ComponentsQuery;
pub use repo::photo_repo::{PhotoCursor, PhotoRepository};
pub use repo::place_repo::{to_places, PlaceCursor, PlaceRepository};
pub use repo::{RepoError, RepoResult};
pub use store::{
    Cursor, Document, DocumentCollection, Filter, FindOptions, IndexKind, IndexSpec, SortOrder,
    SortSpec, SqliteCollection, Stage, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
