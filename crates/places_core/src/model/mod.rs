//! Place domain model.
//!
//! # Responsibility
//! - Define typed records for places, their address components and points.
//! - Own the parse boundary from raw store documents to entities.
//!
//! # Invariants
//! - A place always carries exactly one `Point`.
//! - Address components have no identity outside their parent place.

use thiserror::Error;

pub mod address_component;
pub mod id;
pub mod photo;
pub mod place;
pub mod point;

pub use id::InvalidIdentifier;

/// Construction failure for a single raw document.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("document has no geometry.geolocation field")]
    MissingGeometry,
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
    #[error("invalid address components: {0}")]
    InvalidAddressComponents(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
