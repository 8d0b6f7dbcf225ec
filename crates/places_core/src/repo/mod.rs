//! Repository layer over injected document collections.
//!
//! # Responsibility
//! - Provide place and photo use-cases on top of `DocumentCollection`.
//! - Map raw documents to entities at a single parse boundary.
//!
//! # Invariants
//! - Store errors propagate unchanged inside `RepoError::Store`.
//! - Lookups that find nothing return `Ok(None)` or an empty result.

use crate::model::{InvalidIdentifier, ModelError};
use crate::store::StoreError;
use thiserror::Error;

pub mod photo_repo;
pub mod place_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("bulk load input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bulk load input rejected: {0}")]
    InvalidLoad(String),
}
