//! File-based configuration.
//!
//! # Responsibility
//! - Load `PlacesConfig` from TOML with defaults for every key.
//! - Validate values that would otherwise fail deep inside the store.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, normalize_level};
use crate::store::{SqliteCollection, DEFAULT_PAGE_SIZE};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacesConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite file. In-memory store when absent.
    pub path: Option<PathBuf>,
    pub places_collection: String,
    pub photos_collection: String,
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            places_collection: "places".to_string(),
            photos_collection: "photos".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    /// Opens the configured database with migrations applied.
    pub fn open(&self) -> DbResult<Connection> {
        match &self.path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    pub fn places<'conn>(&self, conn: &'conn Connection) -> SqliteCollection<'conn> {
        SqliteCollection::new(conn, self.places_collection.as_str()).with_page_size(self.page_size)
    }

    pub fn photos<'conn>(&self, conn: &'conn Connection) -> SqliteCollection<'conn> {
        SqliteCollection::new(conn, self.photos_collection.as_str()).with_page_size(self.page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rotating files. Stderr when absent.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl PlacesConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.page_size == 0 {
            return Err(ConfigError::Invalid(
                "store.page_size must be at least 1".to_string(),
            ));
        }
        for (key, name) in [
            ("store.places_collection", &self.store.places_collection),
            ("store.photos_collection", &self.store.photos_collection),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} cannot be empty")));
            }
        }
        if self.store.places_collection == self.store.photos_collection {
            return Err(ConfigError::Invalid(
                "places and photos must use different collections".to_string(),
            ));
        }
        normalize_level(&self.logging.level)
            .map_err(|err| ConfigError::Invalid(format!("logging.level: {err}")))?;
        Ok(())
    }
}
