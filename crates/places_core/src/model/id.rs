//! Store-assigned identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Malformed identifier string that cannot become a store id.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid identifier `{0}`")]
pub struct InvalidIdentifier(pub String);

/// Identifier of a stored place. Immutable once assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(Uuid);

impl PlaceId {
    pub fn parse(value: &str) -> Result<Self, InvalidIdentifier> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| InvalidIdentifier(value.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for PlaceId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for PlaceId {
    type Err = InvalidIdentifier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for PlaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
