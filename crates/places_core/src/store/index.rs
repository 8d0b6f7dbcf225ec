//! Secondary index descriptors.
//!
//! Index names are derived from field path and kind, so create/drop pair
//! by convention rather than by a stored handle.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Geospatial index over GeoJSON points on a sphere.
    TwoDSphere,
    Ascending,
}

impl IndexKind {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::TwoDSphere => "2dsphere",
            Self::Ascending => "1",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "2dsphere" => Some(Self::TwoDSphere),
            "1" => Some(Self::Ascending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub path: String,
    pub kind: IndexKind,
}

impl IndexSpec {
    pub fn new(path: impl Into<String>, kind: IndexKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn geo_2dsphere(path: impl Into<String>) -> Self {
        Self::new(path, IndexKind::TwoDSphere)
    }

    /// `<path>_<kind>`, e.g. `geometry.geolocation_2dsphere`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.path, self.kind.as_db_str())
    }
}
