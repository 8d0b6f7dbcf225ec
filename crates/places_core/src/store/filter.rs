//! Query filters over documents.
//!
//! # Invariants
//! - `Eq` on a path that crosses arrays matches when any reached value
//!   equals the operand, or any reached array contains it.
//! - `Near` only carries the query; ordering by distance is applied by the
//!   collection executing the find.

use super::document::{values_at_path, values_equal, Document, ID_FIELD};
use super::geo::{haversine_distance, point_coordinates};
use serde_json::{json, Map, Value};

/// Geospatial nearness query against a 2dsphere-indexed point field.
#[derive(Debug, Clone, PartialEq)]
pub struct NearQuery {
    pub path: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Upper bound in meters. `None` means unbounded.
    pub max_distance: Option<f64>,
}

impl NearQuery {
    /// Distance in meters from the query point to the document's point, if
    /// the document holds a well-formed point at `path`.
    pub fn distance_to(&self, doc: &Document) -> Option<f64> {
        values_at_path(doc, &self.path)
            .into_iter()
            .find_map(point_coordinates)
            .map(|coords| haversine_distance((self.longitude, self.latitude), coords))
    }

    fn within_bound(&self, distance: f64) -> bool {
        self.max_distance.map_or(true, |max| distance <= max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    Eq { path: String, value: Value },
    And(Vec<Filter>),
    Near(NearQuery),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Filter matching a single store identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, Value::String(id.into()))
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq { path, value } => {
                let found = values_at_path(doc, path);
                if found.is_empty() {
                    return value.is_null();
                }
                found.into_iter().any(|candidate| match candidate {
                    Value::Array(items) if !value.is_array() => {
                        items.iter().any(|item| values_equal(item, value))
                    }
                    other => values_equal(other, value),
                })
            }
            Self::And(filters) => filters.iter().all(|filter| filter.matches(doc)),
            Self::Near(near) => near
                .distance_to(doc)
                .is_some_and(|distance| near.within_bound(distance)),
        }
    }

    /// Returns the nearness clause when present at the top level or inside
    /// an `And`.
    pub fn near_query(&self) -> Option<&NearQuery> {
        match self {
            Self::Near(near) => Some(near),
            Self::And(filters) => filters.iter().find_map(Filter::near_query),
            _ => None,
        }
    }

    /// Returns the identifier when this filter is an exact `_id` lookup.
    pub fn id_lookup(&self) -> Option<&str> {
        match self {
            Self::Eq { path, value } if path == ID_FIELD => value.as_str(),
            _ => None,
        }
    }

    /// Renders the filter in the store's query-document notation.
    pub fn to_document(&self) -> Value {
        match self {
            Self::All => json!({}),
            Self::Eq { path, value } => json!({ path.as_str(): value }),
            Self::And(filters) => {
                let mut merged = Map::new();
                for filter in filters {
                    let Value::Object(rendered) = filter.to_document() else {
                        continue;
                    };
                    for (key, value) in rendered {
                        if merged.contains_key(&key) {
                            let clauses: Vec<Value> =
                                filters.iter().map(Filter::to_document).collect();
                            return json!({ "$and": clauses });
                        }
                        merged.insert(key, value);
                    }
                }
                Value::Object(merged)
            }
            Self::Near(near) => {
                let mut clause = Map::new();
                clause.insert(
                    "$geometry".to_string(),
                    json!({"type": "Point", "coordinates": [near.longitude, near.latitude]}),
                );
                if let Some(max) = near.max_distance {
                    clause.insert("$maxDistance".to_string(), json!(max));
                }
                json!({ near.path.as_str(): { "$near": clause } })
            }
        }
    }
}
