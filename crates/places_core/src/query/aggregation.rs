//! Aggregation pipeline templates over the place collection.
//!
//! # Invariants
//! - `$unwind` precedes `$project`, and `$match` on per-component fields
//!   follows `$unwind`.
//! - Pagination stages are only present when requested: `$skip` for a
//!   non-zero offset, `$sort`/`$limit` when set.
//! - The country-code lookup matches on the un-unwound array.

use crate::model::place::{ADDRESS_COMPONENTS_FIELD, FORMATTED_ADDRESS_FIELD, GEOLOCATION_FIELD};
use crate::store::{Filter, SortSpec, Stage, ID_FIELD};

const COUNTRY_TYPE: &str = "country";
const COMPONENT_TYPES_FIELD: &str = "address_components.types";
const COMPONENT_LONG_NAME_FIELD: &str = "address_components.long_name";
const COMPONENT_SHORT_NAME_FIELD: &str = "address_components.short_name";

/// Ordering and pagination options for the flattened components view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentsQuery {
    pub sort: Option<SortSpec>,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// One row per address component, each carrying its parent's formatted
/// address and geolocation.
pub fn flattened_components_pipeline(query: &ComponentsQuery) -> Vec<Stage> {
    [
        Stage::Unwind(ADDRESS_COMPONENTS_FIELD.to_string()),
        Stage::project([
            ADDRESS_COMPONENTS_FIELD,
            FORMATTED_ADDRESS_FIELD,
            GEOLOCATION_FIELD,
        ]),
    ]
    .into_iter()
    .chain(query.sort.clone().map(Stage::Sort))
    .chain((query.offset != 0).then_some(Stage::Skip(query.offset)))
    .chain(query.limit.map(Stage::Limit))
    .collect()
}

/// Distinct long names of components tagged `country`; output rows are
/// `{ _id: <long name> }`.
pub fn country_names_pipeline() -> Vec<Stage> {
    vec![
        Stage::Unwind(ADDRESS_COMPONENTS_FIELD.to_string()),
        Stage::project([COMPONENT_LONG_NAME_FIELD, COMPONENT_TYPES_FIELD]),
        Stage::Match(Filter::eq(COMPONENT_TYPES_FIELD, COUNTRY_TYPE)),
        Stage::Group {
            key: COMPONENT_LONG_NAME_FIELD.to_string(),
        },
    ]
}

/// Identifiers of places whose components include a country and the
/// given short name; output rows are `{ _id }` only.
pub fn ids_by_country_code_pipeline(country_code: &str) -> Vec<Stage> {
    vec![
        Stage::Match(Filter::and([
            Filter::eq(COMPONENT_TYPES_FIELD, COUNTRY_TYPE),
            Filter::eq(COMPONENT_SHORT_NAME_FIELD, country_code),
        ])),
        Stage::Project(vec![ID_FIELD.to_string()]),
    ]
}
