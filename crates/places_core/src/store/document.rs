//! Schema-flexible document shape and dotted-path helpers.
//!
//! # Invariants
//! - `_id` holds the store-assigned identifier as a UUID string.
//! - Path lookups never panic on irregular nesting; mismatched shapes
//!   simply resolve to nothing.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// One stored record. Top level is always a JSON object.
pub type Document = Map<String, Value>;

/// Field carrying the store identifier.
pub const ID_FIELD: &str = "_id";

/// Returns every value reachable through `path`, fanning out over arrays.
///
/// `address_components.short_name` over an array of components yields one
/// value per component that has the field.
pub fn values_at_path<'a>(doc: &'a Document, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut found = Vec::new();
    collect_from_map(doc, &segments, &mut found);
    found
}

fn collect_from_map<'a>(
    map: &'a Map<String, Value>,
    segments: &[&str],
    found: &mut Vec<&'a Value>,
) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if let Some(value) = map.get(*head) {
        collect_from_value(value, rest, found);
    }
}

fn collect_from_value<'a>(value: &'a Value, rest: &[&str], found: &mut Vec<&'a Value>) {
    if rest.is_empty() {
        found.push(value);
        return;
    }
    match value {
        Value::Object(map) => collect_from_map(map, rest, found),
        Value::Array(items) => {
            for item in items {
                if let Value::Object(map) = item {
                    collect_from_map(map, rest, found);
                }
            }
        }
        _ => {}
    }
}

/// Resolves `path` through nested objects only (no array fan-out).
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Builds an inclusion projection of `fields`; `_id` is always carried.
pub fn project(doc: &Document, fields: &[String]) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }
    for field in fields {
        let segments: Vec<&str> = field.split('.').collect();
        project_into(doc, &segments, &mut out);
    }
    out
}

fn project_into(src: &Map<String, Value>, segments: &[&str], dst: &mut Map<String, Value>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let Some(value) = src.get(*head) else {
        return;
    };
    if rest.is_empty() {
        dst.insert((*head).to_string(), value.clone());
        return;
    }

    match value {
        Value::Object(inner) => {
            let slot = dst
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(slot) = slot {
                project_into(inner, rest, slot);
            }
        }
        Value::Array(items) => {
            let objects: Vec<&Map<String, Value>> =
                items.iter().filter_map(Value::as_object).collect();
            let slot = dst.entry((*head).to_string()).or_insert_with(|| {
                Value::Array(objects.iter().map(|_| Value::Object(Map::new())).collect())
            });
            if let Value::Array(slots) = slot {
                for (inner, slot) in objects.into_iter().zip(slots.iter_mut()) {
                    if let Value::Object(slot) = slot {
                        project_into(inner, rest, slot);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Equality used by filters: numbers compare by value, everything else
/// structurally.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Total order over JSON values used by `$sort`.
///
/// Null sorts first, then numbers, strings, objects, arrays, booleans.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| compare_values(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (Value::Object(a), Value::Object(b)) => {
            Value::Object(a.clone()).to_string().cmp(&Value::Object(b.clone()).to_string())
        }
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}
