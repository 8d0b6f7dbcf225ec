//! Aggregation stages and their in-process evaluation.
//!
//! # Responsibility
//! - Describe pipeline stages as typed values.
//! - Evaluate an ordered stage list over a document sequence.
//!
//! # Invariants
//! - Stages run strictly in the given order.
//! - `$group` emits groups in first-seen order, one document per key.
//! - `$sort` is stable.

use super::document::{compare_values, get_path, project, Document, ID_FIELD};
use super::filter::Filter;
use super::{StoreError, StoreResult};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_wire(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Ordered list of sort keys. Earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortOrder)>,
}

impl SortSpec {
    pub fn ascending(path: impl Into<String>) -> Self {
        Self::default().then(path, SortOrder::Ascending)
    }

    pub fn descending(path: impl Into<String>) -> Self {
        Self::default().then(path, SortOrder::Descending)
    }

    pub fn then(mut self, path: impl Into<String>, order: SortOrder) -> Self {
        self.keys.push((path.into(), order));
        self
    }

    pub fn keys(&self) -> &[(String, SortOrder)] {
        &self.keys
    }

    fn to_document(&self) -> Value {
        let keys: Map<String, Value> = self
            .keys
            .iter()
            .map(|(path, order)| (path.clone(), json!(order.as_wire())))
            .collect();
        Value::Object(keys)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Expands the array at the path into one document per element.
    Unwind(String),
    /// Inclusion projection; `_id` is always kept.
    Project(Vec<String>),
    Match(Filter),
    Sort(SortSpec),
    Skip(u64),
    Limit(u64),
    /// Groups by the value at `key`; output documents are `{ _id: key }`.
    Group { key: String },
}

impl Stage {
    pub fn project<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Project(fields.into_iter().map(Into::into).collect())
    }

    /// Operator name in the store's pipeline notation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unwind(_) => "$unwind",
            Self::Project(_) => "$project",
            Self::Match(_) => "$match",
            Self::Sort(_) => "$sort",
            Self::Skip(_) => "$skip",
            Self::Limit(_) => "$limit",
            Self::Group { .. } => "$group",
        }
    }

    pub fn to_document(&self) -> Value {
        let body = match self {
            Self::Unwind(path) => json!(format!("${path}")),
            Self::Project(fields) => {
                let included: Map<String, Value> = fields
                    .iter()
                    .map(|field| (field.clone(), json!(1)))
                    .collect();
                Value::Object(included)
            }
            Self::Match(filter) => filter.to_document(),
            Self::Sort(spec) => spec.to_document(),
            Self::Skip(count) | Self::Limit(count) => json!(count),
            Self::Group { key } => json!({ ID_FIELD: format!("${key}") }),
        };
        json!({ self.name(): body })
    }
}

/// Renders a stage list for logging and diagnostics.
pub fn pipeline_to_document(stages: &[Stage]) -> Value {
    Value::Array(stages.iter().map(Stage::to_document).collect())
}

/// Rejects stage lists the store cannot execute.
pub fn validate_pipeline(stages: &[Stage]) -> StoreResult<()> {
    for (position, stage) in stages.iter().enumerate() {
        match stage {
            Stage::Limit(0) => {
                return Err(StoreError::InvalidPipeline(format!(
                    "stage {position}: $limit must be positive"
                )));
            }
            Stage::Match(filter) if filter.near_query().is_some() => {
                return Err(StoreError::InvalidPipeline(format!(
                    "stage {position}: $near is not allowed in $match"
                )));
            }
            Stage::Unwind(path) | Stage::Group { key: path } if path.is_empty() => {
                return Err(StoreError::InvalidPipeline(format!(
                    "stage {position}: {} requires a field path",
                    stage.name()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Runs `stages` over `documents` and returns the derived documents.
pub fn run_pipeline(documents: Vec<Document>, stages: &[Stage]) -> StoreResult<Vec<Document>> {
    validate_pipeline(stages)?;
    let output = stages
        .iter()
        .fold(documents, |current, stage| apply_stage(current, stage));
    Ok(output)
}

fn apply_stage(documents: Vec<Document>, stage: &Stage) -> Vec<Document> {
    match stage {
        Stage::Unwind(path) => documents
            .into_iter()
            .flat_map(|doc| unwind(doc, path))
            .collect(),
        Stage::Project(fields) => documents.iter().map(|doc| project(doc, fields)).collect(),
        Stage::Match(filter) => documents
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect(),
        Stage::Sort(spec) => {
            let mut sorted = documents;
            sorted.sort_by(|left, right| {
                spec.keys()
                    .iter()
                    .map(|(path, order)| {
                        let ordering = compare_values(
                            get_path(left, path).unwrap_or(&Value::Null),
                            get_path(right, path).unwrap_or(&Value::Null),
                        );
                        match order {
                            SortOrder::Ascending => ordering,
                            SortOrder::Descending => ordering.reverse(),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            sorted
        }
        Stage::Skip(count) => documents.into_iter().skip(to_usize(*count)).collect(),
        Stage::Limit(count) => documents.into_iter().take(to_usize(*count)).collect(),
        Stage::Group { key } => group_by(documents, key),
    }
}

fn unwind(doc: Document, path: &str) -> Vec<Document> {
    match get_path(&doc, path) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let mut expanded = doc.clone();
                replace_path(&mut expanded, path, item.clone());
                expanded
            })
            .collect(),
        Some(_) => vec![doc],
    }
}

fn replace_path(doc: &mut Document, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = doc;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        match current.get_mut(segment) {
            Some(Value::Object(inner)) => current = inner,
            _ => return,
        }
    }
}

fn group_by(documents: Vec<Document>, key: &str) -> Vec<Document> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();
    for doc in &documents {
        let value = get_path(doc, key).cloned().unwrap_or(Value::Null);
        if seen.insert(value.to_string()) {
            let mut group = Document::new();
            group.insert(ID_FIELD.to_string(), value);
            groups.push(group);
        }
    }
    groups
}

fn to_usize(count: u64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}
