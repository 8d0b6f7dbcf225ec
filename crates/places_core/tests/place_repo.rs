mod common;

use common::{all_cities, bare_place, baltimore, doc, toronto, BALTIMORE};
use places_core::db::open_db_in_memory;
use places_core::{
    Cursor, Document, DocumentCollection, Filter, FindOptions, IndexSpec, ModelError, Place,
    PlaceRepository, Point, RepoError, SqliteCollection, Stage, StoreError, StoreResult,
};
use serde_json::json;
use std::cell::Cell;

#[test]
fn insert_all_grows_collection_by_batch_size() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));

    assert_eq!(repo.insert_all(all_cities()).unwrap(), 4);
    assert_eq!(repo.insert_all(vec![baltimore()]).unwrap(), 1);
    assert_eq!(repo.collection().count_documents(&Filter::All).unwrap(), 5);
}

#[test]
fn find_by_id_returns_materialized_place() {
    let conn = open_db_in_memory().unwrap();
    let collection = SqliteCollection::new(&conn, "places");
    let ids = collection.insert_many(vec![baltimore(), toronto()]).unwrap();
    let repo = PlaceRepository::new(collection);

    let place = repo.find_by_id(&ids[1]).unwrap().unwrap();
    assert_eq!(place.id.map(|id| id.to_string()), Some(ids[1].clone()));
    assert_eq!(place.formatted_address.as_deref(), Some("Toronto, ON, Canada"));
    assert_eq!(place.location, Point::new(-79.3832, 43.6532));
    assert_eq!(place.country(), Some("Canada"));
    assert_eq!(place.components().count(), 3);
}

#[test]
fn find_by_id_of_unknown_id_is_explicit_absence() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    repo.insert_all(all_cities()).unwrap();

    let missing = repo
        .find_by_id("00000000-0000-4000-8000-000000000000")
        .unwrap();
    assert!(missing.is_none());
}

/// Counts every store call; answers with empty results.
#[derive(Default)]
struct CountingCollection {
    calls: Cell<usize>,
}

impl CountingCollection {
    fn touch(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl DocumentCollection for CountingCollection {
    fn name(&self) -> &str {
        "counting"
    }

    fn insert_many(&self, documents: Vec<Document>) -> StoreResult<Vec<String>> {
        self.touch();
        Ok(documents.iter().map(|_| String::new()).collect())
    }

    fn find(&self, _filter: &Filter, _options: &FindOptions) -> StoreResult<Cursor<'_>> {
        self.touch();
        Ok(Cursor::from_documents(Vec::new()))
    }

    fn aggregate(&self, _stages: &[Stage]) -> StoreResult<Cursor<'_>> {
        self.touch();
        Ok(Cursor::from_documents(Vec::new()))
    }

    fn delete_one(&self, _filter: &Filter) -> StoreResult<u64> {
        self.touch();
        Ok(0)
    }

    fn create_index(&self, spec: &IndexSpec) -> StoreResult<String> {
        self.touch();
        Ok(spec.name())
    }

    fn drop_index(&self, _name: &str) -> StoreResult<()> {
        self.touch();
        Ok(())
    }
}

#[test]
fn malformed_id_fails_before_any_store_call() {
    let collection = CountingCollection::default();
    let repo = PlaceRepository::new(&collection);

    let err = repo.find_by_id("not-a-valid-id").unwrap_err();
    assert!(matches!(err, RepoError::InvalidIdentifier(_)));
    assert_eq!(collection.calls.get(), 0);

    repo.find_by_id("00000000-0000-4000-8000-000000000000")
        .unwrap();
    assert_eq!(collection.calls.get(), 1);
}

#[test]
fn find_all_applies_offset_and_limit_in_store_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places").with_page_size(2));
    let mut batch = all_cities();
    batch.push(bare_place("Nowhere 1", (10.0, 10.0)));
    batch.push(bare_place("Nowhere 2", (11.0, 11.0)));
    repo.insert_all(batch).unwrap();

    let page: Vec<Place> = repo
        .find_all(2, Some(3))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let addresses: Vec<&str> = page
        .iter()
        .filter_map(|place| place.formatted_address.as_deref())
        .collect();
    assert_eq!(addresses, vec!["Toronto, ON, Canada", "Paris, France", "Nowhere 1"]);

    assert_eq!(repo.find_all(0, None).unwrap().count(), 6);
    assert_eq!(repo.find_all(5, None).unwrap().count(), 1);
    assert_eq!(repo.find_all(10, Some(3)).unwrap().count(), 0);
}

#[test]
fn find_all_with_zero_limit_is_unbounded() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    repo.insert_all(all_cities()).unwrap();

    assert_eq!(repo.find_all(0, Some(0)).unwrap().count(), 4);
    assert_eq!(repo.find_all(1, Some(0)).unwrap().count(), 3);
}

#[test]
fn missing_geometry_only_fails_its_own_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    repo.insert_all(vec![
        baltimore(),
        doc(json!({"formatted_address": "no geometry"})),
        toronto(),
    ])
    .unwrap();

    let results: Vec<_> = repo.find_all(0, None).unwrap().collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(RepoError::Model(ModelError::MissingGeometry))
    ));
    assert_eq!(
        results[2].as_ref().unwrap().formatted_address.as_deref(),
        Some("Toronto, ON, Canada")
    );
}

#[test]
fn places_without_components_load_with_absent_components() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    repo.insert_all(vec![bare_place("Bare", BALTIMORE)]).unwrap();

    let place = repo.find_all(0, None).unwrap().next().unwrap().unwrap();
    assert!(place.address_components.is_none());
}

#[test]
fn find_by_short_name_is_exact_and_case_sensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    repo.insert_all(all_cities()).unwrap();

    let us: Vec<Document> = repo.find_by_short_name("US").unwrap().try_collect().unwrap();
    assert_eq!(us.len(), 2);
    assert_eq!(us[0]["formatted_address"], json!("Baltimore, MD, USA"));
    assert_eq!(us[1]["formatted_address"], json!("Washington, DC, USA"));

    assert_eq!(repo.find_by_short_name("us").unwrap().count(), 0);
    assert_eq!(repo.find_by_short_name("U").unwrap().count(), 0);
    assert_eq!(repo.find_by_short_name("ON").unwrap().count(), 1);
}

#[test]
fn delete_removes_document_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let collection = SqliteCollection::new(&conn, "places");
    let ids = collection.insert_many(all_cities()).unwrap();
    let repo = PlaceRepository::new(collection);

    let place = repo.find_by_id(&ids[0]).unwrap().unwrap();
    repo.delete(&place).unwrap();
    repo.delete(&place).unwrap();

    assert!(repo.find_by_id(&ids[0]).unwrap().is_none());
    assert_eq!(repo.find_all(0, None).unwrap().count(), 3);
}

#[test]
fn delete_of_unpersisted_place_is_a_no_op() {
    let collection = CountingCollection::default();
    let repo = PlaceRepository::new(&collection);

    repo.delete(&Place::new("draft", Point::new(0.0, 0.0)))
        .unwrap();
    assert_eq!(collection.calls.get(), 0);
}

#[test]
fn load_all_forwards_json_array_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    let input = serde_json::to_vec(&all_cities()).unwrap();

    assert_eq!(repo.load_all(input.as_slice()).unwrap(), 4);

    let first: Vec<Document> = repo
        .collection()
        .find(&Filter::All, &FindOptions::default().limit(1))
        .unwrap()
        .try_collect()
        .unwrap();
    let mut expected = baltimore();
    expected.insert("_id".to_string(), first[0]["_id"].clone());
    assert_eq!(first[0], expected);
}

#[test]
fn load_all_rejects_non_array_and_non_object_input() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));

    let err = repo.load_all(&b"{\"formatted_address\": \"x\"}"[..]).unwrap_err();
    assert!(matches!(err, RepoError::InvalidLoad(_)));

    let err = repo.load_all(&b"[{\"a\": 1}, 2]"[..]).unwrap_err();
    assert!(matches!(err, RepoError::InvalidLoad(_)));

    let err = repo.load_all(&b"[{\"a\": 1"[..]).unwrap_err();
    assert!(matches!(err, RepoError::Json(_)));

    assert_eq!(repo.collection().count_documents(&Filter::All).unwrap(), 0);
}

#[test]
fn bulk_insert_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = PlaceRepository::new(SqliteCollection::new(&conn, "places"));

    let err = repo
        .insert_all(vec![baltimore(), doc(json!({"_id": "not-a-uuid"}))])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Store(StoreError::InvalidDocument(_))
    ));
    assert_eq!(repo.find_all(0, None).unwrap().count(), 0);
}
