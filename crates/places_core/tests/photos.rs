mod common;

use common::{baltimore, doc, toronto};
use places_core::db::open_db_in_memory;
use places_core::{
    DocumentCollection, ModelError, Photo, PhotoRepository, Place, PlaceRepository, Point,
    RepoError, SqliteCollection,
};
use serde_json::json;

fn photo_doc(place_id: &str, name: &str) -> places_core::Document {
    doc(json!({
        "filename": name,
        "metadata": {
            "place": place_id,
            "location": {"type": "Point", "coordinates": [-76.61, 39.29]}
        }
    }))
}

#[test]
fn photos_for_place_resolve_by_reference_with_pagination() {
    let conn = open_db_in_memory().unwrap();
    let places = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    let photos = PhotoRepository::new(SqliteCollection::new(&conn, "photos"));

    let ids = places
        .collection()
        .insert_many(vec![baltimore(), toronto()])
        .unwrap();
    photos
        .insert_all(vec![
            photo_doc(&ids[0], "harbor.jpg"),
            photo_doc(&ids[1], "cn-tower.jpg"),
            photo_doc(&ids[0], "fort.jpg"),
            photo_doc(&ids[0], "stadium.jpg"),
        ])
        .unwrap();

    let baltimore = places.find_by_id(&ids[0]).unwrap().unwrap();
    let all: Vec<Photo> = photos
        .photos_for_place(&baltimore, 0, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let names: Vec<&str> = all
        .iter()
        .map(|photo| photo.raw["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["harbor.jpg", "fort.jpg", "stadium.jpg"]);
    assert!(all.iter().all(|photo| photo.place_id == baltimore.id));
    assert_eq!(all[0].location, Some(Point::new(-76.61, 39.29)));

    let page: Vec<Photo> = photos
        .photos_for_place(&baltimore, 1, Some(1))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].raw["filename"], json!("fort.jpg"));

    let unbounded = photos.photos_for_place(&baltimore, 0, Some(0)).unwrap();
    assert_eq!(unbounded.count(), 3);
}

#[test]
fn unpersisted_place_has_no_photos() {
    let conn = open_db_in_memory().unwrap();
    let photos = PhotoRepository::new(SqliteCollection::new(&conn, "photos"));

    let draft = Place::new("draft", Point::new(0.0, 0.0));
    assert_eq!(photos.photos_for_place(&draft, 0, None).unwrap().count(), 0);
}

#[test]
fn photos_survive_deletion_of_their_place() {
    let conn = open_db_in_memory().unwrap();
    let places = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    let photos = PhotoRepository::new(SqliteCollection::new(&conn, "photos"));

    let ids = places.collection().insert_many(vec![baltimore()]).unwrap();
    photos.insert_all(vec![photo_doc(&ids[0], "harbor.jpg")]).unwrap();

    let place = places.find_by_id(&ids[0]).unwrap().unwrap();
    places.delete(&place).unwrap();

    let id = place.id.unwrap();
    assert_eq!(photos.find_by_place_id(&id, 0, None).unwrap().count(), 1);
}

#[test]
fn malformed_photo_fails_only_its_own_item() {
    let conn = open_db_in_memory().unwrap();
    let places = PlaceRepository::new(SqliteCollection::new(&conn, "places"));
    let photos = SqliteCollection::new(&conn, "photos");

    let ids = places.collection().insert_many(vec![baltimore()]).unwrap();
    let place = places.find_by_id(&ids[0]).unwrap().unwrap();
    photos
        .insert_many(vec![
            photo_doc(&ids[0], "harbor.jpg"),
            doc(json!({
                "filename": "broken.jpg",
                "metadata": {"place": ids[0], "location": {"type": "Point", "coordinates": ["bad", 1]}}
            })),
            photo_doc(&ids[0], "fort.jpg"),
        ])
        .unwrap();

    let items: Vec<_> = PhotoRepository::new(&photos)
        .photos_for_place(&place, 0, None)
        .unwrap()
        .collect();
    assert_eq!(items.len(), 3);
    assert!(matches!(
        items[1],
        Err(RepoError::Model(ModelError::InvalidGeometry(_)))
    ));
    let names: Vec<&str> = items
        .iter()
        .filter_map(|item| item.as_ref().ok())
        .map(|photo| photo.raw["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["harbor.jpg", "fort.jpg"]);
}
