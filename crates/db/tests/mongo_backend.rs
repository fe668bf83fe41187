//! Tests against a live MongoDB server.
//!
//! Ignored by default. Run with
//! `LIBRIS_DATABASE_URI=mongodb://127.0.0.1:27017 cargo test -p libris-db -- --ignored`.

use libris_db::{Database, DbError, Document, Filter};
use libris_kernel::settings::{DatabaseBackend, DatabaseSettings};
use serde_json::{json, Value};

const URI_VAR: &str = "LIBRIS_DATABASE_URI";

/// Connected handle on a throwaway database, or `None` without a server.
async fn scratch_database() -> Option<(Database, String)> {
    let Ok(uri) = std::env::var(URI_VAR) else {
        eprintln!("{URI_VAR} is not set, skipping");
        return None;
    };

    let name = format!("libris_test_{}", uuid::Uuid::new_v4().simple());
    let database = Database::new(DatabaseSettings {
        backend: DatabaseBackend::Mongo,
        uri,
        name: name.clone(),
    });
    database.connect().await.unwrap();
    Some((database, name))
}

async fn drop_database(database: Database, name: &str) {
    let uri = database.settings().uri.clone();
    database.close().await.unwrap();
    let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
    client.database(name).drop().await.unwrap();
}

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[tokio::test]
#[ignore = "needs a MongoDB server"]
async fn update_merges_fields_and_reports_counts() {
    let Some((database, name)) = scratch_database().await else {
        return;
    };
    let books = database.collection("books");
    books
        .insert_one(doc(json!({
            "_id": "q1",
            "title": "Don Quixote",
            "author": "Miguel de Cervantes",
            "synopsis": "..."
        })))
        .await
        .unwrap();

    let changed = books
        .update_one(&Filter::by_id("q1"), doc(json!({"author": "M. de Cervantes"})))
        .await
        .unwrap();
    assert_eq!((changed.matched_count, changed.modified_count), (1, 1));

    let unchanged = books
        .update_one(&Filter::by_id("q1"), doc(json!({"author": "M. de Cervantes"})))
        .await
        .unwrap();
    assert_eq!((unchanged.matched_count, unchanged.modified_count), (1, 0));

    let missing = books
        .update_one(&Filter::by_id("nope"), doc(json!({"title": "X"})))
        .await
        .unwrap();
    assert_eq!(missing.matched_count, 0);

    let stored = books.find_one(&Filter::by_id("q1")).await.unwrap().unwrap();
    assert_eq!(stored["author"], "M. de Cervantes");
    assert_eq!(stored["title"], "Don Quixote");
    assert_eq!(stored["synopsis"], "...");

    drop_database(database, &name).await;
}

#[tokio::test]
#[ignore = "needs a MongoDB server"]
async fn find_honours_limit() {
    let Some((database, name)) = scratch_database().await else {
        return;
    };
    let books = database.collection("books");
    for n in 0..105 {
        books
            .insert_one(doc(json!({"_id": format!("b{n}"), "title": "T"})))
            .await
            .unwrap();
    }

    let capped = books.find(&Filter::all(), Some(100)).await.unwrap();
    assert_eq!(capped.len(), 100);
    let everything = books.find(&Filter::all(), None).await.unwrap();
    assert_eq!(everything.len(), 105);

    drop_database(database, &name).await;
}

#[tokio::test]
#[ignore = "needs a MongoDB server"]
async fn duplicate_primary_key_is_typed() {
    let Some((database, name)) = scratch_database().await else {
        return;
    };
    let books = database.collection("books");
    books.insert_one(doc(json!({"_id": "dup"}))).await.unwrap();

    let err = books
        .insert_one(doc(json!({"_id": "dup"})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::DuplicateKey { ref key, ref collection } if key == "dup" && collection == "books"
    ));

    drop_database(database, &name).await;
}

#[tokio::test]
#[ignore = "needs a MongoDB server"]
async fn delete_counts_removed_documents() {
    let Some((database, name)) = scratch_database().await else {
        return;
    };
    let books = database.collection("books");
    books.insert_one(doc(json!({"_id": "d1"}))).await.unwrap();

    let first = books.delete_one(&Filter::by_id("d1")).await.unwrap();
    assert_eq!(first.deleted_count, 1);
    let second = books.delete_one(&Filter::by_id("d1")).await.unwrap();
    assert_eq!(second.deleted_count, 0);

    drop_database(database, &name).await;
}
