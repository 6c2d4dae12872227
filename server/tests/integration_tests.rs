/// Integration tests for the table store
/// Tests database operations and error handling through direct DB calls
use class_portal_server::db::{create_pool, Database, TableError};
use serde_json::json;

#[tokio::test]
async fn test_table_upsert_workflow() {
    let pool = class_portal_server::db::create_test_pool();

    let rows = vec![
        json!({"id": "u1", "name": "Ana", "username": "ana", "role": "student", "blocked": false}),
        json!({"id": "u2", "name": "Bia", "username": "bia", "role": "student", "blocked": false}),
    ];

    let upserted = Database::upsert_rows(&pool, "users", &rows)
        .await
        .expect("Failed to upsert users");
    assert_eq!(upserted, 2);

    // Replace one row, add a third
    let second_batch = vec![
        json!({"id": "u2", "name": "Bia", "username": "bia", "role": "student", "blocked": true}),
        json!({"id": "u3", "name": "Caio", "username": "caio", "role": "student", "blocked": false}),
    ];
    Database::upsert_rows(&pool, "users", &second_batch)
        .await
        .expect("Failed to upsert second batch");

    let listed = Database::list_rows(&pool, "users").await.expect("List failed");
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[1]["blocked"], true);
    assert_eq!(Database::count_rows(&pool, "users").await.unwrap(), 3);
}

#[tokio::test]
async fn test_resending_same_rows_is_idempotent() {
    let pool = class_portal_server::db::create_test_pool();
    let rows = vec![
        json!({"id": "r1", "userId": "u1", "quizId": "q1", "score": 3, "total": 5}),
        json!({"id": "r2", "userId": "u1", "quizId": "q2", "score": 5, "total": 5}),
    ];

    Database::upsert_rows(&pool, "results", &rows).await.unwrap();
    let before = Database::list_rows(&pool, "results").await.unwrap();

    Database::upsert_rows(&pool, "results", &rows).await.unwrap();
    let after = Database::list_rows(&pool, "results").await.unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_unknown_table_errors() {
    let pool = class_portal_server::db::create_test_pool();

    let err = Database::count_rows(&pool, "grades").await.unwrap_err();
    assert!(matches!(err, TableError::UnknownTable(_)));

    let err = Database::upsert_rows(&pool, "grades", &[json!({"id": "x"})])
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::UnknownTable(_)));
}

#[tokio::test]
async fn test_rows_persist_across_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("remote.db");
    let db_path = db_path.to_str().unwrap();

    {
        let pool = create_pool(db_path).expect("Failed to open pool");
        Database::upsert_rows(&pool, "appointments", &[json!({"id": "a1", "dateTime": "2026-03-02T14:00"})])
            .await
            .unwrap();
    }

    let pool = create_pool(db_path).expect("Failed to reopen pool");
    let rows = Database::list_rows(&pool, "appointments").await.unwrap();
    assert_eq!(rows, vec![json!({"id": "a1", "dateTime": "2026-03-02T14:00"})]);
}

#[tokio::test]
async fn test_login_ignores_other_tables() {
    let pool = class_portal_server::db::create_test_pool();
    Database::upsert_rows(&pool, "quizzes", &[json!({"id": "q", "username": "x", "password": "y"})])
        .await
        .unwrap();

    let found = Database::check_login(&pool, "x", "y").await.unwrap();
    assert!(found.is_none());
}
