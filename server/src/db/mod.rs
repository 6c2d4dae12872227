/// Database layer for persistent storage.
/// Stores rows of every remote table as JSON documents keyed by `id`.

pub mod init;
pub mod models;

use chrono::Utc;
use models::{is_known_table, LoginResponse};
use rusqlite::{params, Connection, Result as SqliteResult};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

pub type DbPool = Arc<Mutex<Connection>>;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Row {0} has no string id")]
    MissingId(usize),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TableResult<T> = std::result::Result<T, TableError>;

/// Create a connection pool (simplified for single-threaded SQLite)
pub fn create_pool(db_path: &str) -> SqliteResult<DbPool> {
    let conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}

fn check_table(table: &str) -> TableResult<()> {
    if is_known_table(table) {
        Ok(())
    } else {
        Err(TableError::UnknownTable(table.to_string()))
    }
}

/// Database operations
pub struct Database;

impl Database {
    /// All rows of a table in first-insertion order
    pub async fn list_rows(pool: &DbPool, table: &str) -> TableResult<Vec<Value>> {
        check_table(table)?;
        let conn = pool.lock().await;

        let mut stmt = conn.prepare("SELECT body FROM table_rows WHERE tbl = ?1 ORDER BY rowid")?;
        let bodies = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let rows = bodies
            .iter()
            .map(|body| serde_json::from_str(body))
            .collect::<Result<Vec<Value>, _>>()?;

        Ok(rows)
    }

    /// Insert or replace rows by `id`. All rows are validated before anything is written,
    /// and the batch commits as one transaction.
    pub async fn upsert_rows(pool: &DbPool, table: &str, rows: &[Value]) -> TableResult<usize> {
        check_table(table)?;

        let mut keyed = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let id = row
                .get("id")
                .and_then(Value::as_str)
                .ok_or(TableError::MissingId(index))?;
            keyed.push((id.to_string(), serde_json::to_string(row)?));
        }

        let mut conn = pool.lock().await;
        let updated_at = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO table_rows (tbl, id, body, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(tbl, id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            )?;
            for (id, body) in &keyed {
                stmt.execute(params![table, id, body, &updated_at])?;
            }
        }
        tx.commit()?;

        Ok(keyed.len())
    }

    /// Number of rows in a table
    pub async fn count_rows(pool: &DbPool, table: &str) -> TableResult<u64> {
        check_table(table)?;
        let conn = pool.lock().await;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM table_rows WHERE tbl = ?1",
            params![table],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    /// Password check against the `users` table
    pub async fn check_login(
        pool: &DbPool,
        username: &str,
        password: &str,
    ) -> TableResult<Option<LoginResponse>> {
        let users = Self::list_rows(pool, "users").await?;

        let found = users.into_iter().find(|user| {
            user.get("username").and_then(Value::as_str) == Some(username)
                && user.get("password").and_then(Value::as_str) == Some(password)
        });

        Ok(found.map(|user| {
            let field = |name: &str| {
                user.get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            LoginResponse {
                id: field("id"),
                username: field("username"),
                name: field("name"),
                role: field("role"),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let pool = create_test_pool();

        Database::upsert_rows(&pool, "quizzes", &[json!({"id": "q1", "title": "old"})])
            .await
            .unwrap();
        Database::upsert_rows(&pool, "quizzes", &[json!({"id": "q1", "title": "new"})])
            .await
            .unwrap();

        let rows = Database::list_rows(&pool, "quizzes").await.unwrap();
        assert_eq!(rows, vec![json!({"id": "q1", "title": "new"})]);
    }

    #[tokio::test]
    async fn test_replace_keeps_insertion_position() {
        let pool = create_test_pool();
        let batch = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];
        Database::upsert_rows(&pool, "payments", &batch).await.unwrap();
        Database::upsert_rows(&pool, "payments", &[json!({"id": "a", "amount": 5})])
            .await
            .unwrap();

        let ids: Vec<String> = Database::list_rows(&pool, "payments")
            .await
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unknown_table_rejected() {
        let pool = create_test_pool();
        let err = Database::list_rows(&pool, "secrets").await.unwrap_err();
        assert!(matches!(err, TableError::UnknownTable(name) if name == "secrets"));
    }

    #[tokio::test]
    async fn test_missing_id_rejects_whole_batch() {
        let pool = create_test_pool();
        let batch = vec![json!({"id": "ok"}), json!({"title": "no id"})];

        let err = Database::upsert_rows(&pool, "quizzes", &batch).await.unwrap_err();
        assert!(matches!(err, TableError::MissingId(1)));
        assert_eq!(Database::count_rows(&pool, "quizzes").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_tables_are_isolated() {
        let pool = create_test_pool();
        Database::upsert_rows(&pool, "users", &[json!({"id": "x"})]).await.unwrap();

        assert_eq!(Database::count_rows(&pool, "users").await.unwrap(), 1);
        assert_eq!(Database::count_rows(&pool, "results").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_check_login() {
        let pool = create_test_pool();
        Database::upsert_rows(
            &pool,
            "users",
            &[json!({
                "id": "teacher-1",
                "name": "Administrador",
                "username": "prof",
                "password": "secret",
                "role": "teacher",
                "blocked": false
            })],
        )
        .await
        .unwrap();

        let ok = Database::check_login(&pool, "prof", "secret").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some("teacher-1".to_string()));

        let bad = Database::check_login(&pool, "prof", "wrong").await.unwrap();
        assert!(bad.is_none());
    }
}
