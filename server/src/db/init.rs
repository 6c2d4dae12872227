/// Database schema initialization.
/// Sets up SQLite WAL mode and creates the row table on startup.
use rusqlite::{Connection, Result as SqliteResult};

/// Initialize database connection with WAL mode and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // Enable WAL mode (for file-based DB only, ignore error for in-memory)
    let _ = conn.execute("PRAGMA journal_mode = WAL", []);
    let _ = conn.execute("PRAGMA synchronous = NORMAL", []);

    create_schema(conn)?;

    Ok(())
}

/// Every remote table shares one physical table keyed by (tbl, id).
/// Upserts keep the rowid, so `ORDER BY rowid` is first-insertion order.
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS table_rows (
            tbl TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (tbl, id)
        );

        CREATE INDEX IF NOT EXISTS idx_table_rows_tbl ON table_rows(tbl);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_in_memory_database() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let tables: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            )
            .expect("Query failed")
            .query_map([], |row| row.get(0))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed");

        assert!(tables.contains(&"table_rows".to_string()));
    }

    #[test]
    fn test_table_rows_schema() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let mut stmt = conn
            .prepare("PRAGMA table_info(table_rows)")
            .expect("Query failed");
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed");

        for expected in ["tbl", "id", "body", "updated_at"] {
            assert!(columns.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_initialize_twice_is_harmless() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("first init");
        initialize_database(&conn).expect("second init");
    }
}
