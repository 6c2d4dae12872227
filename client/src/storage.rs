/// Local storage for portal collections
///
/// A durable key/value store over SQLite. Each key holds one JSON document;
/// collections are stored as JSON arrays under their collection name.

use crate::error::{PortalError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Local storage manager for the SQLite key/value table
///
/// Every call runs to completion under the connection lock, so operations from
/// one process are serialized. Writers in other processes are last-write-wins.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open (or create) the store at the given database path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PortalError::StorageError("Failed to lock database".to_string()))
    }

    /// Read a collection. A key that was never written reads as empty.
    pub fn read<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        match self.get_raw(collection)? {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                PortalError::StorageError(format!("Corrupt collection {}: {}", collection, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Replace a collection with `records` in a single statement
    pub fn write<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.set_raw(collection, &json)
    }

    /// Raw JSON text stored under `key`
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, updated_at],
        )?;
        Ok(())
    }

    pub fn remove_raw(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Stored keys in lexical order
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Every (key, raw value) pair in lexical key order
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM kv ORDER BY key")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }

    /// Clear the store and write `entries`, all inside one transaction
    pub fn replace_all(&self, entries: &[(String, String)]) -> Result<()> {
        self.write_entries(entries, true)
    }

    /// Set every key in `entries` inside one transaction; other keys are kept
    pub fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        self.write_entries(entries, false)
    }

    fn write_entries(&self, entries: &[(String, String)], clear_first: bool) -> Result<()> {
        let mut conn = self.lock()?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        if clear_first {
            tx.execute("DELETE FROM kv", [])?;
        }
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)")?;
            for (key, value) in entries {
                stmt.execute(params![key, value, &updated_at])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
