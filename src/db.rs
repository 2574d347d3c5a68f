//src/db.rs
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::APP_DIR;
use crate::store::KeyValueStore;

const DB_FILE_NAME: &str = "calendar.sqlite";

// Custom Error type for DB operations
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database update failed: {0}")]
    UpdateFailed(rusqlite::Error),
    #[error("Failed to serialize stored value")]
    Serialize(#[from] serde_json::Error),
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Exposed at crate root as get_db_path_util
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DIR); // Same dir name as config
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    Connection::open(path).map_err(DbError::Connection)
}

/// Initializes the key-value table if it doesn't exist.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(DbError::Connection)?;
    Ok(())
}

/// String key-value storage on a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps an open connection, creating the table when missing.
    pub fn new(conn: Connection) -> Result<Self, DbError> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        Self::new(open_db(path)?)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::new(Connection::open_in_memory().map_err(DbError::Connection)?)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(DbError::QueryFailed)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(DbError::UpdateFailed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EntryStore, ENTRIES_KEY};

    #[test]
    fn serialize_failures_surface_as_db_errors() {
        let err: DbError = serde_json::from_str::<u8>("not a number").unwrap_err().into();
        assert!(matches!(err, DbError::Serialize(_)));
    }

    #[test]
    fn persist_writes_through_sqlite() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        EntryStore::new().persist(&mut store).unwrap();
        assert_eq!(store.get(ENTRIES_KEY).unwrap().as_deref(), Some("{}"));
    }
}
