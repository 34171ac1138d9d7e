//src/db.rs
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DB_FILE_NAME: &str = "fitness_tracker.sqlite";
const APP_DATA_DIR: &str = "fitness-tracker"; // Same dir name as config

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
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Exposed at crate root as `get_db_path_util`
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database, creating parent directories as needed.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    if let Some(parent_dir) = path.as_ref().parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            std::fs::create_dir_all(parent_dir)?;
        }
    }
    let conn = Connection::open(path).map_err(DbError::Connection)?;
    Ok(conn)
}

/// Initializes the key-value table if it doesn't exist.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL, -- Serialized payload, JSON for structured values
            updated_at TEXT NOT NULL -- UTC timestamp of the last write
        )",
        [],
    )
    .map_err(DbError::Connection)?;
    Ok(())
}

/// Reads the value stored under `key`, `None` if the key was never written.
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(DbError::QueryFailed)
}

/// Inserts or replaces the value stored under `key`.
pub fn set_value(conn: &Connection, key: &str, value: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now()],
    )
    .map_err(DbError::UpdateFailed)?;
    Ok(())
}

/// Deletes `key`. Returns the number of rows removed (0 or 1).
pub fn delete_value(conn: &Connection, key: &str) -> Result<u64, DbError> {
    let rows = conn
        .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
        .map_err(DbError::DeleteFailed)?;
    Ok(rows as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete_value() -> Result<(), DbError> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;

        assert_eq!(get_value(&conn, "theme")?, None);

        set_value(&conn, "theme", "dark")?;
        assert_eq!(get_value(&conn, "theme")?.as_deref(), Some("dark"));

        // Upsert replaces the previous value
        set_value(&conn, "theme", "light")?;
        assert_eq!(get_value(&conn, "theme")?.as_deref(), Some("light"));

        assert_eq!(delete_value(&conn, "theme")?, 1);
        assert_eq!(delete_value(&conn, "theme")?, 0);
        assert_eq!(get_value(&conn, "theme")?, None);
        Ok(())
    }

    #[test]
    fn test_init_db_is_idempotent() -> Result<(), DbError> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        set_value(&conn, "k", "v")?;
        init_db(&conn)?;
        assert_eq!(get_value(&conn, "k")?.as_deref(), Some("v"));
        Ok(())
    }
}
