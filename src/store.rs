//src/store.rs
//! Key-value persistence shared by the workout service and the state containers.
//!
//! Reads are fail-open: an unavailable backend or a corrupt payload is logged
//! and reported as "nothing stored". Writes return a [`StoreError`] and the
//! caller decides whether that is fatal.

use crate::db::{self, DbError};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Storage keys, one per owning container.
pub mod keys {
    pub const WORKOUTS: &str = "fitness_tracker_workouts";
    pub const USER_PROFILE: &str = "fitness_tracker_user_profile";
    pub const THEME: &str = "theme";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A durable (or not) string-to-string map.
pub trait KeyValueBackend: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend lock poisoned".to_string()))
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// SQLite-file backend (one `kv_store` table).
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database at `path` and initializes the schema.
    /// # Errors
    /// Returns `DbError` if the file cannot be opened or the table cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = db::open_db(&path)?;
        db::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// # Errors
    /// Returns `DbError` if SQLite cannot create the in-memory database.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        db::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database connection lock poisoned".to_string()))
    }
}

impl KeyValueBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn()?;
        Ok(db::get_value(&conn, key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        Ok(db::set_value(&conn, key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        db::delete_value(&conn, key)?;
        Ok(())
    }
}

/// Typed access to a shared backend. Cheap to clone.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Unfiltered read; lets callers tell "never written" apart from "backend failed".
    /// # Errors
    /// Propagates the backend error.
    pub fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(key)
    }

    /// Fail-open read of a raw string value.
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Error reading from storage, using default");
                None
            }
        }
    }

    /// Fail-open read of a JSON value. Corrupt payloads are logged and treated as absent.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.load_raw(key)?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable stored value");
                None
            }
        }
    }

    /// # Errors
    /// Returns `StoreError` if the backend rejects the write.
    pub fn save_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.backend.set(key, value)
    }

    /// # Errors
    /// Returns `StoreError::Serialize` if `value` cannot be encoded, or the backend error.
    pub fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &payload)
    }

    /// # Errors
    /// Returns `StoreError` if the backend rejects the delete.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }
}
