//! Durable key-value storage of JSON documents.
//!
//! Each logical key (`inner-bloom-data`, ...) maps to exactly one serialized
//! document. A missing key is not an error: `load` hands back the caller's
//! default so first runs start from a well-defined state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::data_dir;
use crate::error::StoreError;

/// Load/save of whole JSON documents by key.
pub trait DocumentStore: Send + Sync {
    /// Read the raw document stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Durably replace the document stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Load and deserialize `key`, or return `default` on first run.
    fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, StoreError>
    where
        Self: Sized,
    {
        match self.read(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            }),
            None => Ok(default),
        }
    }

    /// Serialize and save `value` under `key`.
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        self.write(key, &raw)
    }
}

/// One `<key>.json` file per key.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store files in the application data directory.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Ok(Self { dir })
    }

    /// Store files in `dir` (created if needed).
    pub fn new_with_path(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        // Write-then-rename so a crash never leaves a truncated document.
        std::fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}

/// Documents in the `kv` table of `innerbloom.db`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at `~/.config/innerbloom/innerbloom.db`.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::DataDir(e.to_string()))?
            .join("innerbloom.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A panic while holding the connection cannot leave a half-written row.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-process store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn docs(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.docs().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(key.to_string()));
        }
        self.docs().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
