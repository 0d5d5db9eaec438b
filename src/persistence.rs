//! SQLite-backed key-value store with JSON-serialized values.
//!
//! The storage surface is deliberately small: load, save, remove by
//! key. Every caller treats failures as warnings; in-memory state stays
//! authoritative and the next successful write reconciles.

use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage key for the session catalog (array of presets).
pub const KEY_SESSIONS: &str = "sessions";
/// Storage key for the active session id.
pub const KEY_ACTIVE_SESSION: &str = "active_session";
/// Storage key for the analytics counters.
pub const KEY_ANALYTICS: &str = "analytics";
/// Storage key for the user settings.
pub const KEY_SETTINGS: &str = "settings";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens the store at the default platform data path, initializing
    /// the table if needed.
    pub fn new() -> Result<Self, StoreError> {
        Self::open(&Self::db_path())
    }

    /// Opens the store at a specific path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| StoreError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_table(&conn)?;
        Ok(Self { conn })
    }

    /// Opens a store that lives only for this process. Used as the
    /// fallback when the on-disk database cannot be opened, and by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_table(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_table(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn db_path() -> PathBuf {
        ProjectDirs::from("com", "focusbar", "Focusbar")
            .map(|dirs| dirs.data_dir().join("focusbar.db"))
            .unwrap_or_else(|| PathBuf::from("focusbar.db"))
    }

    /// Loads and deserializes the value under `key`. `Ok(None)` when the
    /// key is absent; `Err` when the row exists but cannot be parsed.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT value FROM store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    /// Serializes and writes the value under `key`, replacing any
    /// previous value.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO store (key, value) VALUES (?, ?)",
            [key, json.as_str()],
        )?;
        Ok(())
    }

    /// Deletes the value under `key`. Absent keys are not an error.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM store WHERE key = ?", [key])?;
        Ok(())
    }
}
