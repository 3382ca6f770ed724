//! SqliteStorage - Embedded Relational Storage Backend
//!
//! Stores every key as one row of a single table in a libsql database file:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS files (
//!     path TEXT PRIMARY KEY,
//!     data BLOB NOT NULL
//! )
//! ```
//!
//! # Connection Handling
//!
//! The backend keeps one connection for its whole lifetime. An in-memory
//! libsql database exists only for the connection that created it, so opening
//! a fresh connection per call would hand every call an empty database.
//! Access to the connection is serialised by an async mutex.

use crate::db::error::validate_key;
use crate::db::{Storage, StorageError};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const IN_MEMORY: &str = ":memory:";

/// libsql-backed storage backend
pub struct SqliteStorage {
    /// Keeps the database handle alive alongside its connection
    _db: Database,
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl SqliteStorage {
    /// Open or create a database file and ensure the `files` table exists
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the parent directory cannot be created, the
    /// database cannot be opened, or the schema cannot be initialised.
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let db_path = db_path.into();

        if db_path != Path::new(IN_MEMORY) {
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| StorageError::io(parent.to_string_lossy(), e))?;
                }
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StorageError::connection_failed(db_path.clone(), e))?;
        let conn = db
            .connect()
            .map_err(|e| StorageError::connection_failed(db_path.clone(), e))?;

        let storage = Self {
            _db: db,
            conn: Mutex::new(conn),
            db_path,
        };
        storage.initialize_schema().await?;

        tracing::info!(
            "Opened sqlite storage at {}",
            storage.db_path.display()
        );
        Ok(storage)
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::open(IN_MEMORY).await
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;

        // PRAGMA statements return rows, so they go through query()
        let mut stmt = conn
            .prepare("PRAGMA busy_timeout = 5000")
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to set busy timeout: {}", e)))?;
        let _ = stmt
            .query(())
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to set busy timeout: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS files (
                path TEXT PRIMARY KEY,
                data BLOB NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| StorageError::sql_execution(format!("Failed to create files table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT 1 FROM files WHERE path = ?")
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to prepare exists query: {}", e)))?;
        let mut rows = stmt
            .query([key])
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to check '{}': {}", key, e)))?;
        let row = rows
            .next()
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to read row: {}", e)))?;
        Ok(row.is_some())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT data FROM files WHERE path = ?")
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to prepare read query: {}", e)))?;
        let mut rows = stmt
            .query([key])
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to read '{}': {}", key, e)))?;

        match rows
            .next()
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to read row: {}", e)))?
        {
            Some(row) => {
                let data: Vec<u8> = row.get(0).map_err(|e| {
                    StorageError::sql_execution(format!("Failed to decode data for '{}': {}", key, e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO files (path, data) VALUES (?, ?)
             ON CONFLICT(path) DO UPDATE SET data = excluded.data",
            (key, data.to_vec()),
        )
        .await
        .map_err(|e| StorageError::sql_execution(format!("Failed to write '{}': {}", key, e)))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let conn = self.conn.lock().await;
        let affected = conn
            .execute("DELETE FROM files WHERE path = ?", [key])
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to delete '{}': {}", key, e)))?;
        Ok(affected > 0)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM files", ())
            .await
            .map_err(|e| StorageError::sql_execution(format!("Failed to clear files: {}", e)))?;
        tracing::debug!("Cleared sqlite storage at {}", self.db_path.display());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
