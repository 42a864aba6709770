//! Persistent key-value storage
//!
//! The todo collection is persisted as a single serialized value under one
//! logical key. This module defines the seam the store writes through and
//! the backends behind it:
//!
//! - `FileStore`: one file per key in a directory, replaced atomically
//! - `SqliteStore`: a `kv` table in a SQLite database
//! - `MemoryStore`: in-process map with fault injection, for tests
//!
//! # Example
//!
//! ```no_run
//! use libtodolist::storage::{FileStore, KeyValueStore};
//!
//! # async fn example() -> Result<(), libtodolist::error::StorageError> {
//! let store = FileStore::new("~/.local/share/todolist");
//! store.set("todos", "[]").await?;
//! assert_eq!(store.get("todos").await?.as_deref(), Some("[]"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Async string key-value storage
///
/// Values are opaque strings; callers own serialization.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if it was never written
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Deleting an absent key succeeds.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// Short backend identifier for logs (e.g., "file", "sqlite")
    fn backend_name(&self) -> &str;
}

/// Open the backend selected by configuration
///
/// # Errors
///
/// Returns an error if the SQLite database cannot be opened or migrated.
/// The file backend defers all IO to the first read or write.
pub async fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn KeyValueStore>> {
    let path = config.expanded_path();
    tracing::debug!(
        "Opening {:?} storage at {}",
        config.backend,
        path.display()
    );

    match config.backend {
        StorageBackend::File => Ok(Arc::new(FileStore::new(path))),
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&path).await?)),
    }
}
