//! Todo store
//!
//! Holds the ordered todo collection in memory and mirrors it to a
//! [`KeyValueStore`] under a single key.
//!
//! # Persistence policy
//!
//! Write-through: every mutation that changes the collection is immediately
//! followed by a write of the full collection. There is no batching or
//! debouncing, and operations that change nothing write nothing.
//!
//! # Failure policy
//!
//! Storage failures never reach the caller. A failed load keeps the previous
//! in-memory collection; a failed write keeps the in-memory change. Both are
//! logged and reported on the event bus (see [`StoreEvent`]). Callers that
//! need the error itself can use [`TodoStore::try_persist`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libtodolist::config::IdScheme;
//! use libtodolist::storage::MemoryStore;
//! use libtodolist::store::TodoStore;
//!
//! # async fn example() {
//! let store = TodoStore::new(Arc::new(MemoryStore::new()), "todos", IdScheme::Timestamp);
//! store.load().await;
//!
//! if let Some(todo) = store.add("  buy milk ").await {
//!     assert_eq!(todo.text, "buy milk");
//!     store.toggle(&todo.id).await;
//!     store.remove(&todo.id).await;
//! }
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{Config, IdScheme};
use crate::events::{EventBus, StoreEvent, StoreEventReceiver};
use crate::ids::IdGenerator;
use crate::storage::{self, KeyValueStore, StorageResult};
use crate::types::Todo;

pub struct TodoStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    todos: Mutex<Vec<Todo>>,
    ids: IdGenerator,
    event_bus: EventBus,
}

impl TodoStore {
    /// Create an empty store persisting under `key`
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>, scheme: IdScheme) -> Self {
        Self {
            storage,
            key: key.into(),
            todos: Mutex::new(Vec::new()),
            ids: IdGenerator::new(scheme),
            event_bus: EventBus::new(100),
        }
    }

    /// Open the configured storage backend and create a store on it
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be opened.
    pub async fn from_config(config: &Config) -> StorageResult<Self> {
        let storage = storage::open_store(&config.storage).await?;
        Ok(Self::new(
            storage,
            config.storage.key.clone(),
            config.ids.scheme,
        ))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend_name(&self) -> &str {
        self.storage.backend_name()
    }

    /// Subscribe to store events
    pub fn subscribe(&self) -> StoreEventReceiver {
        self.event_bus.subscribe()
    }

    /// Replace the in-memory collection with the persisted one
    ///
    /// Returns the collection now held in memory. If nothing is stored yet,
    /// or reading/parsing fails, the previous in-memory collection is kept
    /// and returned.
    pub async fn load(&self) -> Vec<Todo> {
        let mut todos = self.todos.lock().await;

        match self.read_stored().await {
            Ok(Some(stored)) => {
                tracing::debug!("Loaded {} todos from '{}'", stored.len(), self.key);
                *todos = stored;
                self.event_bus.emit(StoreEvent::Loaded {
                    count: todos.len(),
                });
            }
            Ok(None) => {
                tracing::debug!("No stored todos under '{}'", self.key);
            }
            Err(e) => {
                tracing::error!("Error loading todos: {}", e);
                self.event_bus.emit(StoreEvent::LoadFailed {
                    error: e.to_string(),
                });
            }
        }

        todos.clone()
    }

    async fn read_stored(&self) -> StorageResult<Option<Vec<Todo>>> {
        match self.storage.get(&self.key).await? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    /// Append a new open todo with the trimmed text
    ///
    /// Blank text is ignored and returns `None`.
    pub async fn add(&self, text: &str) -> Option<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut todos = self.todos.lock().await;
        let id = self
            .ids
            .next_id(|candidate| todos.iter().any(|t| t.id == candidate));
        let todo = Todo::new(id, text.to_string());
        todos.push(todo.clone());

        tracing::debug!("Added todo {}", todo.id);
        self.event_bus.emit(StoreEvent::Added { todo: todo.clone() });
        self.persist(&todos).await;

        Some(todo)
    }

    /// Flip the completion flag of every todo with `id`
    ///
    /// Collections loaded from storage may hold duplicate ids; each match is
    /// flipped. Returns the new flag of the first match, or `None` if no
    /// todo matches.
    pub async fn toggle(&self, id: &str) -> Option<bool> {
        let mut todos = self.todos.lock().await;
        let mut first = None;
        for todo in todos.iter_mut().filter(|t| t.id == id) {
            todo.completed = !todo.completed;
            if first.is_none() {
                first = Some(todo.completed);
            }
        }
        let completed = first?;

        self.event_bus.emit(StoreEvent::Toggled {
            id: id.to_string(),
            completed,
        });
        self.persist(&todos).await;

        Some(completed)
    }

    /// Remove every todo with `id`, keeping the order of the rest
    ///
    /// Returns the first removed todo, or `None` if no todo matches.
    pub async fn remove(&self, id: &str) -> Option<Todo> {
        let mut todos = self.todos.lock().await;
        let removed = todos.iter().find(|t| t.id == id).cloned()?;
        let before = todos.len();
        todos.retain(|t| t.id != id);

        tracing::debug!("Removed {} todo(s) with id {}", before - todos.len(), id);
        self.event_bus.emit(StoreEvent::Removed {
            id: removed.id.clone(),
        });
        self.persist(&todos).await;

        Some(removed)
    }

    /// Write `todos` under the store key, logging instead of failing
    pub async fn persist(&self, todos: &[Todo]) {
        if let Err(e) = self.try_persist(todos).await {
            tracing::error!("Error saving todos: {}", e);
            self.event_bus.emit(StoreEvent::PersistFailed {
                error: e.to_string(),
            });
        }
    }

    /// Write `todos` under the store key
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub async fn try_persist(&self, todos: &[Todo]) -> StorageResult<()> {
        let serialized = serde_json::to_string(todos)?;
        self.storage.set(&self.key, &serialized).await
    }

    /// Snapshot of the in-memory collection in display order
    pub async fn todos(&self) -> Vec<Todo> {
        self.todos.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Todo> {
        self.todos.lock().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.todos.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.lock().await.is_empty()
    }
}
