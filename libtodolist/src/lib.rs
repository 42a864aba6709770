//! Todolist - a single-list todo core with optional provider sign-in
//!
//! This library provides the todo store (write-through persistence to a
//! key-value backend) and the auth bridge over an external identity
//! provider, plus the session type a presentation layer drives.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod logging;
pub mod storage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use app::TodoApp;
pub use auth::{AuthBridge, AuthProvider, Subscription};
pub use config::Config;
pub use error::{AuthError, Result, StorageError, TodoError};
pub use store::TodoStore;
pub use types::{Identity, Todo};
