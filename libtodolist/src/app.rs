//! Application session
//!
//! `TodoApp` is what a presentation layer drives: it owns the todo store and
//! the auth bridge, tracks the latest identity reported by the provider, and
//! holds the identity subscription for the lifetime of the session.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libtodolist::app::TodoApp;
//! use libtodolist::auth::{AuthBridge, MockAuthProvider};
//! use libtodolist::Config;
//!
//! # async fn example() -> libtodolist::Result<()> {
//! let config = Config::load()?;
//! let provider = Arc::new(MockAuthProvider::cancelled());
//! let app = TodoApp::from_config(&config, AuthBridge::new(provider)).await?;
//!
//! app.start().await;
//! app.store().add("water plants").await;
//! app.shutdown();
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::auth::{AuthBridge, Subscription};
use crate::config::Config;
use crate::error::Result;
use crate::store::TodoStore;
use crate::types::{Identity, Todo};

pub struct TodoApp {
    store: TodoStore,
    auth: AuthBridge,
    identity: Arc<RwLock<Option<Identity>>>,
    subscription: Mutex<Option<Subscription>>,
    refreshing: AtomicUsize,
}

impl TodoApp {
    pub fn new(store: TodoStore, auth: AuthBridge) -> Self {
        Self {
            store,
            auth,
            identity: Arc::new(RwLock::new(None)),
            subscription: Mutex::new(None),
            refreshing: AtomicUsize::new(0),
        }
    }

    /// Build the store from configuration and pair it with `auth`
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be opened.
    pub async fn from_config(config: &Config, auth: AuthBridge) -> Result<Self> {
        let store = TodoStore::from_config(config).await?;
        Ok(Self::new(store, auth))
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn auth(&self) -> &AuthBridge {
        &self.auth
    }

    /// Subscribe to identity changes, then load the stored todos
    ///
    /// Calling `start` again replaces the previous subscription.
    pub async fn start(&self) -> Vec<Todo> {
        let slot = Arc::clone(&self.identity);
        let subscription = self.auth.subscribe(move |identity| {
            *slot.write().unwrap_or_else(|e| e.into_inner()) = identity;
        });

        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(subscription);
        drop(previous);

        self.store.load().await
    }

    /// Reload todos from storage
    pub async fn refresh(&self) -> Vec<Todo> {
        let _refreshing = RefreshGuard::enter(&self.refreshing);
        self.store.load().await
    }

    /// True while at least one [`refresh`](Self::refresh) is in flight
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst) > 0
    }

    /// Latest identity delivered by the provider subscription
    pub fn current_identity(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_identity().is_some()
    }

    pub async fn sign_in(&self) -> Option<Identity> {
        self.auth.sign_in().await
    }

    pub async fn sign_out(&self) -> bool {
        self.auth.sign_out().await
    }

    /// Release the identity subscription
    pub fn shutdown(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            tracing::debug!("Released identity subscription");
        }
    }
}

/// Counts one in-flight refresh until dropped
struct RefreshGuard<'a>(&'a AtomicUsize);

impl<'a> RefreshGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Drop for TodoApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
