//! Auth bridge over an external identity provider
//!
//! The provider (for example a Google sign-in SDK binding) is an external
//! collaborator; this crate only consumes three operations from it: an
//! interactive sign-in, a sign-out, and identity-change notifications.
//!
//! # Architecture
//!
//! - `AuthProvider` trait: the provider boundary, implemented by the
//!   embedding application
//! - `AuthBridge`: converts provider failures into benign results
//!   (`None` / `false`) and logs them
//! - `Subscription`: handle for an identity-change registration, released
//!   on `unsubscribe()` or drop
//! - `IdentityWatchers`: callback registry provider implementations can
//!   build on
//! - `MockAuthProvider`: scriptable provider for tests and demos
//! - `LocalProvider`: always signed out, for front ends without sign-in
//!
//! The provider is injected where it is needed instead of being read from
//! a process-wide singleton.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libtodolist::auth::{AuthBridge, MockAuthProvider};
//! use libtodolist::Identity;
//!
//! # async fn example() {
//! let provider = MockAuthProvider::success(Identity::new("uid-1", "google.com"));
//! let bridge = AuthBridge::new(Arc::new(provider));
//!
//! let subscription = bridge.subscribe(|identity| {
//!     println!("Signed in as: {:?}", identity.map(|i| i.uid));
//! });
//!
//! if let Some(identity) = bridge.sign_in().await {
//!     println!("Welcome {}", identity.label());
//! }
//!
//! subscription.unsubscribe();
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::types::Identity;

pub mod local;
pub mod mock;
pub mod watchers;

pub use local::LocalProvider;
pub use mock::{MockAuthConfig, MockAuthProvider};
pub use watchers::IdentityWatchers;

/// Callback invoked with the new identity (`None` when signed out)
pub type IdentityCallback = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Identity provider boundary
///
/// Implementations should deliver the current identity to a new subscriber
/// right away, then again on every change.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Run the provider's interactive sign-in flow
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Cancelled` if the user backs out, or another
    /// variant for network, credential and provider failures.
    async fn sign_in(&self) -> std::result::Result<Identity, AuthError>;

    /// End the provider session
    async fn sign_out(&self) -> std::result::Result<(), AuthError>;

    /// Register for identity-change notifications
    fn subscribe(&self, callback: IdentityCallback) -> Subscription;

    /// Identity of the current provider session, if any
    fn current_identity(&self) -> Option<Identity>;

    /// Provider identifier for logs (e.g., "google")
    fn name(&self) -> &str;
}

/// Registration handle returned by [`AuthProvider::subscribe`]
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the registration now
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Failure-absorbing wrapper around an [`AuthProvider`]
#[derive(Clone)]
pub struct AuthBridge {
    provider: Arc<dyn AuthProvider>,
}

impl AuthBridge {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Sign in, returning `None` on any provider failure
    pub async fn sign_in(&self) -> Option<Identity> {
        match self.provider.sign_in().await {
            Ok(identity) => {
                tracing::info!(
                    "Signed in with {} as {}",
                    self.provider.name(),
                    identity.uid
                );
                Some(identity)
            }
            Err(AuthError::Cancelled) => {
                tracing::warn!("Sign-in with {} cancelled", self.provider.name());
                None
            }
            Err(e) => {
                tracing::error!("Sign-in error: {}", e);
                None
            }
        }
    }

    /// Sign out, returning whether the provider accepted it
    pub async fn sign_out(&self) -> bool {
        match self.provider.sign_out().await {
            Ok(()) => {
                tracing::info!("Signed out of {}", self.provider.name());
                true
            }
            Err(e) => {
                tracing::error!("Sign out error: {}", e);
                false
            }
        }
    }

    /// Register `callback` for identity changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<Identity>) + Send + Sync + 'static,
    {
        self.provider.subscribe(Arc::new(callback))
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.provider.current_identity()
    }
}
