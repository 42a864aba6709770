//! Mock identity provider for testing
//!
//! A configurable provider that can simulate successful sign-in, rejected
//! or cancelled flows, failing sign-out, and slow responses. It is compiled
//! in all builds so integration tests and demos can drive the auth bridge
//! without a real identity provider.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::{AuthProvider, IdentityCallback, IdentityWatchers, Subscription};
use crate::error::AuthError;
use crate::types::Identity;

/// Configuration for mock provider behavior
#[derive(Debug, Clone)]
pub struct MockAuthConfig {
    /// Provider name reported to logs
    pub name: String,

    /// What the interactive sign-in flow yields
    pub sign_in_result: std::result::Result<Identity, AuthError>,

    /// Error returned by sign-out, if it should fail
    pub sign_out_error: Option<AuthError>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Number of times sign_in has been called
    pub sign_in_call_count: Arc<Mutex<usize>>,

    /// Number of times sign_out has been called
    pub sign_out_call_count: Arc<Mutex<usize>>,
}

impl Default for MockAuthConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            sign_in_result: Ok(Identity::new("mock-user", "mock")),
            sign_out_error: None,
            delay: Duration::from_millis(0),
            sign_in_call_count: Arc::new(Mutex::new(0)),
            sign_out_call_count: Arc::new(Mutex::new(0)),
        }
    }
}

/// Mock provider for testing
pub struct MockAuthProvider {
    config: MockAuthConfig,
    current: Mutex<Option<Identity>>,
    watchers: IdentityWatchers,
}

fn bump(counter: &Mutex<usize>) {
    *counter.lock().unwrap_or_else(|e| e.into_inner()) += 1;
}

impl MockAuthProvider {
    /// Create a new mock provider with the given configuration
    pub fn new(config: MockAuthConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
            watchers: IdentityWatchers::new(),
        }
    }

    /// Create a provider whose sign-in yields `identity`
    pub fn success(identity: Identity) -> Self {
        Self::new(MockAuthConfig {
            sign_in_result: Ok(identity),
            ..Default::default()
        })
    }

    /// Create a provider that rejects sign-in with `error`
    pub fn rejecting(error: AuthError) -> Self {
        Self::new(MockAuthConfig {
            sign_in_result: Err(error),
            ..Default::default()
        })
    }

    /// Create a provider where the user cancels the sign-in flow
    pub fn cancelled() -> Self {
        Self::rejecting(AuthError::Cancelled)
    }

    /// Create a provider whose sign-out fails with `error`
    pub fn sign_out_failure(error: AuthError) -> Self {
        Self::new(MockAuthConfig {
            sign_out_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a provider with a delay on every operation
    pub fn with_delay(identity: Identity, delay: Duration) -> Self {
        Self::new(MockAuthConfig {
            sign_in_result: Ok(identity),
            delay,
            ..Default::default()
        })
    }

    /// Simulate a provider-side session change (token expiry, another tab)
    pub fn set_identity(&self, identity: Option<Identity>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = identity.clone();
        self.watchers.notify(identity.as_ref());
    }

    /// Get the number of times sign_in was called
    pub fn sign_in_call_count(&self) -> usize {
        *self
            .config
            .sign_in_call_count
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Get the number of times sign_out was called
    pub fn sign_out_call_count(&self) -> usize {
        *self
            .config
            .sign_out_call_count
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Number of live identity subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.watchers.len()
    }

    async fn simulate_latency(&self) {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in(&self) -> std::result::Result<Identity, AuthError> {
        bump(&self.config.sign_in_call_count);
        self.simulate_latency().await;

        let identity = self.config.sign_in_result.clone()?;
        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        bump(&self.config.sign_out_call_count);
        self.simulate_latency().await;

        if let Some(error) = &self.config.sign_out_error {
            return Err(error.clone());
        }
        self.set_identity(None);
        Ok(())
    }

    fn subscribe(&self, callback: IdentityCallback) -> Subscription {
        let subscription = self.watchers.register(Arc::clone(&callback));
        callback(self.current_identity());
        subscription
    }

    fn current_identity(&self) -> Option<Identity> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_updates_session_and_counts() {
        let provider = MockAuthProvider::success(Identity::new("uid-7", "google.com"));

        let identity = provider.sign_in().await.unwrap();
        assert_eq!(identity.uid, "uid-7");
        assert_eq!(provider.current_identity(), Some(identity));
        assert_eq!(provider.sign_in_call_count(), 1);

        provider.sign_out().await.unwrap();
        assert_eq!(provider.current_identity(), None);
        assert_eq!(provider.sign_out_call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejecting_keeps_session_empty() {
        let provider =
            MockAuthProvider::rejecting(AuthError::InvalidCredentials("bad token".to_string()));

        let result = provider.sign_in().await;
        assert_eq!(
            result,
            Err(AuthError::InvalidCredentials("bad token".to_string()))
        );
        assert_eq!(provider.current_identity(), None);
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_then_changes() {
        let provider = MockAuthProvider::success(Identity::new("uid-1", "google.com"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let subscription = provider.subscribe(Arc::new(move |identity: Option<Identity>| {
            sink.lock().unwrap().push(identity.is_some());
        }));

        provider.sign_in().await.unwrap();
        provider.sign_out().await.unwrap();
        subscription.unsubscribe();
        provider.set_identity(Some(Identity::new("uid-2", "google.com")));

        assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
        assert_eq!(provider.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_sign_out_keeps_identity() {
        let provider = MockAuthProvider::sign_out_failure(AuthError::Network("offline".to_string()));
        provider.sign_in().await.unwrap();

        assert!(provider.sign_out().await.is_err());
        assert!(provider.current_identity().is_some());
    }
}
