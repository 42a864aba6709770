//! Provider for sessions without an identity provider
//!
//! Used by front ends that have no interactive sign-in flow, such as the
//! terminal client. The session stays signed out.

use async_trait::async_trait;

use super::{AuthProvider, IdentityCallback, Subscription};
use crate::error::AuthError;
use crate::types::Identity;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProvider;

#[async_trait]
impl AuthProvider for LocalProvider {
    async fn sign_in(&self) -> std::result::Result<Identity, AuthError> {
        Err(AuthError::Provider(
            "No identity provider is configured".to_string(),
        ))
    }

    async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        Ok(())
    }

    fn subscribe(&self, callback: IdentityCallback) -> Subscription {
        callback(None);
        Subscription::new(|| {})
    }

    fn current_identity(&self) -> Option<Identity> {
        None
    }

    fn name(&self) -> &str {
        "local"
    }
}
