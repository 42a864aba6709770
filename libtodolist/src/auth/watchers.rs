//! Identity-change callback registry

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::{IdentityCallback, Subscription};
use crate::types::Identity;

#[derive(Default)]
struct Registry {
    next_token: u64,
    callbacks: BTreeMap<u64, IdentityCallback>,
}

/// Set of identity callbacks, notified in registration order
///
/// Each registration is tied to the [`Subscription`] it returns; releasing
/// the subscription removes the callback. Subscriptions hold only a weak
/// reference, so they may outlive the registry.
#[derive(Clone, Default)]
pub struct IdentityWatchers {
    registry: Arc<Mutex<Registry>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|e| e.into_inner())
}

impl IdentityWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callback: IdentityCallback) -> Subscription {
        let token = {
            let mut registry = lock(&self.registry);
            let token = registry.next_token;
            registry.next_token += 1;
            registry.callbacks.insert(token, callback);
            token
        };

        let weak: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                lock(&registry).callbacks.remove(&token);
            }
        })
    }

    /// Call every registered callback with `identity`
    ///
    /// Callbacks run outside the registry lock, so they may subscribe or
    /// unsubscribe themselves.
    pub fn notify(&self, identity: Option<&Identity>) {
        let callbacks: Vec<IdentityCallback> =
            lock(&self.registry).callbacks.values().cloned().collect();

        for callback in callbacks {
            callback(identity.cloned());
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
