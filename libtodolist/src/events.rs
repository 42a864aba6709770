//! Store event bus
//!
//! The todo store reports changes and soft failures here so a presentation
//! layer can react without the store ever returning an error.
//!
//! # Non-Blocking Behavior
//!
//! Events are dropped when nobody is subscribed. A lagging subscriber loses
//! the oldest events instead of blocking the store.
//!
//! # Example
//!
//! ```
//! use libtodolist::events::{EventBus, StoreEvent};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(StoreEvent::Loaded { count: 3 });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::Todo;

pub type StoreEventReceiver = broadcast::Receiver<StoreEvent>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive all events emitted after this call
    pub fn subscribe(&self) -> StoreEventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: StoreEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Events emitted by the todo store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Collection replaced from storage
    Loaded { count: usize },

    /// Reading or parsing the stored collection failed; in-memory state kept
    LoadFailed { error: String },

    Added { todo: Todo },

    Toggled { id: String, completed: bool },

    Removed { id: String },

    /// Writing the collection failed; the in-memory change stands
    PersistFailed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(StoreEvent::Removed {
            id: "42".to_string(),
        });

        match receiver.recv().await.unwrap() {
            StoreEvent::Removed { id } => assert_eq!(id, "42"),
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(StoreEvent::Loaded { count: 2 });

        assert_eq!(receiver1.recv().await.unwrap(), StoreEvent::Loaded { count: 2 });
        assert_eq!(receiver2.recv().await.unwrap(), StoreEvent::Loaded { count: 2 });
    }

    #[test]
    fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        event_bus.emit(StoreEvent::PersistFailed {
            error: "disk full".to_string(),
        });

        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = StoreEvent::Toggled {
            id: "7".to_string(),
            completed: true,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"toggled","id":"7","completed":true}"#);

        let back: StoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
