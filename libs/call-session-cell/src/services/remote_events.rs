// libs/call-session-cell/src/services/remote_events.rs
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{CallEvent, CallSessionError, RemoteSessionEvent, SessionId};
use crate::services::controller::EventSink;

/// Source of presence events from the real-time provider, scoped per session.
#[async_trait]
pub trait RemoteSessionEvents: Send + Sync {
    async fn subscribe(&self, session_id: SessionId, sink: EventSink) -> Result<(), CallSessionError>;

    async fn unsubscribe(&self, session_id: SessionId);
}

/// In-process fan-in for provider callbacks. The webhook handler publishes
/// here and the hub forwards each event to the controller subscribed for
/// that session.
pub struct RemoteEventHub {
    subscribers: RwLock<HashMap<SessionId, EventSink>>,
}

impl RemoteEventHub {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns whether a live controller accepted the event.
    pub async fn publish(&self, event: RemoteSessionEvent) -> bool {
        let subscribers = self.subscribers.read().await;
        match subscribers.get(&event.session_id) {
            Some(sink) => sink.deliver(CallEvent::Remote(event)),
            None => {
                debug!("Dropping {:?} for unknown session {}", event.kind, event.session_id);
                false
            }
        }
    }

    pub async fn is_subscribed(&self, session_id: SessionId) -> bool {
        self.subscribers.read().await.contains_key(&session_id)
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for RemoteEventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteSessionEvents for RemoteEventHub {
    async fn subscribe(&self, session_id: SessionId, sink: EventSink) -> Result<(), CallSessionError> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.contains_key(&session_id) {
            return Err(CallSessionError::AlreadySubscribed { session_id });
        }
        subscribers.insert(session_id, sink);
        debug!("Subscribed remote events for session {}", session_id);
        Ok(())
    }

    async fn unsubscribe(&self, session_id: SessionId) {
        if self.subscribers.write().await.remove(&session_id).is_some() {
            debug!("Unsubscribed remote events for session {}", session_id);
        }
    }
}
