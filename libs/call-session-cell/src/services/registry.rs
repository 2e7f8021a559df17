// libs/call-session-cell/src/services/registry.rs
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use shared_config::AppConfig;

use crate::models::{
    CallSessionError, CallSnapshot, CallTimeouts, Counterpart, RemoteSessionEvent, SessionId,
};
use crate::services::controller::{CallSessionController, CallSessionHandle};
use crate::services::presenter::{CallSummary, SummaryStore};
use crate::services::remote_events::RemoteEventHub;

/// Live call handles by session id, wired to the provider hub and the
/// summary store. This is what the HTTP layer talks to.
///
/// Handles of finished calls are dropped whenever a new call starts. Their
/// summaries are kept until the call is disposed.
pub struct CallSessionRegistry {
    config: Arc<AppConfig>,
    controller: CallSessionController,
    hub: Arc<RemoteEventHub>,
    summaries: Arc<SummaryStore>,
    sessions: RwLock<HashMap<SessionId, CallSessionHandle>>,
}

impl CallSessionRegistry {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let hub = Arc::new(RemoteEventHub::new());
        let summaries = Arc::new(SummaryStore::new(config.currency_symbol.clone()));
        let controller = CallSessionController::with_tokio_timers(
            hub.clone(),
            summaries.clone(),
            CallTimeouts::from_config(&config),
        );

        Self {
            config,
            controller,
            hub,
            summaries,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[instrument(skip(self, counterpart))]
    pub async fn start_call(&self, counterpart: Counterpart) -> Result<CallSnapshot, CallSessionError> {
        let handle = self.controller.start(counterpart).await?;
        let snapshot = handle.snapshot();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| !handle.is_closed());
        if sessions.len() < before {
            debug!("Dropped {} finished call handles", before - sessions.len());
        }
        sessions.insert(handle.session_id(), handle);
        Ok(snapshot)
    }

    /// User hangup. Ending a call that already finished is a no-op.
    #[instrument(skip(self))]
    pub async fn end_call(&self, session_id: SessionId) -> Result<(), CallSessionError> {
        if let Some(handle) = self.sessions.read().await.get(&session_id) {
            if !handle.end_call() {
                debug!("End requested for finished call {}", session_id);
            }
            return Ok(());
        }

        if self.summaries.get(session_id).await.is_some() {
            debug!("End requested for finished call {}", session_id);
            return Ok(());
        }

        Err(CallSessionError::SessionNotFound { session_id })
    }

    /// Tears the attempt down (if still running) and forgets it. Once forgotten
    /// the session is unknown, so a repeated dispose reports `SessionNotFound`
    /// (404 over HTTP); callers can treat that as already disposed.
    #[instrument(skip(self))]
    pub async fn dispose(&self, session_id: SessionId) -> Result<(), CallSessionError> {
        let handle = self.sessions.write().await.remove(&session_id);
        let summary = self.summaries.remove(session_id).await;

        match (handle, summary) {
            (None, None) => Err(CallSessionError::SessionNotFound { session_id }),
            (handle, _) => {
                if let Some(handle) = handle {
                    handle.dispose();
                }
                info!("Disposed call session {}", session_id);
                Ok(())
            }
        }
    }

    pub async fn deliver_remote_event(&self, event: RemoteSessionEvent) -> bool {
        self.hub.publish(event).await
    }

    pub async fn snapshot(&self, session_id: SessionId) -> Result<CallSnapshot, CallSessionError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .map(CallSessionHandle::snapshot)
            .ok_or(CallSessionError::SessionNotFound { session_id })
    }

    /// `Ok(None)` while the call is still running.
    pub async fn summary(&self, session_id: SessionId) -> Result<Option<CallSummary>, CallSessionError> {
        if let Some(summary) = self.summaries.get(session_id).await {
            return Ok(Some(summary));
        }

        if self.sessions.read().await.contains_key(&session_id) {
            Ok(None)
        } else {
            Err(CallSessionError::SessionNotFound { session_id })
        }
    }

    pub async fn active_calls(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|handle| !handle.is_closed())
            .count()
    }

    /// Drops handles of finished calls; their summaries stay retrievable.
    pub async fn prune_finished(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| !handle.is_closed());
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {} finished call sessions", pruned);
        }
        pruned
    }
}
