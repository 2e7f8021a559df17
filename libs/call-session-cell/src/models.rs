// libs/call-session-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

use shared_config::AppConfig;

// ==============================================================================
// CALL SESSION DOMAIN MODELS
// ==============================================================================

/// Identifies one call attempt. A fresh id is minted for every attempt so
/// that provider callbacks for an earlier attempt can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The doctor being called, as shown on the call and summary screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterpart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Consultation price per started minute, in whole currency units.
    #[serde(default)]
    pub rate_per_minute: u64,
}

impl Counterpart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            doctor_id: None,
            name: name.into(),
            photo_url: None,
            specialization: None,
            rate_per_minute: 0,
        }
    }

    pub fn with_doctor_id(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    pub fn with_photo(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = Some(specialization.into());
        self
    }

    pub fn with_rate(mut self, rate_per_minute: u64) -> Self {
        self.rate_per_minute = rate_per_minute;
        self
    }

    pub fn validate(&self) -> Result<(), CallSessionError> {
        if self.name.trim().is_empty() {
            return Err(CallSessionError::InvalidCounterpart {
                message: "Counterpart name must not be empty".to_string(),
            });
        }

        if matches!(&self.doctor_id, Some(id) if id.trim().is_empty()) {
            return Err(CallSessionError::InvalidCounterpart {
                message: "Doctor id must not be blank when provided".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Ringing,
    Connected,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    UserEnded,
    NoAnswer,
    LowBalanceDisconnect,
    RemoteLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    NoAnswer,
    LowBalance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteEventKind {
    Joined,
    Left,
}

/// A presence change reported by the real-time provider for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSessionEvent {
    pub session_id: SessionId,
    #[serde(rename = "event")]
    pub kind: RemoteEventKind,
}

impl RemoteSessionEvent {
    pub fn joined(session_id: SessionId) -> Self {
        Self {
            session_id,
            kind: RemoteEventKind::Joined,
        }
    }

    pub fn left(session_id: SessionId) -> Self {
        Self {
            session_id,
            kind: RemoteEventKind::Left,
        }
    }
}

/// Everything that can drive a call attempt forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    Remote(RemoteSessionEvent),
    UserEnded,
    TimerFired(TimerKind),
}

/// One outgoing call. Owned and mutated only by its controller task.
#[derive(Debug, Clone)]
pub struct CallAttempt {
    pub(crate) session_id: SessionId,
    pub(crate) counterpart: Counterpart,
    pub(crate) state: CallState,
    pub(crate) outcome: Option<CallOutcome>,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) connected_at: Option<Instant>,
    pub(crate) connected_at_utc: Option<DateTime<Utc>>,
    pub(crate) ended_at: Option<Instant>,
    pub(crate) ended_at_utc: Option<DateTime<Utc>>,
}

impl CallAttempt {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn outcome(&self) -> Option<CallOutcome> {
        self.outcome
    }

    pub fn connected_at(&self) -> Option<Instant> {
        self.connected_at
    }

    pub fn ended_at(&self) -> Option<Instant> {
        self.ended_at
    }
}

/// Read-only view of an attempt published after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSnapshot {
    pub session_id: SessionId,
    pub counterpart: Counterpart,
    pub state: CallState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CallOutcome>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: u64,
    /// False once the controller has released its timers and subscription.
    pub active: bool,
}

/// Delivered to the presenter exactly once per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalReport {
    pub session_id: SessionId,
    pub counterpart: Counterpart,
    pub outcome: CallOutcome,
    pub elapsed_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeouts {
    pub no_answer: Duration,
    pub low_balance: Duration,
}

impl CallTimeouts {
    pub fn new(no_answer: Duration, low_balance: Duration) -> Self {
        Self {
            no_answer,
            low_balance,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.no_answer_timeout(), config.low_balance_timeout())
    }
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ==============================================================================
// REQUEST/RESPONSE DTOs
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCallRequest {
    pub counterpart: Counterpart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCallResponse {
    pub success: bool,
    pub call: CallSnapshot,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEventResponse {
    pub delivered: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallSessionError {
    #[error("Invalid counterpart: {message}")]
    InvalidCounterpart { message: String },

    #[error("Session {session_id} already has a remote event subscription")]
    AlreadySubscribed { session_id: SessionId },

    #[error("Call session {session_id} not found")]
    SessionNotFound { session_id: SessionId },
}
