// libs/call-session-cell/src/services/state_machine.rs
//
// Transition rules for a single call attempt. Everything here is synchronous
// and clock-agnostic: the caller supplies `now`, and the returned
// `Transition` tells the controller which side effects to perform.

use chrono::Utc;
use tokio::time::Instant;

use crate::models::{
    CallAttempt, CallEvent, CallOutcome, CallSnapshot, CallState, Counterpart,
    RemoteEventKind, SessionId, TerminalReport, TimerKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Ignored(IgnoreReason),
    Connected,
    Terminated(TerminalReport),
}

/// Why an event left the attempt untouched. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    AlreadyEnded,
    StaleSession,
    DuplicateJoin,
    LeftWhileRinging,
    NoAnswerAfterConnect,
}

impl CallAttempt {
    pub fn new(counterpart: Counterpart) -> Self {
        Self {
            session_id: SessionId::new(),
            counterpart,
            state: CallState::Ringing,
            outcome: None,
            started_at: Utc::now(),
            connected_at: None,
            connected_at_utc: None,
            ended_at: None,
            ended_at_utc: None,
        }
    }

    pub fn apply(&mut self, event: &CallEvent, now: Instant) -> Transition {
        if self.state == CallState::Ended {
            return Transition::Ignored(IgnoreReason::AlreadyEnded);
        }

        match *event {
            CallEvent::Remote(remote) if remote.session_id != self.session_id => {
                Transition::Ignored(IgnoreReason::StaleSession)
            }
            CallEvent::Remote(remote) => match (remote.kind, self.state) {
                (RemoteEventKind::Joined, CallState::Ringing) => {
                    self.state = CallState::Connected;
                    self.connected_at = Some(now);
                    self.connected_at_utc = Some(Utc::now());
                    Transition::Connected
                }
                (RemoteEventKind::Joined, _) => Transition::Ignored(IgnoreReason::DuplicateJoin),
                (RemoteEventKind::Left, CallState::Connected) => {
                    self.terminate(CallOutcome::RemoteLeft, now)
                }
                (RemoteEventKind::Left, _) => Transition::Ignored(IgnoreReason::LeftWhileRinging),
            },
            CallEvent::UserEnded => self.terminate(CallOutcome::UserEnded, now),
            CallEvent::TimerFired(TimerKind::NoAnswer) => {
                if self.state == CallState::Ringing {
                    self.terminate(CallOutcome::NoAnswer, now)
                } else {
                    Transition::Ignored(IgnoreReason::NoAnswerAfterConnect)
                }
            }
            CallEvent::TimerFired(TimerKind::LowBalance) => {
                self.terminate(CallOutcome::LowBalanceDisconnect, now)
            }
        }
    }

    fn terminate(&mut self, outcome: CallOutcome, now: Instant) -> Transition {
        self.state = CallState::Ended;
        self.outcome = Some(outcome);
        self.ended_at = Some(now);
        self.ended_at_utc = Some(Utc::now());
        Transition::Terminated(TerminalReport {
            session_id: self.session_id,
            counterpart: self.counterpart.clone(),
            outcome,
            elapsed_seconds: self.elapsed_seconds(),
        })
    }

    /// Whole seconds between connect and end; zero if the call never connected.
    pub fn elapsed_seconds(&self) -> u64 {
        match (self.connected_at, self.ended_at) {
            (Some(connected), Some(ended)) => ended.saturating_duration_since(connected).as_secs(),
            _ => 0,
        }
    }

    pub fn snapshot(&self, active: bool) -> CallSnapshot {
        CallSnapshot {
            session_id: self.session_id,
            counterpart: self.counterpart.clone(),
            state: self.state,
            outcome: self.outcome,
            started_at: self.started_at,
            connected_at: self.connected_at_utc,
            ended_at: self.ended_at_utc,
            elapsed_seconds: self.elapsed_seconds(),
            active,
        }
    }
}
