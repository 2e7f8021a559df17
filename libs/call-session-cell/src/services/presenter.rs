// libs/call-session-cell/src/services/presenter.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

use shared_utils::formatting::{billed_minutes, format_amount, format_duration};

use crate::models::{CallOutcome, SessionId, TerminalReport};

/// Receives the single terminal report of every call attempt.
#[async_trait]
pub trait OutcomePresenter: Send + Sync {
    async fn on_terminal(&self, report: TerminalReport);
}

/// Which post-call screen the app should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryScreen {
    CallEndedByPatient,
    CallEnded,
    NoAnswer,
    CallDisconnected,
}

impl SummaryScreen {
    pub fn for_outcome(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::UserEnded => SummaryScreen::CallEndedByPatient,
            CallOutcome::RemoteLeft => SummaryScreen::CallEnded,
            CallOutcome::NoAnswer => SummaryScreen::NoAnswer,
            CallOutcome::LowBalanceDisconnect => SummaryScreen::CallDisconnected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSummary {
    pub session_id: SessionId,
    pub screen: SummaryScreen,
    pub outcome: CallOutcome,
    pub doctor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_specialization: Option<String>,
    pub elapsed_seconds: u64,
    pub duration: String,
    pub amount_value: u64,
    pub amount: String,
    pub offer_recharge: bool,
}

impl CallSummary {
    pub fn from_report(report: &TerminalReport, currency_symbol: &str) -> Self {
        // Rates arrive from clients unbounded.
        let amount_value = billed_minutes(report.elapsed_seconds)
            .saturating_mul(report.counterpart.rate_per_minute);
        let screen = SummaryScreen::for_outcome(report.outcome);

        Self {
            session_id: report.session_id,
            screen,
            outcome: report.outcome,
            doctor_name: report.counterpart.name.clone(),
            doctor_photo: report.counterpart.photo_url.clone(),
            doctor_specialization: report.counterpart.specialization.clone(),
            elapsed_seconds: report.elapsed_seconds,
            duration: format_duration(report.elapsed_seconds),
            amount_value,
            amount: format_amount(currency_symbol, amount_value),
            offer_recharge: screen == SummaryScreen::CallDisconnected,
        }
    }
}

/// Keeps the rendered summary of every finished call until it is taken.
pub struct SummaryStore {
    currency_symbol: String,
    summaries: RwLock<HashMap<SessionId, CallSummary>>,
}

impl SummaryStore {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            summaries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, session_id: SessionId) -> Option<CallSummary> {
        self.summaries.read().await.get(&session_id).cloned()
    }

    pub async fn remove(&self, session_id: SessionId) -> Option<CallSummary> {
        self.summaries.write().await.remove(&session_id)
    }
}

#[async_trait]
impl OutcomePresenter for SummaryStore {
    async fn on_terminal(&self, report: TerminalReport) {
        let summary = CallSummary::from_report(&report, &self.currency_symbol);
        info!(
            "Call {} with {} ended: {:?}, duration {}, amount {}",
            summary.session_id, summary.doctor_name, summary.outcome, summary.duration, summary.amount
        );
        self.summaries.write().await.insert(report.session_id, summary);
    }
}

/// Forwards terminal reports to a channel, for hosts that drive their own UI loop.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    sender: mpsc::UnboundedSender<TerminalReport>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TerminalReport>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl OutcomePresenter for ChannelPresenter {
    async fn on_terminal(&self, report: TerminalReport) {
        // Receiver gone means nobody is rendering any more.
        let _ = self.sender.send(report);
    }
}
