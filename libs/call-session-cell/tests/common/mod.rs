#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use call_session_cell::models::{CallTimeouts, Counterpart, TerminalReport};
use call_session_cell::services::{CallSessionController, ChannelPresenter, RemoteEventHub};
use shared_utils::test_utils::{TestConfig, TestCounterpart};

pub struct ControllerHarness {
    pub controller: CallSessionController,
    pub hub: Arc<RemoteEventHub>,
    pub reports: mpsc::UnboundedReceiver<TerminalReport>,
}

impl ControllerHarness {
    pub fn new(no_answer_seconds: u64, low_balance_seconds: u64) -> Self {
        let config = TestConfig::with_timeouts(no_answer_seconds, low_balance_seconds).to_app_config();
        let hub = Arc::new(RemoteEventHub::new());
        let (presenter, reports) = ChannelPresenter::new();
        let controller = CallSessionController::with_tokio_timers(
            hub.clone(),
            Arc::new(presenter),
            CallTimeouts::from_config(&config),
        );

        Self {
            controller,
            hub,
            reports,
        }
    }

    /// Every report produced so far; use after the session has closed.
    pub fn drain_reports(&mut self) -> Vec<TerminalReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.reports.try_recv() {
            reports.push(report);
        }
        reports
    }
}

pub fn doctor() -> Counterpart {
    let doctor = TestCounterpart::default();
    Counterpart::new(doctor.name)
        .with_doctor_id(doctor.doctor_id)
        .with_photo(doctor.photo_url)
        .with_specialization(doctor.specialization)
        .with_rate(doctor.rate_per_minute)
}

pub async fn advance_to(seconds: u64, start: tokio::time::Instant) {
    tokio::time::sleep_until(start + Duration::from_secs(seconds)).await;
}
