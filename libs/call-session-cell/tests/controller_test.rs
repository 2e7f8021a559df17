mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use tokio::time::Instant;

use call_session_cell::models::{
    CallEvent, CallOutcome, CallSessionError, CallState, Counterpart, RemoteSessionEvent,
    SessionId, TimerKind,
};
use common::{advance_to, doctor, ControllerHarness};

#[tokio::test(start_paused = true)]
async fn test_unanswered_call_ends_with_no_answer() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();

    let call = harness.controller.start(doctor()).await.unwrap();
    assert_eq!(call.snapshot().state, CallState::Ringing);
    assert!(harness.hub.is_subscribed(call.session_id()).await);

    call.closed().await;

    assert_eq!(start.elapsed().as_secs(), 20);
    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].session_id, call.session_id());
    assert_eq!(reports[0].outcome, CallOutcome::NoAnswer);
    assert_eq!(reports[0].elapsed_seconds, 0);

    let snapshot = call.snapshot();
    assert_eq!(snapshot.state, CallState::Ended);
    assert_eq!(snapshot.outcome, Some(CallOutcome::NoAnswer));
    assert!(!snapshot.active);
    assert!(!harness.hub.is_subscribed(call.session_id()).await);
}

#[tokio::test(start_paused = true)]
async fn test_connect_cancels_no_answer_timer() {
    let mut harness = ControllerHarness::new(20, 120);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();
    let session_id = call.session_id();

    advance_to(5, start).await;
    assert!(harness.hub.publish(RemoteSessionEvent::joined(session_id)).await);

    // Well past the no-answer deadline.
    advance_to(30, start).await;
    assert_eq!(call.snapshot().state, CallState::Connected);
    assert!(call.snapshot().connected_at.is_some());
    assert!(harness.drain_reports().is_empty());

    advance_to(45, start).await;
    assert!(harness.hub.publish(RemoteSessionEvent::left(session_id)).await);
    call.closed().await;

    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::RemoteLeft);
    assert_eq!(reports[0].elapsed_seconds, 40);
}

#[tokio::test(start_paused = true)]
async fn test_user_hangup_while_ringing_cancels_both_timers() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();

    advance_to(3, start).await;
    assert!(call.end_call());
    call.closed().await;

    assert_eq!(start.elapsed().as_secs(), 3);
    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::UserEnded);
    assert_eq!(reports[0].elapsed_seconds, 0);

    // Firing the timers by hand after the fact changes nothing.
    assert!(!call.dispatch(CallEvent::TimerFired(TimerKind::NoAnswer)));
    assert!(!call.dispatch(CallEvent::TimerFired(TimerKind::LowBalance)));

    advance_to(120, start).await;
    assert!(harness.drain_reports().is_empty());
    assert_eq!(call.snapshot().outcome, Some(CallOutcome::UserEnded));
}

#[tokio::test(start_paused = true)]
async fn test_no_answer_wins_over_later_low_balance() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();

    advance_to(60, start).await;

    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::NoAnswer);
    assert!(call.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_low_balance_disconnects_connected_call() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();

    advance_to(4, start).await;
    harness.hub.publish(RemoteSessionEvent::joined(call.session_id())).await;
    call.closed().await;

    assert_eq!(start.elapsed().as_secs(), 30);
    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::LowBalanceDisconnect);
    assert_eq!(reports[0].elapsed_seconds, 26);
}

#[tokio::test(start_paused = true)]
async fn test_low_balance_fires_while_still_ringing() {
    let mut harness = ControllerHarness::new(45, 30);
    let call = harness.controller.start(doctor()).await.unwrap();

    call.closed().await;

    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::LowBalanceDisconnect);
    assert_eq!(reports[0].elapsed_seconds, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_twice_after_outcome_is_inert() {
    let mut harness = ControllerHarness::new(20, 30);
    let call = harness.controller.start(doctor()).await.unwrap();
    call.end_call();
    call.closed().await;

    call.dispose();
    call.dispose();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(harness.drain_reports().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_before_outcome_reports_nothing() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();
    let session_id = call.session_id();

    advance_to(5, start).await;
    call.dispose();
    call.closed().await;

    assert!(!harness.hub.is_subscribed(session_id).await);
    assert!(!harness.hub.publish(RemoteSessionEvent::joined(session_id)).await);

    advance_to(120, start).await;
    assert!(harness.drain_reports().is_empty());

    let snapshot = call.snapshot();
    assert_eq!(snapshot.state, CallState::Ringing);
    assert!(!snapshot.active);
    call.dispose();
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_abandons_call() {
    let mut harness = ControllerHarness::new(20, 30);
    let call = harness.controller.start(doctor()).await.unwrap();
    let session_id = call.session_id();

    drop(call);
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(harness.drain_reports().is_empty());
    assert_eq!(harness.hub.subscriber_count().await, 0);
    assert!(!harness.hub.publish(RemoteSessionEvent::joined(session_id)).await);
}

#[tokio::test(start_paused = true)]
async fn test_stale_session_event_is_ignored() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();

    let first = harness.controller.start(doctor()).await.unwrap();
    let stale_id = first.session_id();
    first.end_call();
    first.closed().await;
    harness.drain_reports();

    let second = harness.controller.start(doctor()).await.unwrap();
    assert_ne!(second.session_id(), stale_id);

    advance_to(5, start).await;
    assert!(!harness.hub.publish(RemoteSessionEvent::joined(stale_id)).await);
    // Even if a stale event reaches the queue directly it must not connect.
    assert!(second.dispatch(CallEvent::Remote(RemoteSessionEvent::joined(stale_id))));

    advance_to(6, start).await;
    assert_eq!(second.snapshot().state, CallState::Ringing);

    second.closed().await;
    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].session_id, second.session_id());
    assert_eq!(reports[0].outcome, CallOutcome::NoAnswer);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_joined_keeps_first_connect_time() {
    let mut harness = ControllerHarness::new(20, 600);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();
    let session_id = call.session_id();

    advance_to(5, start).await;
    harness.hub.publish(RemoteSessionEvent::joined(session_id)).await;
    advance_to(10, start).await;
    harness.hub.publish(RemoteSessionEvent::joined(session_id)).await;

    advance_to(70, start).await;
    call.end_call();
    call.closed().await;

    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::UserEnded);
    assert_eq!(reports[0].elapsed_seconds, 65);
}

#[tokio::test(start_paused = true)]
async fn test_remote_left_while_ringing_does_not_end_call() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();

    advance_to(2, start).await;
    assert!(harness.hub.publish(RemoteSessionEvent::left(call.session_id())).await);

    advance_to(3, start).await;
    assert_eq!(call.snapshot().state, CallState::Ringing);

    call.closed().await;
    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::NoAnswer);
}

#[tokio::test(start_paused = true)]
async fn test_events_queued_together_report_first_only() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();
    let call = harness.controller.start(doctor()).await.unwrap();
    let session_id = call.session_id();

    advance_to(5, start).await;
    harness.hub.publish(RemoteSessionEvent::joined(session_id)).await;
    advance_to(15, start).await;

    call.end_call();
    harness.hub.publish(RemoteSessionEvent::left(session_id)).await;
    call.dispatch(CallEvent::TimerFired(TimerKind::LowBalance));
    call.closed().await;

    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, CallOutcome::UserEnded);
    assert_eq!(reports[0].elapsed_seconds, 10);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_attempts_report_independently() {
    let mut harness = ControllerHarness::new(20, 30);
    let start = Instant::now();

    let unanswered = harness.controller.start(doctor()).await.unwrap();
    let hung_up = harness.controller.start(Counterpart::new("Dr. Ravi Kumar")).await.unwrap();
    let answered = harness.controller.start(Counterpart::new("Dr. Meera Iyer")).await.unwrap();

    advance_to(2, start).await;
    hung_up.end_call();
    harness.hub.publish(RemoteSessionEvent::joined(answered.session_id())).await;

    advance_to(12, start).await;
    harness.hub.publish(RemoteSessionEvent::left(answered.session_id())).await;

    advance_to(60, start).await;

    let reports = harness.drain_reports();
    assert_eq!(reports.len(), 3);

    let outcome_for = |id: SessionId| {
        reports
            .iter()
            .find(|report| report.session_id == id)
            .map(|report| (report.outcome, report.elapsed_seconds))
    };
    assert_eq!(outcome_for(unanswered.session_id()), Some((CallOutcome::NoAnswer, 0)));
    assert_eq!(outcome_for(hung_up.session_id()), Some((CallOutcome::UserEnded, 0)));
    assert_eq!(outcome_for(answered.session_id()), Some((CallOutcome::RemoteLeft, 10)));
}

#[tokio::test]
async fn test_blank_counterpart_is_rejected_without_side_effects() {
    let harness = ControllerHarness::new(20, 30);

    let result = harness.controller.start(Counterpart::new("  ")).await;

    assert_matches!(result, Err(CallSessionError::InvalidCounterpart { .. }));
    assert_eq!(harness.hub.subscriber_count().await, 0);
}
