// libs/call-session-cell/src/services/controller.rs
//
// Each call attempt is driven by one spawned task that owns the `CallAttempt`
// and drains a single queue. Timer callbacks, provider events, the user's
// hangup and dispose requests all arrive through that queue, so the first
// terminal event processed wins and everything after it is dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

use crate::models::{
    CallAttempt, CallEvent, CallSessionError, CallSnapshot, CallTimeouts, Counterpart, SessionId,
    TimerKind,
};
use crate::services::presenter::OutcomePresenter;
use crate::services::remote_events::RemoteSessionEvents;
use crate::services::state_machine::Transition;
use crate::services::timer::{TimerHandle, TimerService, TokioTimerService};

#[derive(Debug)]
pub enum ControllerMessage {
    Event(CallEvent),
    Dispose,
}

/// Write end of one controller's queue, handed to timers and event sources.
#[derive(Debug, Clone)]
pub struct EventSink {
    session_id: SessionId,
    sender: mpsc::UnboundedSender<ControllerMessage>,
}

impl EventSink {
    pub fn new(session_id: SessionId, sender: mpsc::UnboundedSender<ControllerMessage>) -> Self {
        Self { session_id, sender }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// False once the controller has been torn down.
    pub fn deliver(&self, event: CallEvent) -> bool {
        self.sender.send(ControllerMessage::Event(event)).is_ok()
    }
}

/// Starts call attempts. One controller can run any number of attempts; each
/// gets its own session id, timers and queue.
pub struct CallSessionController {
    timers: Arc<dyn TimerService>,
    remote_events: Arc<dyn RemoteSessionEvents>,
    presenter: Arc<dyn OutcomePresenter>,
    timeouts: CallTimeouts,
}

impl CallSessionController {
    pub fn new(
        timers: Arc<dyn TimerService>,
        remote_events: Arc<dyn RemoteSessionEvents>,
        presenter: Arc<dyn OutcomePresenter>,
        timeouts: CallTimeouts,
    ) -> Self {
        Self {
            timers,
            remote_events,
            presenter,
            timeouts,
        }
    }

    pub fn with_tokio_timers(
        remote_events: Arc<dyn RemoteSessionEvents>,
        presenter: Arc<dyn OutcomePresenter>,
        timeouts: CallTimeouts,
    ) -> Self {
        Self::new(Arc::new(TokioTimerService), remote_events, presenter, timeouts)
    }

    /// Arms both timers, subscribes to provider events and returns at once.
    #[instrument(skip(self, counterpart), fields(doctor = %counterpart.name))]
    pub async fn start(&self, counterpart: Counterpart) -> Result<CallSessionHandle, CallSessionError> {
        counterpart.validate()?;

        let attempt = CallAttempt::new(counterpart);
        let session_id = attempt.session_id();
        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = EventSink::new(session_id, sender.clone());

        self.remote_events.subscribe(session_id, sink.clone()).await?;

        let timers = ArmedTimers {
            no_answer: Some(self.arm(&sink, TimerKind::NoAnswer, self.timeouts.no_answer)),
            low_balance: Some(self.arm(&sink, TimerKind::LowBalance, self.timeouts.low_balance)),
        };

        let (snapshots, snapshot_rx) = watch::channel(attempt.snapshot(true));

        let session = CallSession {
            attempt,
            receiver,
            timers,
            clock: Arc::clone(&self.timers),
            remote_events: Arc::clone(&self.remote_events),
            presenter: Arc::clone(&self.presenter),
            snapshots,
        };
        tokio::spawn(session.run());

        info!(
            "Started call session {} (no answer after {:?}, low balance after {:?})",
            session_id, self.timeouts.no_answer, self.timeouts.low_balance
        );

        Ok(CallSessionHandle {
            session_id,
            sender,
            snapshots: snapshot_rx,
        })
    }

    fn arm(&self, sink: &EventSink, kind: TimerKind, delay: Duration) -> TimerHandle {
        let sink = sink.clone();
        self.timers.schedule(
            delay,
            Box::new(move || {
                sink.deliver(CallEvent::TimerFired(kind));
            }),
        )
    }
}

/// Caller's grip on a running attempt. Dropping it disposes the attempt.
#[derive(Debug)]
pub struct CallSessionHandle {
    session_id: SessionId,
    sender: mpsc::UnboundedSender<ControllerMessage>,
    snapshots: watch::Receiver<CallSnapshot>,
}

impl CallSessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn snapshot(&self) -> CallSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Queues an event for the attempt. Returns false once it has been torn down.
    pub fn dispatch(&self, event: CallEvent) -> bool {
        self.sender.send(ControllerMessage::Event(event)).is_ok()
    }

    pub fn end_call(&self) -> bool {
        self.dispatch(CallEvent::UserEnded)
    }

    /// Releases timers and the provider subscription. Safe to repeat.
    pub fn dispose(&self) {
        if self.sender.send(ControllerMessage::Dispose).is_err() {
            debug!("Call session {} already torn down", self.session_id);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the controller task has released everything it held.
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}

impl Drop for CallSessionHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

struct ArmedTimers {
    no_answer: Option<TimerHandle>,
    low_balance: Option<TimerHandle>,
}

impl ArmedTimers {
    fn cancel(&mut self, kind: TimerKind) {
        let slot = match kind {
            TimerKind::NoAnswer => &mut self.no_answer,
            TimerKind::LowBalance => &mut self.low_balance,
        };
        if let Some(mut handle) = slot.take() {
            handle.cancel();
            debug!("Cancelled {:?} timer", kind);
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(TimerKind::NoAnswer);
        self.cancel(TimerKind::LowBalance);
    }
}

struct CallSession {
    attempt: CallAttempt,
    receiver: mpsc::UnboundedReceiver<ControllerMessage>,
    timers: ArmedTimers,
    clock: Arc<dyn TimerService>,
    remote_events: Arc<dyn RemoteSessionEvents>,
    presenter: Arc<dyn OutcomePresenter>,
    snapshots: watch::Sender<CallSnapshot>,
}

impl CallSession {
    async fn run(mut self) {
        let session_id = self.attempt.session_id();

        while let Some(message) = self.receiver.recv().await {
            let event = match message {
                ControllerMessage::Event(event) => event,
                ControllerMessage::Dispose => {
                    info!("Call session {} disposed before reaching an outcome", session_id);
                    break;
                }
            };

            match self.attempt.apply(&event, self.clock.now()) {
                Transition::Ignored(reason) => {
                    debug!("Call session {} ignored {:?} ({:?})", session_id, event, reason);
                }
                Transition::Connected => {
                    self.timers.cancel(TimerKind::NoAnswer);
                    self.snapshots.send_replace(self.attempt.snapshot(true));
                    info!("Call session {} connected", session_id);
                }
                Transition::Terminated(report) => {
                    self.timers.cancel_all();
                    info!(
                        "Call session {} ended: {:?} after {}s connected",
                        session_id, report.outcome, report.elapsed_seconds
                    );
                    self.presenter.on_terminal(report).await;
                    break;
                }
            }
        }

        self.teardown().await;
    }

    async fn teardown(&mut self) {
        let session_id = self.attempt.session_id();
        self.timers.cancel_all();
        self.remote_events.unsubscribe(session_id).await;
        self.snapshots.send_replace(self.attempt.snapshot(false));
        self.receiver.close();
        debug!("Call session {} torn down", session_id);
    }
}
