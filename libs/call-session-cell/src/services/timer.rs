// libs/call-session-cell/src/services/timer.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;

pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Clock and delayed-callback source for call controllers.
pub trait TimerService: Send + Sync {
    fn now(&self) -> Instant;

    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Owner of one scheduled callback. Cancelling (or dropping) the handle
/// guarantees the callback will not run.
#[derive(Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new(cancelled: Arc<AtomicBool>, task: Option<AbortHandle>) -> Self {
        Self { cancelled, task }
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Runs every timer as its own tokio task sleeping on the runtime clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimerService;

impl TimerService for TokioTimerService {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::SeqCst) {
                callback();
            }
        });

        TimerHandle::new(cancelled, Some(task.abort_handle()))
    }
}
