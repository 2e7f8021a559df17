// libs/call-session-cell/src/services/mod.rs

pub mod controller;
pub mod presenter;
pub mod registry;
pub mod remote_events;
pub mod state_machine;
pub mod timer;

pub use controller::{CallSessionController, CallSessionHandle, ControllerMessage, EventSink};
pub use presenter::{CallSummary, ChannelPresenter, OutcomePresenter, SummaryScreen, SummaryStore};
pub use registry::CallSessionRegistry;
pub use remote_events::{RemoteEventHub, RemoteSessionEvents};
pub use state_machine::{IgnoreReason, Transition};
pub use timer::{TimerCallback, TimerHandle, TimerService, TokioTimerService};
