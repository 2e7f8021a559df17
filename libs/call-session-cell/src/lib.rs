// libs/call-session-cell/src/lib.rs
//! # Call Session Cell
//!
//! Drives a single patient-to-doctor voice/video call attempt from the first
//! ring to its one terminal outcome. Media and signalling stay with the
//! real-time provider; this cell only decides *how the call ended*.
//!
//! ## Outcomes
//!
//! - **UserEnded**: the patient hung up (ringing or connected)
//! - **NoAnswer**: nobody joined before the no-answer window elapsed
//! - **LowBalanceDisconnect**: the balance-funded window ran out
//! - **RemoteLeft**: the doctor left after joining
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------------+
//! |                    Call Session Cell                      |
//! +-----------------------------------------------------------+
//! |  handlers.rs         |  HTTP endpoint handlers            |
//! |  router.rs           |  Route definitions                 |
//! |  models.rs           |  Data structures, DTOs, errors     |
//! |  services/           |                                    |
//! |    state_machine.rs  |  Transition rules for one attempt  |
//! |    controller.rs     |  Per-attempt task and its queue    |
//! |    timer.rs          |  Cancelable delayed callbacks      |
//! |    remote_events.rs  |  Provider presence events          |
//! |    presenter.rs      |  Post-call summary screens         |
//! |    registry.rs       |  Live sessions for the HTTP layer  |
//! +-----------------------------------------------------------+
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /calls/health` - Health check
//! - `POST /calls` - Start a call
//! - `GET /calls/{id}` - Current call state
//! - `POST /calls/{id}/end` - Patient hangs up
//! - `DELETE /calls/{id}` - Dispose the call
//! - `GET /calls/{id}/summary` - Post-call summary
//! - `POST /calls/events` - Provider joined/left webhook
//! - `POST /calls/admin/cleanup` - Drop finished calls
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use call_session_cell::models::{CallTimeouts, Counterpart, RemoteSessionEvent};
//! use call_session_cell::services::{CallSessionController, ChannelPresenter, RemoteEventHub};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Arc::new(RemoteEventHub::new());
//! let (presenter, mut reports) = ChannelPresenter::new();
//! let controller = CallSessionController::with_tokio_timers(
//!     hub.clone(),
//!     Arc::new(presenter),
//!     CallTimeouts::default(),
//! );
//!
//! let call = controller.start(Counterpart::new("Dr. Asha Menon").with_rate(20)).await?;
//! hub.publish(RemoteSessionEvent::joined(call.session_id())).await;
//! call.end_call();
//!
//! let _report = reports.recv().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! - `CALL_NO_ANSWER_TIMEOUT_SECONDS` - ringing window (default 20)
//! - `CALL_LOW_BALANCE_TIMEOUT_SECONDS` - balance-funded window from dial (default 30)
//! - `CALL_CURRENCY_SYMBOL` - symbol used in summaries (default ₹)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export commonly used types
pub use models::{
    CallAttempt, CallEvent, CallOutcome, CallSessionError, CallSnapshot, CallState,
    CallTimeouts, Counterpart, RemoteSessionEvent, SessionId, TerminalReport, TimerKind,
};

pub use services::{
    CallSessionController, CallSessionHandle, CallSessionRegistry, CallSummary,
    OutcomePresenter, RemoteEventHub, SummaryScreen,
};

pub use router::call_session_routes;
