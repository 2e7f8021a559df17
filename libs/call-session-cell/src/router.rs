// libs/call-session-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::services::CallSessionRegistry;

/// Creates the call session routes
pub fn call_session_routes(state: Arc<CallSessionRegistry>) -> Router {
    Router::new()
        .route("/health", get(call_health_check))
        .route("/", post(start_call))
        // Provider webhook
        .route("/events", post(receive_remote_event))
        .route("/admin/cleanup", post(cleanup_finished_calls))
        .route("/{session_id}", get(get_call).delete(dispose_call))
        .route("/{session_id}/end", post(end_call))
        .route("/{session_id}/summary", get(get_call_summary))
        .with_state(state)
}
