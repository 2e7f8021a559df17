// libs/call-session-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    CallSessionError, RemoteEventResponse, RemoteSessionEvent, StartCallRequest,
    StartCallResponse,
};
use crate::services::CallSessionRegistry;

fn to_app_error(err: CallSessionError) -> AppError {
    match err {
        CallSessionError::InvalidCounterpart { message } => AppError::ValidationError(message),
        CallSessionError::SessionNotFound { .. } => AppError::NotFound(err.to_string()),
        CallSessionError::AlreadySubscribed { .. } => AppError::Conflict(err.to_string()),
    }
}

// ==============================================================================
// CALL LIFECYCLE HANDLERS
// ==============================================================================

/// Start ringing a doctor
#[axum::debug_handler]
pub async fn start_call(
    State(registry): State<Arc<CallSessionRegistry>>,
    Json(request): Json<StartCallRequest>,
) -> Result<(StatusCode, Json<StartCallResponse>), AppError> {
    let call = registry
        .start_call(request.counterpart)
        .await
        .map_err(to_app_error)?;

    Ok((
        StatusCode::CREATED,
        Json(StartCallResponse {
            success: true,
            call,
            message: "Call started".to_string(),
        }),
    ))
}

pub async fn get_call(
    State(registry): State<Arc<CallSessionRegistry>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let call = registry
        .snapshot(session_id.into())
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "call": call })))
}

/// User pressed hang up
pub async fn end_call(
    State(registry): State<Arc<CallSessionRegistry>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    registry
        .end_call(session_id.into())
        .await
        .map_err(to_app_error)?;

    Ok(StatusCode::ACCEPTED)
}

pub async fn dispose_call(
    State(registry): State<Arc<CallSessionRegistry>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    registry
        .dispose(session_id.into())
        .await
        .map_err(to_app_error)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_call_summary(
    State(registry): State<Arc<CallSessionRegistry>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let summary = registry
        .summary(session_id.into())
        .await
        .map_err(to_app_error)?
        .ok_or_else(|| AppError::NotFound("Call has not ended yet".to_string()))?;

    Ok(Json(json!({ "summary": summary })))
}

// ==============================================================================
// PROVIDER WEBHOOK
// ==============================================================================

/// Presence callback from the real-time provider. Unknown or finished
/// sessions are acknowledged with `delivered: false`.
pub async fn receive_remote_event(
    State(registry): State<Arc<CallSessionRegistry>>,
    Json(event): Json<RemoteSessionEvent>,
) -> Json<RemoteEventResponse> {
    let delivered = registry.deliver_remote_event(event).await;
    Json(RemoteEventResponse { delivered })
}

// ==============================================================================
// SYSTEM
// ==============================================================================

pub async fn call_health_check(State(registry): State<Arc<CallSessionRegistry>>) -> Json<Value> {
    let config = registry.config();
    let status = if config.is_configured() { "healthy" } else { "not_configured" };

    Json(json!({
        "status": status,
        "active_calls": registry.active_calls().await,
        "no_answer_timeout_seconds": config.no_answer_timeout_seconds,
        "low_balance_timeout_seconds": config.low_balance_timeout_seconds,
    }))
}

pub async fn cleanup_finished_calls(State(registry): State<Arc<CallSessionRegistry>>) -> Json<Value> {
    let pruned = registry.prune_finished().await;
    Json(json!({ "pruned": pruned }))
}
