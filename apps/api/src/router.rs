use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use call_session_cell::router::call_session_routes;
use call_session_cell::services::CallSessionRegistry;

pub fn create_router(registry: Arc<CallSessionRegistry>) -> Router {
    Router::new()
        .route("/", get(|| async { "Telehealth call API is running!" }))
        .nest("/calls", call_session_routes(registry))
}
