//! REST route configuration

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use std::sync::Arc;

/// Create the REST API router
///
/// # Endpoints
///
/// - `GET /` - health check
/// - `POST /twilio/stream` - incoming-call webhook (TwiML reply)
/// - `GET /calls` - list call records, optional `?status=` filter
/// - `GET /calls/{call_sid}` - call record detail
/// - `PUT /calls/{call_sid}` - partial call record update
/// - `GET /audio/api/logs` - recent audio log entries
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::api::health_check))
        .route("/twilio/stream", post(handlers::calls::handle_incoming_call))
        .route("/calls", get(handlers::calls::list_calls))
        .route(
            "/calls/{call_sid}",
            get(handlers::calls::get_call).put(handlers::calls::update_call),
        )
        .route("/audio/api/logs", get(handlers::logs::list_audio_logs))
        .layer(TraceLayer::new_for_http())
}
